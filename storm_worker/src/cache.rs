//! Guild channel registry plus short lived keyed entries, kept in one JSON
//! document on disk.
//!
//! ```json
//! {
//!   "guild_channels": { "<guild id>": <channel id> },
//!   "<key>": { "timestamp": "<ISO-8601>", "value": <any> }
//! }
//! ```
//!
//! Every change rewrites the whole file. Two processes, or two unsynchronized
//! handles in one process, writing at once can lose each other's updates.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const CACHE_FILE: &str = "guild_channel_cache.json";
const GUILD_CHANNELS: &str = "guild_channels";
const CACHE_EXPIRE_MINS: i64 = 30;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cannot write cache file {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("cannot serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct ChannelCache {
    path: PathBuf,
    document: Map<String, Value>,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    // written without an offset
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

impl ChannelCache {
    /// Loads `<dir>/guild_channel_cache.json`. A missing or unreadable file
    /// starts an empty cache.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(CACHE_FILE);
        let document = Self::load(&path);
        Self { path, document }
    }

    fn load(path: &Path) -> Map<String, Value> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read cache file, starting empty");
                return Map::new();
            }
        };

        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(document)) => {
                debug!(path = %path.display(), entries = document.len(), "cache loaded");
                document
            }
            Ok(_) => {
                warn!(path = %path.display(), "cache file is not a JSON object, starting empty");
                Map::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed cache file, starting empty");
                Map::new()
            }
        }
    }

    fn save(&self) -> Result<(), CacheError> {
        let raw = serde_json::to_vec(&self.document)?;
        fs::write(&self.path, raw).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.get_at(key, Utc::now())
    }

    /// The value stored under `key` if it was written at most 30 minutes
    /// before `now`.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<&Value> {
        if key == GUILD_CHANNELS {
            return None;
        }
        let entry = self.document.get(key)?.as_object()?;
        let timestamp = entry.get("timestamp")?.as_str().and_then(parse_timestamp)?;

        if now - timestamp <= Duration::minutes(CACHE_EXPIRE_MINS) {
            entry.get("value")
        } else {
            None
        }
    }

    pub fn set(&mut self, key: &str, value: Value) -> Result<(), CacheError> {
        self.set_at(key, value, Utc::now())
    }

    pub fn set_at(&mut self, key: &str, value: Value, now: DateTime<Utc>) -> Result<(), CacheError> {
        let mut entry = Map::new();
        entry.insert("timestamp".into(), Value::String(now.to_rfc3339()));
        entry.insert("value".into(), value);
        self.document.insert(key.to_string(), Value::Object(entry));
        self.save()
    }

    pub fn weather_channel(&self, guild_id: u64) -> Option<u64> {
        self.document
            .get(GUILD_CHANNELS)?
            .as_object()?
            .get(&guild_id.to_string())?
            .as_u64()
            .filter(|id| *id != 0)
    }

    pub fn set_weather_channel(&mut self, guild_id: u64, channel_id: u64) -> Result<(), CacheError> {
        let channels = self
            .document
            .entry(GUILD_CHANNELS)
            .or_insert_with(|| Value::Object(Map::new()));
        if !channels.is_object() {
            *channels = Value::Object(Map::new());
        }
        if let Value::Object(channels) = channels {
            channels.insert(guild_id.to_string(), Value::from(channel_id));
        }
        self.save()
    }

    /// Every guild with a registered weather channel.
    pub fn weather_channels(&self) -> Vec<(u64, u64)> {
        let Some(channels) = self.document.get(GUILD_CHANNELS).and_then(Value::as_object) else {
            return vec![];
        };
        channels
            .iter()
            .filter_map(|(guild, channel)| Some((guild.parse().ok()?, channel.as_u64()?)))
            // 0 is never a valid snowflake
            .filter(|(guild, channel)| *guild != 0 && *channel != 0)
            .collect()
    }
}
