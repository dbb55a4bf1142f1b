use std::env;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

const DEFAULT_CACHE_DIR: &str = "cache";
const DEFAULT_LOG_FILE: &str = "sierra.log";

#[derive(Debug)]
pub(crate) struct Config {
    pub discord_token: String,
    pub nasa_api_key: String,
    pub cache_dir: PathBuf,
    pub font_path: Option<PathBuf>,
    pub proxy_url: Option<Url>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ConfigError {
    #[error("Discord bot token not found, set DISCORD_BOT_TOKEN")]
    MissingToken,
    #[error("PROXY_URL is not a valid URL: {0}")]
    InvalidProxy(String),
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Log file from `LOG_FILE`. Read on its own because logging is set up
/// before the rest of the config is validated. An empty value disables it.
pub(crate) fn log_file() -> Option<PathBuf> {
    log_file_from(|key| env::var(key).ok())
}

fn log_file_from(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    match lookup("LOG_FILE") {
        Some(path) if path.trim().is_empty() => None,
        Some(path) => Some(PathBuf::from(path)),
        None => Some(PathBuf::from(DEFAULT_LOG_FILE)),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let discord_token = non_empty(lookup("DISCORD_BOT_TOKEN")).ok_or(ConfigError::MissingToken)?;

        let proxy_url = match non_empty(lookup("PROXY_URL")) {
            Some(raw) => Some(Url::parse(&raw).map_err(|_| ConfigError::InvalidProxy(raw))?),
            None => None,
        };

        Ok(Self {
            discord_token,
            nasa_api_key: non_empty(lookup("NASA_API_KEY")).unwrap_or_default(),
            cache_dir: non_empty(lookup("CACHE_DIR"))
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            font_path: non_empty(lookup("FONT_PATH")).map(PathBuf::from),
            proxy_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DISCORD_BOT_TOKEN", "abc")])).unwrap();
        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.nasa_api_key, "");
        assert_eq!(config.cache_dir, PathBuf::from("cache"));
        assert!(config.font_path.is_none());
        assert!(config.proxy_url.is_none());
    }

    #[test]
    fn test_missing_token() {
        let err = Config::from_lookup(lookup(&[("NASA_API_KEY", "key")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingToken);

        let err = Config::from_lookup(lookup(&[("DISCORD_BOT_TOKEN", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingToken);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DISCORD_BOT_TOKEN", "abc"),
            ("NASA_API_KEY", "nasa"),
            ("CACHE_DIR", "/var/cache/sierra"),
            ("FONT_PATH", "/fonts/bold.ttf"),
            ("PROXY_URL", "https://proxy.example.com/fetch"),
        ]))
        .unwrap();
        assert_eq!(config.nasa_api_key, "nasa");
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/sierra"));
        assert_eq!(config.font_path, Some(PathBuf::from("/fonts/bold.ttf")));
        assert_eq!(config.proxy_url.unwrap().host_str(), Some("proxy.example.com"));

        let err = Config::from_lookup(lookup(&[("DISCORD_BOT_TOKEN", "abc"), ("PROXY_URL", "not a url")]));
        assert!(matches!(err, Err(ConfigError::InvalidProxy(_))));
    }

    #[test]
    fn test_log_file() {
        assert_eq!(log_file_from(lookup(&[])), Some(PathBuf::from("sierra.log")));
        assert_eq!(log_file_from(lookup(&[("LOG_FILE", "")])), None);
        assert_eq!(
            log_file_from(lookup(&[("LOG_FILE", "/tmp/bot.log")])),
            Some(PathBuf::from("/tmp/bot.log"))
        );
    }
}
