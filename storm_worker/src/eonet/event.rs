use crate::common::Coordinate;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

// EONET emits more than this (ids, sources, magnitudeUnit, geometry type),
// only the fields the map needs are kept
#[derive(Deserialize, Debug)]
struct RawEvent {
    title: Option<String>,
    geometry: Option<Vec<RawTrackPoint>>,
}

#[derive(Deserialize, Debug)]
struct RawTrackPoint {
    coordinates: Option<Vec<f64>>,
    #[serde(rename = "magnitudeValue")]
    magnitude_value: Option<f64>,
    date: Option<String>,
}

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("event record is not an object")]
    NotAnObject,
    #[error("event record does not match the EONET shape: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("event has no title")]
    MissingTitle,
    #[error("event {0} has no geometry field")]
    MissingGeometry(String),
    #[error("no geometry data for event {0}")]
    EmptyGeometry(String),
    #[error("point {point} of {title} has no usable coordinates")]
    Coordinates { title: String, point: usize },
    #[error("point {point} of {title} has no magnitudeValue")]
    Magnitude { title: String, point: usize },
    #[error("point {point} of {title} has an unreadable date {date:?}")]
    Date {
        title: String,
        point: usize,
        date: Option<String>,
    },
}

#[derive(Clone, Debug)]
pub struct TrackPoint {
    pub coordinate: Coordinate,
    /// wind speed in knots
    pub magnitude: f64,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct StormEvent {
    pub title: String,
    /// oldest first
    pub track: Vec<TrackPoint>,
}

impl StormEvent {
    pub fn max_magnitude(&self) -> f64 {
        self.track
            .iter()
            .map(|p| p.magnitude)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn start(&self) -> &TrackPoint {
        &self.track[0]
    }

    pub fn end(&self) -> &TrackPoint {
        &self.track[self.track.len() - 1]
    }
}

/// Accepts `2024-10-21T06:00:00Z`, explicit offsets, and offset-less stamps
/// (read as UTC).
pub fn parse_track_date(date: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(date, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

fn into_track_point(title: &str, point: usize, raw: RawTrackPoint) -> Result<TrackPoint, TrackError> {
    let coordinate = match raw.coordinates.as_deref() {
        Some([lon, lat, ..]) => Coordinate { lat: *lat, lon: *lon },
        _ => {
            return Err(TrackError::Coordinates {
                title: title.to_string(),
                point,
            })
        }
    };
    if !coordinate.is_finite() {
        return Err(TrackError::Coordinates {
            title: title.to_string(),
            point,
        });
    }

    let magnitude = match raw.magnitude_value {
        Some(m) if m.is_finite() => m,
        _ => {
            return Err(TrackError::Magnitude {
                title: title.to_string(),
                point,
            })
        }
    };

    let date = match raw.date.as_deref().and_then(parse_track_date) {
        Some(date) => date,
        None => {
            return Err(TrackError::Date {
                title: title.to_string(),
                point,
                date: raw.date,
            })
        }
    };

    Ok(TrackPoint {
        coordinate,
        magnitude,
        date,
    })
}

impl TryFrom<&Value> for StormEvent {
    type Error = TrackError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        if !value.is_object() {
            return Err(TrackError::NotAnObject);
        }
        let raw: RawEvent = serde_json::from_value(value.clone())?;

        let title = raw.title.ok_or(TrackError::MissingTitle)?;
        let geometry = match raw.geometry {
            None => return Err(TrackError::MissingGeometry(title)),
            Some(g) if g.is_empty() => return Err(TrackError::EmptyGeometry(title)),
            Some(g) => g,
        };

        let mut track = Vec::with_capacity(geometry.len());
        for (point, raw_point) in geometry.into_iter().enumerate() {
            track.push(into_track_point(&title, point, raw_point)?);
        }

        Ok(StormEvent { title, track })
    }
}

/// Validates every raw record, keeping each usable event together with its
/// position in the input. Unusable records are logged and dropped.
pub fn parse_events(events: &[Value]) -> Vec<(usize, StormEvent)> {
    let mut parsed = Vec::with_capacity(events.len());

    for (index, value) in events.iter().enumerate() {
        match StormEvent::try_from(value) {
            Ok(event) => parsed.push((index, event)),
            Err(e) => warn!(index, reason = %e, "skipping storm event"),
        }
    }

    parsed
}
