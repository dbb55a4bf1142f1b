pub mod event;

use crate::util::auto_proxy;
use bytes::Bytes;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub use event::{parse_events, StormEvent, TrackError, TrackPoint};

const EONET_EVENTS_URL: &str = "https://eonet.gsfc.nasa.gov/api/v3/events";
// west,north,east,south around the Philippine area of responsibility
const STORM_BBOX: &str = "110,27,155,0";
const STORM_SOURCE: &str = "JTWC";
const STORM_CATEGORY: &str = "severeStorms";
const STORM_STATUS: &str = "open";
const STORM_DAYS_LIMIT: u32 = 3;
const STORM_EVENT_LIMIT: u32 = 5;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not build EONET request: {0}")]
    Url(#[from] url::ParseError),
    #[error("connection to EONET failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("EONET returned unreadable JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct EonetClient {
    api_key: String,
    proxy: Option<Url>,
    timeout_duration: Duration,
    client: reqwest::Client,
}

pub struct EonetClientBuilder {
    api_key: String,
    proxy: Option<Url>,
    timeout_duration: Option<Duration>,
}

impl EonetClient {
    pub fn builder(api_key: impl Into<String>) -> EonetClientBuilder {
        EonetClientBuilder::new(api_key.into())
    }

    pub fn events_url() -> Result<Url, FetchError> {
        let mut url = Url::parse(EONET_EVENTS_URL)?;
        url.query_pairs_mut()
            .append_pair("source", STORM_SOURCE)
            .append_pair("status", STORM_STATUS)
            .append_pair("limit", &STORM_EVENT_LIMIT.to_string())
            .append_pair("days", &STORM_DAYS_LIMIT.to_string())
            .append_pair("bbox", STORM_BBOX)
            .append_pair("category", STORM_CATEGORY);
        Ok(url)
    }

    /// Open severe storms around the Philippines. Anything but a 200 is
    /// treated as "no storms"; only transport and decoding failures are errors.
    pub async fn fetch_severe_storms(&self) -> Result<Vec<Value>, FetchError> {
        let url = Self::events_url()?;
        debug!(%url, "fetching EONET events");

        let response = auto_proxy(&self.client, &url, self.proxy.as_ref())
            .bearer_auth(&self.api_key)
            .timeout(self.timeout_duration)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            warn!(status = response.status().as_u16(), "EONET request was not successful");
            return Ok(vec![]);
        }

        let body = response.bytes().await?;
        events_from_body(&body)
    }
}

pub(crate) fn events_from_body(body: &Bytes) -> Result<Vec<Value>, FetchError> {
    let document: Value = serde_json::from_slice(body)?;
    let events = match document.get("events") {
        Some(Value::Array(events)) => events.clone(),
        _ => vec![],
    };
    Ok(events)
}

impl EonetClientBuilder {
    fn new(api_key: String) -> Self {
        Self {
            api_key,
            proxy: None,
            timeout_duration: None,
        }
    }

    pub fn proxy(mut self, proxy: Option<Url>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn timeout_duration(mut self, timeout: Duration) -> Self {
        self.timeout_duration = Some(timeout);
        self
    }

    pub fn build(self) -> EonetClient {
        EonetClient {
            api_key: self.api_key,
            proxy: self.proxy,
            timeout_duration: self.timeout_duration.unwrap_or_else(|| Duration::from_secs(20)),
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_events_url() {
        let url = EonetClient::events_url().unwrap();
        assert_eq!(url.host_str(), Some("eonet.gsfc.nasa.gov"));
        assert_eq!(url.path(), "/api/v3/events");

        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(query["status"], "open");
        assert_eq!(query["category"], "severeStorms");
        assert_eq!(query["days"], "3");
        assert_eq!(query["limit"], "5");
        assert_eq!(query["bbox"], "110,27,155,0");
    }

    #[test]
    fn test_events_from_body() {
        let body = Bytes::from_static(br#"{"title": "EONET Events", "events": [{"title": "A"}, {"title": "B"}]}"#);
        let events = events_from_body(&body).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1]["title"], "B");

        let body = Bytes::from_static(br#"{"title": "EONET Events"}"#);
        assert!(events_from_body(&body).unwrap().is_empty());

        let body = Bytes::from_static(b"<html>");
        assert!(matches!(events_from_body(&body), Err(FetchError::Json(_))));
    }

    #[test]
    fn test_builder_defaults() {
        let client = EonetClient::builder("key").build();
        assert_eq!(client.timeout_duration, Duration::from_secs(20));
        assert!(client.proxy.is_none());
    }
}
