//! Hong Kong Observatory open-data client
//!
//! Fetches the current-weather report (`dataType=rhrread`) and the yearly
//! tide-times document. Parsing into typed records is left to the adapters in
//! [`super::weather`] and [`super::tides`].

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::{Feed, FeedError, FeedSource};
use crate::config::FeedConfig;

/// Client for the HKO open-data endpoints
#[derive(Debug, Clone)]
pub struct HkoClient {
    client: Client,
    weather_url: String,
    tide_url: String,
    lang: String,
}

impl HkoClient {
    /// Creates a client from feed settings. Every request carries the
    /// configured timeout.
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("fishcast/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a client around an existing HTTP client
    pub fn with_client(client: Client, config: &FeedConfig) -> Self {
        Self {
            client,
            weather_url: config.weather_url.clone(),
            tide_url: config.tide_url.clone(),
            lang: config.lang.clone(),
        }
    }

    /// GETs `url` with `query` and returns the body as a JSON object
    async fn get_document(
        &self,
        feed: Feed,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, FeedError> {
        info!(%feed, url, "Fetching feed");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| classify(feed, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                feed,
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|e| classify(feed, e))?;
        debug!(%feed, bytes = text.len(), "Feed body received");
        parse_document(feed, &text)
    }
}

impl FeedSource for HkoClient {
    async fn fetch_weather(&self) -> Result<Value, FeedError> {
        let query = [
            ("dataType", "rhrread".to_string()),
            ("lang", self.lang.clone()),
        ];
        self.get_document(Feed::Weather, &self.weather_url, &query).await
    }

    async fn fetch_tides(&self, year: i32) -> Result<Value, FeedError> {
        let query = [("year", year.to_string()), ("lang", self.lang.clone())];
        self.get_document(Feed::Tide, &self.tide_url, &query).await
    }
}

/// Maps timeouts to their own variant so callers can tell them apart
fn classify(feed: Feed, error: reqwest::Error) -> FeedError {
    if error.is_timeout() {
        FeedError::Timeout { feed }
    } else {
        FeedError::RequestFailed(error)
    }
}

/// Parses a body that must be a JSON object
fn parse_document(feed: Feed, text: &str) -> Result<Value, FeedError> {
    let value: Value = serde_json::from_str(text)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(FeedError::UnexpectedShape {
            feed,
            detail: format!("expected a JSON object, got {}", json_kind(&value)),
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
