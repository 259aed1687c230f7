//! Core feed models for fishcast
//!
//! This module holds the typed records produced from the weather and tide
//! feeds, the error type for fetching them, and the [`FeedSource`] seam the
//! advisor fetches through.

pub mod hko;
pub mod tides;
pub mod weather;

pub use hko::HkoClient;
pub use tides::TideTable;
pub use weather::WeatherSnapshot;

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Which external feed a request or failure concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    /// Current weather report (rainfall, temperature)
    Weather,
    /// Yearly tide times
    Tide,
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feed::Weather => f.write_str("weather"),
            Feed::Tide => f.write_str("tide"),
        }
    }
}

/// Errors that can occur when fetching a feed document
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout
    #[error("{feed} feed timed out")]
    Timeout { feed: Feed },

    /// Server answered with a non-success status
    #[error("{feed} feed returned HTTP {status}")]
    Status { feed: Feed, status: u16 },

    /// Body was not valid JSON
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Body was JSON but not a document object
    #[error("Unexpected {feed} document shape: {detail}")]
    UnexpectedShape { feed: Feed, detail: String },
}

/// Source of raw feed documents
///
/// The advisor only needs the two documents; how they are fetched (HTTP,
/// fixtures in tests) sits behind this trait.
pub trait FeedSource {
    /// Fetches the current weather report document
    fn fetch_weather(&self) -> impl Future<Output = Result<Value, FeedError>> + Send;

    /// Fetches the tide times document for a calendar year
    fn fetch_tides(&self, year: i32) -> impl Future<Output = Result<Value, FeedError>> + Send;
}

/// Rainfall reported for one place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallRecord {
    /// Place name as written in the feed
    pub place: String,
    /// Maximum rainfall in mm over the reporting window
    pub amount: f64,
}

/// Temperature reported for one place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRecord {
    /// Place name as written in the feed
    pub place: String,
    /// Temperature in Celsius
    pub value: f64,
}

/// Kind of tide event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TideType {
    High,
    Low,
}

impl TideType {
    /// Parses the feed's event type, ignoring ASCII case
    pub fn parse(s: &str) -> Option<TideType> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("high") {
            Some(TideType::High)
        } else if s.eq_ignore_ascii_case("low") {
            Some(TideType::Low)
        } else {
            None
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            TideType::High => "High",
            TideType::Low => "Low",
        }
    }
}

/// A single high or low water event at a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideEvent {
    /// Station place text as written in the feed
    pub place: String,
    /// High or low water
    pub event_type: TideType,
    /// Event time as given by the feed (e.g. "04:12")
    pub time: String,
    /// Calendar date of the event
    pub date: NaiveDate,
}

/// Up to three tide events chosen for a station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TideSelection {
    /// Station name the events were selected for
    pub station: String,
    /// Selected events in feed order
    pub events: Vec<TideEvent>,
    /// True when no event fell on the requested day and the first events
    /// for the station were used instead
    pub stale: bool,
}

impl TideSelection {
    /// Selection with no events
    pub fn empty(station: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            events: Vec::new(),
            stale: false,
        }
    }

    /// Event type that drives scoring: the first event's, or `Low` when
    /// there are none.
    pub fn leading_type(&self) -> TideType {
        self.events
            .first()
            .map(|event| event.event_type)
            .unwrap_or(TideType::Low)
    }
}
