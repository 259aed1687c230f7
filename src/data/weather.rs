//! Weather report adapter
//!
//! Turns the raw current-weather document into typed rainfall and temperature
//! lookups. Parsing happens once, here; records that do not fit the expected
//! shape are quarantined (counted and skipped) so nothing downstream has to
//! re-check the feed's structure.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{RainfallRecord, TemperatureRecord};

/// Typed view of one weather report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSnapshot {
    rainfall: Vec<RainfallRecord>,
    temperature: Vec<TemperatureRecord>,
    quarantined: usize,
}

/// A place is either a bare name or an object carrying one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPlace {
    Name(String),
    Object {
        name: Option<String>,
        tc: Option<String>,
        en: Option<String>,
    },
}

impl RawPlace {
    fn into_name(self) -> Option<String> {
        let name = match self {
            RawPlace::Name(name) => Some(name),
            RawPlace::Object { name, tc, en } => name.or(tc).or(en),
        }?;
        let trimmed = name.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Numbers sometimes arrive as strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn value(&self) -> Option<f64> {
        let value = match self {
            RawNumber::Number(n) => *n,
            RawNumber::Text(s) => s.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

#[derive(Debug, Deserialize)]
struct RawRainfall {
    place: RawPlace,
    max: RawNumber,
}

#[derive(Debug, Deserialize)]
struct RawTemperature {
    place: RawPlace,
    value: RawNumber,
}

impl WeatherSnapshot {
    /// Creates a snapshot from already-typed records
    pub fn new(rainfall: Vec<RainfallRecord>, temperature: Vec<TemperatureRecord>) -> Self {
        Self {
            rainfall,
            temperature,
            quarantined: 0,
        }
    }

    /// Parses a weather report document.
    ///
    /// `rainfall` may be a list of records or an object with a `data` list;
    /// `temperature` is an object with a `data` list (a bare list is accepted
    /// too). Missing sections yield empty lists.
    pub fn from_document(doc: &Value) -> Self {
        let mut quarantined = 0;

        let rainfall = records(doc.get("rainfall"))
            .iter()
            .filter_map(|record| {
                let parsed = RawRainfall::deserialize(record).ok().and_then(|raw| {
                    Some(RainfallRecord {
                        amount: raw.max.value()?,
                        place: raw.place.into_name()?,
                    })
                });
                if parsed.is_none() {
                    debug!(?record, "Quarantined rainfall record");
                    quarantined += 1;
                }
                parsed
            })
            .collect::<Vec<_>>();

        let temperature = records(doc.get("temperature"))
            .iter()
            .filter_map(|record| {
                let parsed = RawTemperature::deserialize(record).ok().and_then(|raw| {
                    Some(TemperatureRecord {
                        value: raw.value.value()?,
                        place: raw.place.into_name()?,
                    })
                });
                if parsed.is_none() {
                    debug!(?record, "Quarantined temperature record");
                    quarantined += 1;
                }
                parsed
            })
            .collect::<Vec<_>>();

        debug!(
            rainfall = rainfall.len(),
            temperature = temperature.len(),
            quarantined,
            "Parsed weather report"
        );

        Self {
            rainfall,
            temperature,
            quarantined,
        }
    }

    /// Rainfall in mm for an exact place name, if reported
    pub fn rainfall_reading(&self, place: &str) -> Option<f64> {
        self.rainfall
            .iter()
            .find(|record| record.place == place)
            .map(|record| record.amount)
    }

    /// Rainfall in mm for an exact place name, 0 if not reported
    pub fn rainfall_for(&self, place: &str) -> f64 {
        self.rainfall_reading(place).unwrap_or(0.0)
    }

    /// Temperature in Celsius for an exact place name, if reported
    pub fn temperature_for(&self, place: &str) -> Option<f64> {
        self.temperature
            .iter()
            .find(|record| record.place == place)
            .map(|record| record.value)
    }

    /// Place names that have a rainfall record, in feed order
    pub fn rainfall_places(&self) -> impl Iterator<Item = &str> + Clone {
        self.rainfall.iter().map(|record| record.place.as_str())
    }

    /// Number of records skipped because they did not parse
    pub fn quarantined(&self) -> usize {
        self.quarantined
    }

    /// True when the report had no usable records at all
    pub fn is_empty(&self) -> bool {
        self.rainfall.is_empty() && self.temperature.is_empty()
    }
}

/// The record list of a section: the section itself if it is a list, or its
/// `data` member if it is an object.
fn records(section: Option<&Value>) -> &[Value] {
    match section {
        Some(Value::Array(items)) => items.as_slice(),
        Some(Value::Object(map)) => match map.get("data") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    }
}
