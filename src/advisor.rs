//! Fishing advisor
//!
//! Runs the recommendation pipeline for one request: validate the spot, fetch
//! both feeds together, resolve the spot to feed place names, compute the moon
//! phase and score the result. Feed failures never abort a recommendation;
//! they degrade to empty data and are reported as [`Warning`]s.

use chrono::{Datelike, NaiveDate};
use futures::future;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::{FeedSource, TideSelection, TideTable, WeatherSnapshot};
use crate::location::{LocationResolver, Resolution};
use crate::lunar::{self, MoonPhase};
use crate::scoring::{self, Advisory};
use crate::store::{CatchLogEntry, CatchLogRecord, CatchLogStore, StoreError};

/// Errors surfaced to the caller of the advisor
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// District is not in the location tables
    #[error("Unknown district '{0}'")]
    UnknownDistrict(String),

    /// Spot is not listed under the given district
    #[error("'{spot}' is not a known spot in {district}")]
    UnknownSpot { district: String, spot: String },

    /// Spot is not listed under any district
    #[error("'{0}' is not a known spot")]
    UnknownLocation(String),

    /// Username was empty
    #[error("A username is required")]
    MissingUsername,

    /// The catch log could not be read or written
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Degraded-data conditions attached to a recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Weather feed could not be fetched; rainfall reads as 0 and
    /// temperature as absent
    WeatherUnavailable { reason: String },
    /// Tide feed could not be fetched; no tide events
    TideUnavailable { reason: String },
    /// Weather report has no rainfall record for the resolved place
    RainfallNotReported { place: String },
    /// Weather report has no temperature for the district's place, or the
    /// district has no temperature place configured
    TemperatureNotReported { place: Option<String> },
    /// No tide events today; the first events on record are shown
    StaleTideData { station: String },
    /// Tide table has no events for the station
    NoTideEvents { station: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::WeatherUnavailable { reason } => {
                write!(f, "Weather data unavailable ({reason}); rainfall shown as 0")
            }
            Warning::TideUnavailable { reason } => write!(f, "Tide data unavailable ({reason})"),
            Warning::RainfallNotReported { place } => {
                write!(f, "No rainfall reported for {place}; shown as 0")
            }
            Warning::TemperatureNotReported { place: Some(place) } => {
                write!(f, "No temperature reported for {place}")
            }
            Warning::TemperatureNotReported { place: None } => {
                f.write_str("No temperature station configured for this district")
            }
            Warning::StaleTideData { .. } => {
                f.write_str("No tide events found for today. Showing fallback to next available.")
            }
            Warning::NoTideEvents { station } => write!(f, "No tide events found for {station}"),
        }
    }
}

/// Rainfall used for scoring and where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainfallReading {
    /// Weather-report place the spot resolved to
    pub place: Resolution,
    /// Rainfall in mm, 0 when not reported
    pub amount: f64,
    /// False when `amount` is the 0 default
    pub reported: bool,
}

/// Temperature for the district's reporting place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReading {
    /// Configured temperature place, if any
    pub place: Option<String>,
    /// Celsius, if reported
    pub value: Option<f64>,
}

/// Everything the caller needs to present a recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub district: String,
    pub spot: String,
    /// Day the recommendation is for
    pub date: NaiveDate,
    pub temperature: TemperatureReading,
    pub rainfall: RainfallReading,
    pub moon_phase: MoonPhase,
    pub tide: TideSelection,
    /// 0-100
    pub score: u8,
    pub advisory: Advisory,
    pub warnings: Vec<Warning>,
}

/// Produces recommendations and records catches
#[derive(Debug, Clone)]
pub struct Advisor<F> {
    resolver: LocationResolver,
    feeds: F,
    store: CatchLogStore,
}

impl<F: FeedSource> Advisor<F> {
    pub fn new(resolver: LocationResolver, feeds: F, store: CatchLogStore) -> Self {
        Self {
            resolver,
            feeds,
            store,
        }
    }

    /// Location tables and lookups
    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    /// Catch log backing this advisor
    pub fn store(&self) -> &CatchLogStore {
        &self.store
    }

    /// Checks that `spot` is listed under `district`
    pub fn validate_spot(&self, district: &str, spot: &str) -> Result<(), AdvisorError> {
        let spots = self
            .resolver
            .config()
            .locations_in(district)
            .ok_or_else(|| AdvisorError::UnknownDistrict(district.to_string()))?;

        if spots.iter().any(|s| s == spot) {
            Ok(())
        } else {
            Err(AdvisorError::UnknownSpot {
                district: district.to_string(),
                spot: spot.to_string(),
            })
        }
    }

    /// Builds a recommendation for `spot` in `district` on `today`.
    ///
    /// Input errors fail fast before any fetch. Feed errors are reported in
    /// `warnings` and never fail the call.
    ///
    /// # Arguments
    /// * `username` - Angler asking; must not be blank
    /// * `district` - District the spot belongs to
    /// * `spot` - Fishing spot listed under `district`
    /// * `today` - Day to score, used for the moon phase and tide selection
    ///
    /// # Returns
    /// * `Ok(Recommendation)` with the readings, score, advisory and warnings
    /// * `Err(AdvisorError)` for a blank username, unknown district or unknown spot
    pub async fn get_recommendation(
        &self,
        username: &str,
        district: &str,
        spot: &str,
        today: NaiveDate,
    ) -> Result<Recommendation, AdvisorError> {
        require_username(username)?;
        self.validate_spot(district, spot)?;
        info!(username, district, spot, %today, "Building recommendation");

        let (weather, tides) =
            future::join(self.feeds.fetch_weather(), self.feeds.fetch_tides(today.year())).await;

        let mut warnings = Vec::new();

        let weather = match weather {
            Ok(doc) => Some(WeatherSnapshot::from_document(&doc)),
            Err(e) => {
                warn!(error = %e, "Weather feed unavailable");
                warnings.push(Warning::WeatherUnavailable {
                    reason: e.to_string(),
                });
                None
            }
        };
        let tides = match tides {
            Ok(doc) => Some(TideTable::from_document(&doc)),
            Err(e) => {
                warn!(error = %e, "Tide feed unavailable");
                warnings.push(Warning::TideUnavailable {
                    reason: e.to_string(),
                });
                None
            }
        };

        let rainfall = self.rainfall_reading(spot, weather.as_ref(), &mut warnings);
        let temperature = self.temperature_reading(district, weather.as_ref(), &mut warnings);
        let tide = self.tide_selection(district, spot, today, tides.as_ref(), &mut warnings);

        let moon_phase = lunar::phase_for(today);
        let result = scoring::recommend(rainfall.amount, tide.leading_type(), moon_phase);
        debug!(
            rainfall = rainfall.amount,
            tide = ?tide.leading_type(),
            moon = ?moon_phase,
            score = result.score,
            "Scored conditions"
        );

        Ok(Recommendation {
            district: district.to_string(),
            spot: spot.to_string(),
            date: today,
            temperature,
            rainfall,
            moon_phase,
            tide,
            score: result.score,
            advisory: result.advisory,
            warnings,
        })
    }

    /// Saves a catch for `username` on `date`, replacing that day's entry.
    ///
    /// The entry's spot must be a configured location.
    pub fn save_catch_log(
        &self,
        username: &str,
        date: NaiveDate,
        entry: CatchLogEntry,
    ) -> Result<(), AdvisorError> {
        require_username(username)?;
        if self.resolver.config().district_of(&entry.spot).is_none() {
            return Err(AdvisorError::UnknownLocation(entry.spot));
        }
        self.store.save(username, date, entry)?;
        Ok(())
    }

    /// All catches of `username` in date order
    pub fn catch_history(&self, username: &str) -> Result<Vec<CatchLogRecord>, AdvisorError> {
        require_username(username)?;
        Ok(self.store.entries_for(username)?)
    }

    fn rainfall_reading(
        &self,
        spot: &str,
        weather: Option<&WeatherSnapshot>,
        warnings: &mut Vec<Warning>,
    ) -> RainfallReading {
        let Some(weather) = weather else {
            return RainfallReading {
                place: Resolution::not_attempted(spot),
                amount: 0.0,
                reported: false,
            };
        };

        let place = self.resolver.resolve_place(spot, weather.rainfall_places());
        let reading = weather.rainfall_reading(&place.name);
        if reading.is_none() {
            warnings.push(Warning::RainfallNotReported {
                place: place.name.clone(),
            });
        }

        RainfallReading {
            place,
            amount: reading.unwrap_or(0.0),
            reported: reading.is_some(),
        }
    }

    fn temperature_reading(
        &self,
        district: &str,
        weather: Option<&WeatherSnapshot>,
        warnings: &mut Vec<Warning>,
    ) -> TemperatureReading {
        let place = self.resolver.temperature_place_for(district).map(String::from);
        let value = match (weather, place.as_deref()) {
            (Some(weather), Some(place)) => weather.temperature_for(place),
            _ => None,
        };

        if weather.is_some() && value.is_none() {
            warnings.push(Warning::TemperatureNotReported {
                place: place.clone(),
            });
        }

        TemperatureReading { place, value }
    }

    fn tide_selection(
        &self,
        district: &str,
        spot: &str,
        today: NaiveDate,
        tides: Option<&TideTable>,
        warnings: &mut Vec<Warning>,
    ) -> TideSelection {
        let station = self.resolver.tide_station_for_spot(district, spot);
        let Some(tides) = tides else {
            return TideSelection::empty(station);
        };

        let selection = tides.events_for(station, today);
        if selection.events.is_empty() {
            warnings.push(Warning::NoTideEvents {
                station: station.to_string(),
            });
        } else if selection.stale {
            warnings.push(Warning::StaleTideData {
                station: station.to_string(),
            });
        }
        selection
    }
}

fn require_username(username: &str) -> Result<(), AdvisorError> {
    if username.trim().is_empty() {
        Err(AdvisorError::MissingUsername)
    } else {
        Ok(())
    }
}
