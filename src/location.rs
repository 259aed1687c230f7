//! Location resolution
//!
//! Maps a chosen spot to the identifiers the feeds use: the rainfall place
//! name (by fuzzy match against what the latest weather report lists), the
//! tide station, and the district's temperature place.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::config::{LocationConfig, DEFAULT_TIDE_STATION};
use crate::similarity::{self, DEFAULT_CUTOFF};

/// How a place name was arrived at
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum ResolutionPath {
    /// The input is itself one of the candidates
    Exact,
    /// A candidate cleared the similarity cutoff
    Fuzzy { similarity: f64 },
    /// Nothing matched; the input is used verbatim
    Fallback,
    /// No report to match against; the input is used verbatim
    NotAttempted,
}

impl Resolution {
    /// The input kept verbatim because there was nothing to match against
    pub fn not_attempted(input: &str) -> Self {
        Self {
            name: input.to_string(),
            path: ResolutionPath::NotAttempted,
        }
    }
}

/// A resolved place name plus how it was chosen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Name to look up in the feed
    pub name: String,
    /// Which path produced `name`
    #[serde(flatten)]
    pub path: ResolutionPath,
}

/// Resolves spots and districts against the static tables
#[derive(Debug, Clone)]
pub struct LocationResolver {
    config: Arc<LocationConfig>,
    cutoff: f64,
}

impl LocationResolver {
    /// Creates a resolver with the default 0.6 similarity cutoff
    pub fn new(config: Arc<LocationConfig>) -> Self {
        Self {
            config,
            cutoff: DEFAULT_CUTOFF,
        }
    }

    /// Overrides the similarity cutoff
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// The tables this resolver reads
    pub fn config(&self) -> &LocationConfig {
        &self.config
    }

    /// Picks the feed place name for `input` among `candidates`.
    ///
    /// An exact member wins outright; otherwise the most similar candidate at
    /// or above the cutoff (first one on ties); otherwise `input` verbatim.
    pub fn resolve_place<'a, I>(&self, input: &str, candidates: I) -> Resolution
    where
        I: IntoIterator<Item = &'a str>,
        I::IntoIter: Clone,
    {
        let candidates = candidates.into_iter();

        if candidates.clone().any(|candidate| candidate == input) {
            debug!(input, "Place resolved exactly");
            return Resolution {
                name: input.to_string(),
                path: ResolutionPath::Exact,
            };
        }

        match similarity::find_best_match(input, candidates, self.cutoff) {
            Some((name, score)) => {
                debug!(input, matched = name, score, "Place resolved by similarity");
                Resolution {
                    name: name.to_string(),
                    path: ResolutionPath::Fuzzy { similarity: score },
                }
            }
            None => {
                debug!(input, "No place cleared the cutoff, using input verbatim");
                Resolution {
                    name: input.to_string(),
                    path: ResolutionPath::Fallback,
                }
            }
        }
    }

    /// Tide station for a spot or district name, or the default station.
    pub fn tide_station_for(&self, location: &str) -> &str {
        self.config
            .tide_station_entry(location)
            .unwrap_or(DEFAULT_TIDE_STATION)
    }

    /// Tide station for a spot: the spot's own entry, then its district's,
    /// then the default station.
    pub fn tide_station_for_spot(&self, district: &str, spot: &str) -> &str {
        self.config
            .tide_station_entry(spot)
            .or_else(|| self.config.tide_station_entry(district))
            .unwrap_or(DEFAULT_TIDE_STATION)
    }

    /// Temperature report place for a district, if one is configured
    pub fn temperature_place_for(&self, district: &str) -> Option<&str> {
        self.config.temperature_place(district)
    }
}
