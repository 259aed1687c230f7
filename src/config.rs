//! Configuration management
//!
//! Two layers:
//! - [`AppConfig`]: runtime settings (feed endpoints, timeout, file paths) read
//!   from `fishcast.toml`.
//! - [`LocationConfig`]: the static district, tide-station and temperature-place
//!   tables. Defaults are bundled into the binary and can be replaced by JSON
//!   files named in `AppConfig`.
//!
//! Both are loaded once at startup and handed to the components that need them.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Name of the config file looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "fishcast.toml";

/// Default catch log file name inside the platform data directory
const LOG_FILE_NAME: &str = "catch_log.json";

/// Tide station used when neither the spot nor its district is mapped
pub const DEFAULT_TIDE_STATION: &str = "尖沙咀";

const BUNDLED_DISTRICTS: &str = include_str!("../data/hk_districts.json");
const BUNDLED_TIDE_STATIONS: &str = include_str!("../data/district_to_tide_station.json");
const BUNDLED_TEMP_STATIONS: &str = include_str!("../data/district_to_temp_station.json");

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config or data file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML config did not parse
    #[error("Invalid config file {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A location JSON document did not parse
    #[error("Invalid location data in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// A location is listed under more than one district
    #[error("Location '{location}' is listed under both '{first}' and '{second}'")]
    DuplicateLocation {
        location: String,
        first: String,
        second: String,
    },

    /// A district has no locations
    #[error("District '{0}' has no locations")]
    EmptyDistrict(String),
}

/// Runtime settings loaded from `fishcast.toml`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Open-data feed settings
    pub feeds: FeedConfig,
    /// Catch log storage settings
    pub storage: StorageConfig,
    /// Optional overrides for the bundled location tables
    pub locations: LocationPaths,
}

/// Weather and tide feed endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Current-weather report endpoint (without query string)
    pub weather_url: String,
    /// Tide times endpoint (without query string)
    pub tide_url: String,
    /// Feed language code, e.g. "tc" or "en"
    pub lang: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            weather_url: "https://data.weather.gov.hk/weatherAPI/opendata/weather.php".to_string(),
            tide_url: "https://data.weather.gov.hk/weatherAPI/opendata/tideTimes.php".to_string(),
            lang: "tc".to_string(),
            timeout_secs: 10,
        }
    }
}

impl FeedConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Where the catch log lives
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Explicit log file path; defaults to the platform data directory
    pub log_path: Option<PathBuf>,
}

/// Paths to JSON documents replacing the bundled location tables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationPaths {
    /// `{district: [location, ...]}`
    pub districts: Option<PathBuf>,
    /// `{district or location: tide station}`
    pub tide_stations: Option<PathBuf>,
    /// `{district: temperature place}`
    pub temperature_places: Option<PathBuf>,
}

impl AppConfig {
    /// Loads configuration from an explicit path. Errors are fatal here since
    /// the caller asked for this file specifically.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str::<AppConfig>(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Loads `fishcast.toml` from the platform config directory, or defaults
    /// when there is no such file.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from_path(path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Resolved catch log path
    ///
    /// Returns `None` only when no explicit path is configured and the
    /// platform data directory cannot be determined (e.g. no home directory).
    pub fn log_path(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.storage.log_path {
            return Some(path.clone());
        }
        let dirs = ProjectDirs::from("", "", "fishcast")?;
        Some(dirs.data_dir().join(LOG_FILE_NAME))
    }

    /// Builds the location tables, reading any override files.
    pub fn location_config(&self) -> Result<LocationConfig, ConfigError> {
        let districts = read_document(self.locations.districts.as_deref(), BUNDLED_DISTRICTS)?;
        let tide = read_document(self.locations.tide_stations.as_deref(), BUNDLED_TIDE_STATIONS)?;
        let temp = read_document(
            self.locations.temperature_places.as_deref(),
            BUNDLED_TEMP_STATIONS,
        )?;
        LocationConfig::from_json(&districts, &tide, &temp)
    }
}

/// Platform config file path (`~/.config/fishcast/fishcast.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "fishcast")?;
    Some(dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Reads an override file, or falls back to the bundled document.
/// Returns `(origin, contents)`.
fn read_document(path: Option<&Path>, bundled: &str) -> Result<(String, String), ConfigError> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok((path.display().to_string(), contents))
        }
        None => Ok(("bundled data".to_string(), bundled.to_string())),
    }
}

/// Parses one `(origin, json)` location document
fn parse_document<T>(doc: &(String, String)) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(&doc.1).map_err(|source| ConfigError::Json {
        origin: doc.0.clone(),
        source,
    })
}

/// Immutable district, tide-station and temperature-place tables
#[derive(Debug, Clone)]
pub struct LocationConfig {
    /// District name to its ordered location names; districts iterate sorted
    districts: BTreeMap<String, Vec<String>>,
    /// District or location name to tide station name
    tide_stations: HashMap<String, String>,
    /// District name to temperature report place name
    temperature_places: HashMap<String, String>,
    /// Reverse index: location name to owning district
    location_index: HashMap<String, String>,
}

impl LocationConfig {
    /// Builds the tables from three `(origin, json)` documents.
    pub fn from_json(
        districts: &(String, String),
        tide_stations: &(String, String),
        temperature_places: &(String, String),
    ) -> Result<Self, ConfigError> {
        let district_map: BTreeMap<String, Vec<String>> = parse_document(districts)?;
        let tide_map: HashMap<String, String> = parse_document(tide_stations)?;
        let temp_map: HashMap<String, String> = parse_document(temperature_places)?;

        Self::new(district_map, tide_map, temp_map)
    }

    /// Builds the tables from already-parsed maps, validating that every
    /// location belongs to exactly one district.
    pub fn new(
        districts: BTreeMap<String, Vec<String>>,
        tide_stations: HashMap<String, String>,
        temperature_places: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut location_index: HashMap<String, String> = HashMap::new();

        for (district, locations) in &districts {
            if locations.is_empty() {
                return Err(ConfigError::EmptyDistrict(district.clone()));
            }
            for location in locations {
                if let Some(first) = location_index.get(location) {
                    return Err(ConfigError::DuplicateLocation {
                        location: location.clone(),
                        first: first.clone(),
                        second: district.clone(),
                    });
                }
                location_index.insert(location.clone(), district.clone());
            }
        }

        debug!(
            districts = districts.len(),
            locations = location_index.len(),
            "Location tables loaded"
        );

        Ok(Self {
            districts,
            tide_stations,
            temperature_places,
            location_index,
        })
    }

    /// Bundled Hong Kong tables
    pub fn bundled() -> Result<Self, ConfigError> {
        AppConfig::default().location_config()
    }

    /// District names in sorted order
    pub fn district_names(&self) -> impl Iterator<Item = &str> {
        self.districts.keys().map(String::as_str)
    }

    /// Locations of a district in configured order
    pub fn locations_in(&self, district: &str) -> Option<&[String]> {
        self.districts.get(district).map(Vec::as_slice)
    }

    /// District that owns a location
    pub fn district_of(&self, location: &str) -> Option<&str> {
        self.location_index.get(location).map(String::as_str)
    }

    /// Raw tide-station entry for a district or location name
    pub fn tide_station_entry(&self, name: &str) -> Option<&str> {
        self.tide_stations.get(name).map(String::as_str)
    }

    /// Temperature report place for a district
    pub fn temperature_place(&self, district: &str) -> Option<&str> {
        self.temperature_places.get(district).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn doc(json: &str) -> (String, String) {
        ("test".to_string(), json.to_string())
    }

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();
        assert_eq!(config.feeds.lang, "tc");
        assert_eq!(config.feeds.timeout_secs, 10);
        assert_eq!(config.feeds.timeout(), Duration::from_secs(10));
        assert!(config.storage.log_path.is_none());
        assert!(config.locations.districts.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("fishcast.toml");
        fs::write(&path, "[feeds]\ntimeout_secs = 3\n\n[storage]\nlog_path = \"/tmp/log.json\"\n")
            .unwrap();

        let config = AppConfig::load_from_path(&path).expect("config should parse");
        assert_eq!(config.feeds.timeout_secs, 3);
        assert_eq!(config.feeds.lang, "tc");
        assert_eq!(config.log_path(), Some(PathBuf::from("/tmp/log.json")));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("fishcast.toml");
        fs::write(&path, "[feeds\n").unwrap();

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = AppConfig::load_from_path("/nonexistent/fishcast.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_zero_timeout_is_raised_to_one_second() {
        let feeds = FeedConfig {
            timeout_secs: 0,
            ..FeedConfig::default()
        };
        assert_eq!(feeds.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_bundled_tables_load() {
        let locations = LocationConfig::bundled().expect("bundled data must be valid");
        let districts: Vec<&str> = locations.district_names().collect();
        assert!(districts.contains(&"西貢"));

        let mut sorted = districts.clone();
        sorted.sort();
        assert_eq!(districts, sorted, "districts iterate in sorted order");

        assert_eq!(locations.district_of("西貢碼頭"), Some("西貢"));
        assert_eq!(locations.temperature_place("西貢"), Some("西貢"));
        assert_eq!(locations.tide_station_entry("西貢"), Some("大廟灣"));
    }

    #[test]
    fn test_locations_keep_configured_order() {
        let locations = LocationConfig::from_json(
            &doc(r#"{"A": ["z", "a", "m"]}"#),
            &doc("{}"),
            &doc("{}"),
        )
        .unwrap();
        assert_eq!(
            locations.locations_in("A").unwrap(),
            &["z".to_string(), "a".to_string(), "m".to_string()]
        );
        assert!(locations.locations_in("B").is_none());
    }

    #[test]
    fn test_duplicate_location_rejected() {
        let err = LocationConfig::from_json(
            &doc(r#"{"A": ["pier"], "B": ["pier"]}"#),
            &doc("{}"),
            &doc("{}"),
        )
        .unwrap_err();
        match err {
            ConfigError::DuplicateLocation {
                location,
                first,
                second,
            } => {
                assert_eq!(location, "pier");
                assert_eq!(first, "A");
                assert_eq!(second, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_district_rejected() {
        let err = LocationConfig::from_json(&doc(r#"{"A": []}"#), &doc("{}"), &doc("{}"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyDistrict(ref d) if d == "A"));
    }

    #[test]
    fn test_override_file_replaces_bundled_table() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let districts_path = temp_dir.path().join("districts.json");
        fs::write(&districts_path, r#"{"Harbour": ["North Pier"]}"#).unwrap();

        let config = AppConfig {
            locations: LocationPaths {
                districts: Some(districts_path),
                ..LocationPaths::default()
            },
            ..AppConfig::default()
        };
        let locations = config.location_config().unwrap();
        assert_eq!(locations.district_names().collect::<Vec<_>>(), vec!["Harbour"]);
        // Tide table is still the bundled one
        assert_eq!(locations.tide_station_entry("西貢"), Some("大廟灣"));
    }

    #[test]
    fn test_malformed_location_json_reports_origin() {
        let err = LocationConfig::from_json(&doc("[1, 2]"), &doc("{}"), &doc("{}")).unwrap_err();
        assert!(err.to_string().contains("test"));
    }
}
