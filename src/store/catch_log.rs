//! JSON-file backed catch log
//!
//! Provides a `CatchLogStore` that reads and rewrites the whole log document.
//! Each read-modify-write cycle holds an exclusive OS lock on a sibling
//! `<log>.lock` file, so separate `fishcast` processes take turns. The new
//! document is written to a uniquely named temp file in the same directory and
//! renamed over the log.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use fd_lock::RwLock;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AppConfig;

/// Date key format inside the log document
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Suffix of the lock file kept next to the log
const LOCK_SUFFIX: &str = ".lock";

/// Errors that can occur when reading or writing the catch log
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed
    #[error("Catch log I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The existing log file is not a valid catch log document
    #[error("Catch log at {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The log could not be serialised
    #[error("Failed to serialise catch log: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No log path configured and no platform data directory available
    #[error("Could not determine a data directory for the catch log")]
    NoDataDirectory,
}

/// One day's catch at a spot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchLogEntry {
    /// Location fished
    pub spot: String,
    /// Species caught
    #[serde(default)]
    pub species: Vec<String>,
    /// Number of fish
    #[serde(rename = "qty", default)]
    pub quantity: u32,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
}

impl CatchLogEntry {
    /// Creates an entry, splitting `species` on commas and dropping blanks
    pub fn new(
        spot: impl Into<String>,
        species: &str,
        quantity: u32,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            spot: spot.into(),
            species: species
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            quantity,
            notes: notes.into(),
        }
    }
}

/// An entry together with its date key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatchLogRecord {
    /// Date key as stored (`YYYY-MM-DD`)
    pub date: String,
    #[serde(flatten)]
    pub entry: CatchLogEntry,
}

/// Entries of one user, keyed by date
pub type UserLog = BTreeMap<String, CatchLogEntry>;

/// The whole log document, keyed by username
pub type CatchLog = BTreeMap<String, UserLog>;

/// Reads and writes the catch log file
///
/// Any number of stores, in this process or others, may point at the same
/// path. Writers serialise on the lock file; readers see either the old or
/// the new document, never a partial one.
#[derive(Debug, Clone)]
pub struct CatchLogStore {
    /// Log file location
    path: PathBuf,
}

impl CatchLogStore {
    /// Creates a store for an explicit file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the configured or platform default location
    pub fn open_default(config: &AppConfig) -> Result<Self, StoreError> {
        let path = config.log_path().ok_or(StoreError::NoDataDirectory)?;
        debug!(path = %path.display(), "Using catch log");
        Ok(Self::with_path(path))
    }

    /// Log file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock file location (`<log>.lock`)
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(LOCK_SUFFIX);
        self.path.with_file_name(name)
    }

    /// Reads the whole log. A missing or blank file is an empty log.
    pub fn read_all(&self) -> Result<CatchLog, StoreError> {
        self.load()
    }

    /// Entries of one user in date order
    pub fn entries_for(&self, username: &str) -> Result<Vec<CatchLogRecord>, StoreError> {
        let mut log = self.read_all()?;
        let records = log
            .remove(username)
            .unwrap_or_default()
            .into_iter()
            .map(|(date, entry)| CatchLogRecord { date, entry })
            .collect();
        Ok(records)
    }

    /// Saves a catch, replacing any entry already stored under that user and date.
    ///
    /// Blocks until no other writer holds the lock file. A corrupt existing
    /// file is reported and left untouched.
    ///
    /// # Arguments
    /// * `username` - Owner of the entry (first nesting key)
    /// * `date` - Day of the catch (second nesting key, stored as `YYYY-MM-DD`)
    /// * `entry` - The catch itself
    ///
    /// # Returns
    /// * `Ok(())` once the new document has replaced the log on disk
    /// * `Err(StoreError)` if the lock, the read, or the write fails
    pub fn save(
        &self,
        username: &str,
        date: NaiveDate,
        entry: CatchLogEntry,
    ) -> Result<(), StoreError> {
        let dir = self.dir();
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|source| StoreError::Io {
                path: lock_path.clone(),
                source,
            })?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock.write().map_err(|source| StoreError::Io {
            path: lock_path.clone(),
            source,
        })?;

        let mut log = self.load()?;
        let key = date.format(DATE_FORMAT).to_string();
        let replaced = log
            .entry(username.to_string())
            .or_default()
            .insert(key.clone(), entry)
            .is_some();

        self.persist(&log)?;
        info!(username, date = %key, replaced, "Saved catch log entry");
        Ok(())
    }

    /// Directory holding the log, its lock file and temp files
    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn load(&self) -> Result<CatchLog, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CatchLog::new()),
            Err(source) => return Err(self.io_error(source)),
        };

        if content.trim().is_empty() {
            return Ok(CatchLog::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes the log to a fresh temp file, then renames it over the target
    fn persist(&self, log: &CatchLog) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(log)?;
        let dir = self.dir();
        let dir_error = |source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(dir_error)?;
        tmp.write_all(json.as_bytes()).map_err(dir_error)?;
        tmp.as_file().sync_all().map_err(dir_error)?;
        tmp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
