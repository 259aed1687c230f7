//! Command-line interface parsing for fishcast
//!
//! This module handles parsing of CLI arguments using clap: one subcommand per
//! advisor operation plus the global `--config` and `-v` flags.

use std::path::PathBuf;

use chrono::{Duration, NaiveDate, Utc};
use clap::{ArgAction, Parser, Subcommand};
use thiserror::Error;

/// Date format accepted on the command line
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Hong Kong is UTC+8 all year
const HK_UTC_OFFSET_HOURS: i64 = 8;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The date argument is not a valid calendar date
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// fishcast - Hong Kong fishing conditions and catch log
#[derive(Parser, Debug)]
#[command(name = "fishcast")]
#[command(about = "Hong Kong fishing conditions and catch log")]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score today's fishing conditions at a spot
    ///
    /// Example:
    ///   fishcast recommend --user amy --district 西貢 --spot 西灣
    Recommend {
        /// Angler name
        #[arg(long)]
        user: String,
        /// District the spot belongs to
        #[arg(long)]
        district: String,
        /// Fishing spot
        #[arg(long)]
        spot: String,
        /// Day to score (defaults to today in Hong Kong)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,
        /// Print the recommendation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a catch, replacing any entry for the same day
    Log {
        /// Angler name
        #[arg(long)]
        user: String,
        /// Spot fished
        #[arg(long)]
        spot: String,
        /// Comma-separated species, e.g. "黑鱲,石斑"
        #[arg(long, default_value = "")]
        species: String,
        /// Number of fish caught
        #[arg(long, default_value_t = 0)]
        qty: u32,
        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,
        /// Day of the catch (defaults to today in Hong Kong)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,
    },

    /// Show a user's logged catches
    History {
        /// Angler name
        #[arg(long)]
        user: String,
        /// Print the history as JSON
        #[arg(long)]
        json: bool,
    },

    /// List districts and their spots
    Districts,
}

/// Parses a `YYYY-MM-DD` date argument.
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| CliError::InvalidDate(s.to_string()))
}

/// The requested date, or `today` when none was given
pub fn resolve_date(arg: Option<&str>, today: NaiveDate) -> Result<NaiveDate, CliError> {
    arg.map_or(Ok(today), parse_date_arg)
}

/// Current calendar date in Hong Kong
pub fn hk_today() -> NaiveDate {
    (Utc::now() + Duration::hours(HK_UTC_OFFSET_HOURS)).date_naive()
}

/// Default log filter for a `-v` count
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "fishcast=warn",
        1 => "fishcast=info",
        _ => "fishcast=debug",
    }
}
