//! fishcast - Hong Kong fishing conditions and catch log
//!
//! Command-line front end: parses arguments, loads configuration, wires the
//! advisor to the Observatory feeds and the catch log, and prints results.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fishcast::advisor::Advisor;
use fishcast::cli::{self, Cli, Command};
use fishcast::config::AppConfig;
use fishcast::data::HkoClient;
use fishcast::display;
use fishcast::location::LocationResolver;
use fishcast::store::{CatchLogEntry, CatchLogStore};

/// Installs the stderr log subscriber; stdout is kept for reports
fn init_tracing(verbose: u8) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| cli::log_filter(verbose).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load_default()?,
    };
    let locations = Arc::new(config.location_config()?);

    if let Command::Districts = cli.command {
        for district in locations.district_names() {
            let spots = locations.locations_in(district).unwrap_or_default();
            println!("{district}: {}", spots.join(", "));
        }
        return Ok(());
    }

    let resolver = LocationResolver::new(locations);
    let store = CatchLogStore::open_default(&config)?;
    let feeds = HkoClient::new(&config.feeds)?;
    let advisor = Advisor::new(resolver, feeds, store);

    match cli.command {
        Command::Recommend {
            user,
            district,
            spot,
            date,
            json,
        } => {
            let day = cli::resolve_date(date.as_deref(), cli::hk_today())?;
            let rec = advisor.get_recommendation(&user, &district, &spot, day).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rec)?);
            } else {
                println!("Welcome {user}! Checking info for {spot}...\n");
                print!("{}", display::render_recommendation(&rec));
            }
        }
        Command::Log {
            user,
            spot,
            species,
            qty,
            notes,
            date,
        } => {
            let day = cli::resolve_date(date.as_deref(), cli::hk_today())?;
            let entry = CatchLogEntry::new(spot, &species, qty, notes);
            advisor.save_catch_log(&user, day, entry)?;
            println!("🎉 Log saved!");
        }
        Command::History { user, json } => {
            let records = advisor.catch_history(&user)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print!("{}", display::render_history(&user, &records));
            }
        }
        Command::Districts => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
