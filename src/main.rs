//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `geowatch` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::process;

use geowatch::initialization::init_logger_with;
use geowatch::{
    distance_km, run_lookup, run_watch, Config, LookupReport, OutputFormat, TrackedLocation,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    let _ = dotenvy::dotenv();

    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    if config.watch {
        if let Err(e) = run_watch(config).await {
            eprintln!("geowatch error: {:#}", e);
            process::exit(1);
        }
        return Ok(());
    }

    let home = config.home_coordinates();
    let output = config.output.clone();
    match run_lookup(config).await {
        Ok(report) => {
            print_report(&report, home, &output);
            if report.resolved == 0 && report.failed > 0 {
                process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("geowatch error: {:#}", e);
            process::exit(1);
        }
    }
}

fn print_report(report: &LookupReport, home: Option<(f64, f64)>, output: &OutputFormat) {
    match output {
        OutputFormat::Json => {
            for location in &report.locations {
                match serde_json::to_string(location) {
                    Ok(line) => println!("{}", line),
                    Err(e) => eprintln!("Failed to serialize {}: {}", location.ip, e),
                }
            }
        }
        OutputFormat::Table => {
            for location in &report.locations {
                println!("{}", format_row(location, home));
            }
        }
    }

    for (ip, error) in &report.failures {
        let hint = if error.is_transient() {
            " (retryable)"
        } else {
            ""
        };
        eprintln!("{} {}: {}{}", "failed".red(), ip, error, hint);
    }

    println!(
        "Resolved {} of {} address{} in {:.1}s",
        report.resolved,
        report.total,
        if report.total == 1 { "" } else { "es" },
        report.elapsed_seconds
    );
}

fn format_row(location: &TrackedLocation, home: Option<(f64, f64)>) -> String {
    let record = &location.location;
    let place = match (&record.city, &record.country) {
        (Some(city), Some(country)) => format!("{}, {}", city, country),
        (None, Some(country)) => country.clone(),
        _ => "unknown".to_string(),
    };
    let mut row = format!(
        "{:<40} {:<32} {:>9.4} {:>9.4}",
        location.ip.bold(),
        place,
        record.latitude,
        record.longitude
    );
    if let Some((lat, lon)) = home {
        let km = distance_km(lat, lon, record.latitude, record.longitude);
        row.push_str(&format!("  {:>8.0} km away", km));
    }
    if let Some(org) = &record.organization {
        row.push_str(&format!("  {}", org.dimmed()));
    }
    row
}
