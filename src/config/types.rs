//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument
//! parsing and programmatic configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_MINUTES, DEFAULT_GEO_ENDPOINT,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_POLL_DEPTH, DEFAULT_POLL_INTERVAL_SECONDS,
    DEFAULT_STORE_CAPACITY, DEFAULT_TIMEOUT_SECONDS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to
/// most verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Result output format for the lookup mode.
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Aligned human-readable table (default)
    Table,
    /// One JSON object per resolved location
    Json,
}

/// Application configuration.
///
/// Doubles as the CLI argument definition (via clap derive) and the
/// programmatic configuration for library embedders.
///
/// # Examples
///
/// ```no_run
/// use geowatch::Config;
///
/// let config = Config {
///     ips: vec!["8.8.8.8".into()],
///     max_concurrency: 4,
///     ..Default::default()
/// };
/// ```
#[derive(Parser, Debug, Clone)]
#[command(
    name = "geowatch",
    about = "Resolve and track the geolocation of security-event source IPs"
)]
pub struct Config {
    /// IP addresses to resolve (use --file for bulk input)
    pub ips: Vec<String>,

    /// File with one IP address per line ('#' starts a comment)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// Result output format
    #[arg(long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Maximum resolved entries held in the location cache
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: usize,

    /// Cache TTL in minutes; older entries re-resolve on next access
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_MINUTES)]
    pub cache_ttl_minutes: u64,

    /// Maximum concurrently outstanding resolver calls
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Per-request resolver timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    /// Geolocation resolver endpoint (ip-api.com style JSON)
    #[arg(long, default_value = DEFAULT_GEO_ENDPOINT)]
    pub geo_endpoint: String,

    /// Device latitude for "distance from here" annotations
    #[arg(long, requires = "home_lon")]
    pub home_lat: Option<f64>,

    /// Device longitude for "distance from here" annotations
    #[arg(long, requires = "home_lat")]
    pub home_lon: Option<f64>,

    /// Run the event-watch demo (simulated feed -> ingestor -> store)
    /// instead of resolving IPs
    #[arg(long)]
    pub watch: bool,

    /// Stop the watch mode after this many seconds (default: until Ctrl-C)
    #[arg(long)]
    pub watch_seconds: Option<u64>,

    /// Capacity of the tracked-location display store
    #[arg(long, default_value_t = DEFAULT_STORE_CAPACITY)]
    pub store_capacity: usize,

    /// Reconciliation poll interval in seconds for the event ingestor
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECONDS)]
    pub poll_interval_seconds: u64,

    /// Number of recent events re-fetched per reconciliation poll
    #[arg(long, default_value_t = DEFAULT_POLL_DEPTH)]
    pub poll_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ips: Vec::new(),
            file: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            output: OutputFormat::Table,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            geo_endpoint: DEFAULT_GEO_ENDPOINT.to_string(),
            home_lat: None,
            home_lon: None,
            watch: false,
            watch_seconds: None,
            store_capacity: DEFAULT_STORE_CAPACITY,
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            poll_depth: DEFAULT_POLL_DEPTH,
        }
    }
}

impl Config {
    /// Cache TTL as a `Duration`.
    pub fn cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache_ttl_minutes * 60)
    }

    /// Reconciliation poll interval as a `Duration`.
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_seconds)
    }

    /// Device coordinates, if both were supplied.
    pub fn home_coordinates(&self) -> Option<(f64, f64)> {
        match (self.home_lat, self.home_lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}
