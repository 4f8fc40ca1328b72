//! geowatch library: location intelligence for security-event source IPs.
//!
//! This library maintains a bounded, TTL-aware cache of IP geolocations with
//! in-flight request coalescing, enriches a stream of inbound security
//! events with resolved locations, and exposes a deduplicated,
//! capacity-bounded tracked-location store for display layers.
//!
//! # Example
//!
//! ```no_run
//! use geowatch::{run_lookup, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     ips: vec!["8.8.8.8".into(), "1.1.1.1".into()],
//!     ..Default::default()
//! };
//!
//! let report = run_lookup(config).await?;
//! println!("{} of {} addresses resolved", report.resolved, report.total);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

mod cache;
pub mod config;
mod distance;
mod error_handling;
mod events;
mod geo;
pub mod initialization;
mod store;

// Re-export public API
pub use cache::LocationCache;
pub use config::{Config, LogFormat, LogLevel, OutputFormat};
pub use distance::distance_km;
pub use error_handling::{LookupError, LookupErrorKind, LookupStats};
pub use events::{
    EventCategory, EventFeed, EventIngestor, Indicators, SecurityEvent, Severity, SimulatedFeed,
};
pub use geo::{GeoRecord, GeoResolver, HttpGeoResolver};
pub use run::{run_lookup, run_lookup_with_resolver, run_watch, LookupReport};
pub use store::{
    status_for_severity, LocationKind, LocationStatus, TrackedLocation, TrackedLocationStore,
};

// Internal run module (contains the lookup and watch entry points)
mod run {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::{bail, Context, Result};
    use chrono::Utc;
    use futures::stream::{self, StreamExt};
    use log::info;
    use tokio_retry::strategy::{jitter, ExponentialBackoff};
    use tokio_retry::RetryIf;

    use crate::cache::LocationCache;
    use crate::config::{
        Config, RETRY_BASE_DELAY_MS, RETRY_MAX_ATTEMPTS, SIMULATED_EVENT_INTERVAL,
    };
    use crate::error_handling::{LookupError, LookupStats};
    use crate::events::{EventFeed, EventIngestor, SimulatedFeed};
    use crate::geo::{GeoResolver, HttpGeoResolver};
    use crate::initialization::init_http_client;
    use crate::store::{
        LocationKind, LocationStatus, TrackedLocation, TrackedLocationStore,
    };

    /// Results of a bulk lookup run.
    #[derive(Debug, Clone)]
    pub struct LookupReport {
        /// Number of distinct addresses requested.
        pub total: usize,
        /// Number of addresses successfully resolved.
        pub resolved: usize,
        /// Number of addresses that failed to resolve.
        pub failed: usize,
        /// Elapsed time in seconds.
        pub elapsed_seconds: f64,
        /// Resolved locations, newest first.
        pub locations: Vec<TrackedLocation>,
        /// Failed addresses with their errors, for user-facing display.
        pub failures: Vec<(String, LookupError)>,
    }

    /// Resolves the configured IP addresses through a fresh cache and
    /// reports the outcome.
    ///
    /// This is the manual/bulk lookup entry point: unlike event ingestion,
    /// failures here are surfaced to the caller. Rate-limited lookups are
    /// retried with exponential backoff before being reported as failures.
    ///
    /// # Errors
    ///
    /// Fails if no addresses were supplied, the input file is unreadable,
    /// or the HTTP client cannot be constructed. Individual lookup failures
    /// do not fail the run; they are returned in the report.
    pub async fn run_lookup(config: Config) -> Result<LookupReport> {
        let client = init_http_client(Duration::from_secs(config.timeout_seconds))
            .context("Failed to initialize HTTP client")?;
        let resolver = Arc::new(HttpGeoResolver::new(client, config.geo_endpoint.clone()));
        run_lookup_with_resolver(config, resolver).await
    }

    /// [`run_lookup`] with an explicit resolver, for embedders and tests.
    pub async fn run_lookup_with_resolver(
        config: Config,
        resolver: Arc<dyn GeoResolver>,
    ) -> Result<LookupReport> {
        let started = std::time::Instant::now();

        let ips = gather_input_ips(&config).await?;
        if ips.is_empty() {
            bail!("No IP addresses provided (pass them as arguments or via --file)");
        }
        info!("Resolving {} distinct address(es)", ips.len());

        let cache = LocationCache::new(
            resolver,
            config.cache_capacity,
            config.cache_ttl(),
            config.max_concurrency,
        );
        let store = TrackedLocationStore::new(config.store_capacity.max(ips.len()));
        let stats = LookupStats::new();

        let outcomes: Vec<(String, Result<crate::geo::GeoRecord, LookupError>)> =
            stream::iter(ips.iter().cloned())
                .map(|ip| {
                    let cache = &cache;
                    async move {
                        let result = resolve_with_backoff(cache, &ip).await;
                        (ip, result)
                    }
                })
                .buffer_unordered(config.max_concurrency.max(1))
                .collect()
                .await;

        let mut failures = Vec::new();
        for (ip, outcome) in outcomes {
            match outcome {
                Ok(record) => {
                    stats.record_resolved();
                    store
                        .add(TrackedLocation {
                            ip: record.ip.clone(),
                            location: record,
                            timestamp: Utc::now(),
                            kind: LocationKind::User,
                            status: LocationStatus::Active,
                            severity: None,
                            event_type: None,
                            name: None,
                        })
                        .await;
                }
                Err(e) => {
                    stats.record_failure(e.kind());
                    failures.push((ip, e));
                }
            }
        }
        stats.log_summary();

        Ok(LookupReport {
            total: ips.len(),
            resolved: stats.resolved(),
            failed: failures.len(),
            elapsed_seconds: started.elapsed().as_secs_f64(),
            locations: store.snapshot().await,
            failures,
        })
    }

    /// Runs the event-watch demo: a simulated feed drives the ingestor and
    /// the tracked-location store until Ctrl-C or the configured duration.
    ///
    /// # Errors
    ///
    /// Fails only on setup problems; ingestion-path lookup failures are
    /// best-effort and never abort the watch.
    pub async fn run_watch(config: Config) -> Result<()> {
        let client = init_http_client(Duration::from_secs(config.timeout_seconds))
            .context("Failed to initialize HTTP client")?;
        let resolver = Arc::new(HttpGeoResolver::new(client, config.geo_endpoint.clone()));

        let cache = LocationCache::new(
            resolver,
            config.cache_capacity,
            config.cache_ttl(),
            config.max_concurrency,
        );
        let store = Arc::new(TrackedLocationStore::new(config.store_capacity));
        let feed = Arc::new(SimulatedFeed::new());
        feed.start(SIMULATED_EVENT_INTERVAL);

        let ingestor = EventIngestor::new(
            cache,
            Arc::clone(&store),
            Arc::clone(&feed) as Arc<dyn EventFeed>,
            config.poll_interval(),
            config.poll_depth,
        );
        ingestor.start();
        info!("Watching simulated event feed (Ctrl-C to stop)");

        let run_for = async {
            match config.watch_seconds {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => futures::future::pending::<()>().await,
            }
        };
        tokio::pin!(run_for);

        let mut report_ticker = tokio::time::interval(Duration::from_secs(10));
        report_ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = &mut run_for => break,
                _ = tokio::signal::ctrl_c() => break,
                _ = report_ticker.tick() => {
                    let snapshot = store.snapshot().await;
                    if let Some(newest) = snapshot.first() {
                        info!(
                            "Tracking {} location(s); newest: {} ({:?}, {:?})",
                            snapshot.len(),
                            newest.ip,
                            newest.status,
                            newest.location.country.as_deref().unwrap_or("unknown")
                        );
                    }
                }
            }
        }

        ingestor.stop();
        feed.stop();
        Ok(())
    }

    /// Resolves one address, retrying only rate-limited outcomes with
    /// jittered exponential backoff.
    async fn resolve_with_backoff(
        cache: &LocationCache,
        ip: &str,
    ) -> Result<crate::geo::GeoRecord, LookupError> {
        let strategy = ExponentialBackoff::from_millis(RETRY_BASE_DELAY_MS)
            .map(jitter)
            .take(RETRY_MAX_ATTEMPTS - 1);
        RetryIf::spawn(
            strategy,
            || cache.resolve(ip),
            |e: &LookupError| matches!(e, LookupError::RateLimited),
        )
        .await
    }

    /// Collects the input addresses from CLI arguments and the optional
    /// input file, deduplicating while preserving first-seen order.
    async fn gather_input_ips(config: &Config) -> Result<Vec<String>> {
        let mut ips = config.ips.clone();

        if let Some(path) = &config.file {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read input file {}", path.display()))?;
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                ips.push(line.to_string());
            }
        }

        let mut seen = HashSet::new();
        ips.retain(|ip| seen.insert(ip.clone()));
        Ok(ips)
    }
}
