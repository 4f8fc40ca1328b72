//! Configuration constants.
//!
//! This module defines the default operational parameters: cache sizing,
//! TTLs, concurrency bounds, and timeouts. All of them are overridable via
//! `Config`; none is a hard requirement of the protocol.

use std::time::Duration;

/// Default maximum number of resolved entries held by the location cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Default cache TTL: 30 minutes. Geolocation assignments move slowly, but a
/// dashboard left open for hours should not keep serving stale records.
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 30;

/// Default bound on concurrently outstanding resolver calls in bulk lookups.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Per-request HTTP timeout for resolver calls, in seconds. Expiry surfaces
/// as `LookupError::ResolverUnavailable`.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Default capacity of the tracked-location display store.
pub const DEFAULT_STORE_CAPACITY: usize = 50;

/// Default reconciliation poll interval for the event ingestor, in seconds.
/// A missed push notification self-heals within one interval.
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 30;

/// Number of recent events re-fetched per reconciliation poll.
pub const DEFAULT_POLL_DEPTH: usize = 20;

/// Default geolocation resolver endpoint (ip-api.com style JSON responses).
pub const DEFAULT_GEO_ENDPOINT: &str = "http://ip-api.com/json";

/// Maximum attempts for rate-limited manual lookups (initial try + retries).
pub const RETRY_MAX_ATTEMPTS: usize = 3;

/// Base delay for the exponential retry backoff.
pub const RETRY_BASE_DELAY_MS: u64 = 50;

/// Event production interval for the simulated feed.
pub const SIMULATED_EVENT_INTERVAL: Duration = Duration::from_secs(3);
