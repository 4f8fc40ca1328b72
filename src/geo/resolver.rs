//! The resolver boundary.
//!
//! Everything upstream of the cache talks to geolocation through this trait,
//! so the network-bound resolver can be swapped for a mock in tests or a
//! different provider in deployment.

use std::net::IpAddr;

use async_trait::async_trait;

use crate::error_handling::LookupError;
use crate::geo::types::GeoRecord;

/// A source of geolocation records.
///
/// Implementations are expected to be rate-limited and network-bound; the
/// cache layer above coalesces concurrent lookups so an implementation never
/// sees two outstanding calls for the same address.
#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// Resolves one IP address to a geolocation record.
    ///
    /// The address has already been syntax-validated; implementations signal
    /// backend failures as `ResolverUnavailable` and throttling as
    /// `RateLimited`.
    async fn lookup(&self, ip: IpAddr) -> Result<GeoRecord, LookupError>;
}
