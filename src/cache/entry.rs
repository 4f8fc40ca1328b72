//! Cache entry representation.

use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;

use crate::error_handling::LookupError;
use crate::geo::GeoRecord;

/// A lookup future shared by every caller attached to one in-flight key.
pub(crate) type SharedLookup = Shared<BoxFuture<'static, Result<GeoRecord, LookupError>>>;

/// One slot in the cache map: either a resolved record with its write time,
/// or the shared future of an outstanding lookup. Never both.
pub(crate) enum CacheEntry {
    /// A completed resolution. `resolved_at` drives both TTL checks and
    /// least-recently-resolved eviction.
    Resolved {
        /// The resolved record, cloned out to callers.
        record: GeoRecord,
        /// When the record was written (tokio clock, so tests can pause it).
        resolved_at: Instant,
    },
    /// An outstanding lookup all concurrent requesters await.
    Pending {
        /// The shared lookup future callers attach to.
        shared: SharedLookup,
        /// Identity of the lookup that owns this marker. The write-back
        /// checks it so a lookup that was superseded (e.g. by `clear`)
        /// cannot clobber a newer entry for the same key.
        lookup_id: u64,
    },
}
