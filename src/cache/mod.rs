//! Bounded, TTL-aware geolocation cache with in-flight coalescing.
//!
//! The cache is the concurrency heart of the crate. Its invariants:
//! - at most one entry per IP key, either resolved or pending, never both;
//! - at most one outstanding resolver call per key (concurrent `resolve`
//!   calls for the same key attach to one shared lookup and observe the
//!   identical outcome);
//! - resolved-entry count never exceeds capacity (least-recently-resolved
//!   evicted first; pending entries are never evicted);
//! - failures are never cached, so a transient error does not poison a key.

mod entry;

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::FutureExt;
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error_handling::LookupError;
use crate::geo::{GeoRecord, GeoResolver};

use entry::{CacheEntry, SharedLookup};

/// Bounded key→record geolocation cache.
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Clone)]
pub struct LocationCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    entries: Mutex<HashMap<String, CacheEntry>>,
    resolver: Arc<dyn GeoResolver>,
    ttl: Duration,
    capacity: usize,
    max_concurrency: usize,
    next_lookup_id: AtomicU64,
}

impl LocationCache {
    /// Creates a cache over the given resolver.
    ///
    /// `capacity` bounds the number of resolved entries, `ttl` bounds their
    /// freshness, and `max_concurrency` bounds the fan-out of
    /// [`resolve_many`](Self::resolve_many).
    pub fn new(
        resolver: Arc<dyn GeoResolver>,
        capacity: usize,
        ttl: Duration,
        max_concurrency: usize,
    ) -> Self {
        LocationCache {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(HashMap::new()),
                resolver,
                ttl,
                capacity: capacity.max(1),
                max_concurrency: max_concurrency.max(1),
                next_lookup_id: AtomicU64::new(0),
            }),
        }
    }

    /// Resolves one IP address, serving from cache when possible.
    ///
    /// A cached, unexpired record returns immediately. Otherwise the call
    /// either attaches to an already-outstanding lookup for the same key or
    /// starts one. On success the record is cached with a fresh expiry; on
    /// failure the key is cleared so the next call may retry immediately.
    pub async fn resolve(&self, ip: &str) -> Result<GeoRecord, LookupError> {
        let addr: IpAddr = ip
            .trim()
            .parse()
            .map_err(|_| LookupError::InvalidAddress(ip.to_string()))?;
        let key = addr.to_string();

        let shared = {
            // The check-then-act below (miss -> insert pending marker) must
            // stay under one lock acquisition to keep the
            // at-most-one-in-flight-per-key invariant.
            let mut entries = self.inner.entries.lock().await;
            let attached = match entries.get(&key) {
                Some(CacheEntry::Resolved { record, resolved_at })
                    if resolved_at.elapsed() < self.inner.ttl =>
                {
                    log::debug!("Cache hit for {}", key);
                    return Ok(record.clone());
                }
                Some(CacheEntry::Pending { shared, .. }) => {
                    log::debug!("Attaching to in-flight lookup for {}", key);
                    Some(shared.clone())
                }
                // Absent or expired: re-resolve.
                _ => None,
            };
            match attached {
                Some(shared) => shared,
                None => {
                    let lookup_id = self.inner.next_lookup_id.fetch_add(1, Ordering::Relaxed);
                    let shared: SharedLookup =
                        Self::perform_lookup(self.inner.clone(), addr, key.clone(), lookup_id)
                            .boxed()
                            .shared();
                    entries.insert(
                        key.clone(),
                        CacheEntry::Pending {
                            shared: shared.clone(),
                            lookup_id,
                        },
                    );
                    // A detached task drives the lookup to completion even if
                    // every caller is cancelled, so the pending marker always
                    // self-replaces.
                    tokio::spawn(shared.clone());
                    shared
                }
            }
        };

        shared.await
    }

    /// Resolves a batch of IPs concurrently, bounded by `max_concurrency`.
    ///
    /// The input is deduplicated first. Returns once every lookup has
    /// settled; a slow or failing address never suppresses another's result.
    /// Results are keyed by the caller's original strings, so invalid inputs
    /// report their `InvalidAddress` under the string that was passed in.
    pub async fn resolve_many(
        &self,
        ips: &[String],
    ) -> HashMap<String, Result<GeoRecord, LookupError>> {
        let distinct: HashSet<String> = ips.iter().cloned().collect();
        stream::iter(distinct)
            .map(|ip| async move {
                let result = self.resolve(&ip).await;
                (ip, result)
            })
            .buffer_unordered(self.inner.max_concurrency)
            .collect::<HashMap<_, _>>()
            .await
    }

    /// Number of resolved entries currently cached (pending excluded).
    pub async fn resolved_len(&self) -> usize {
        let entries = self.inner.entries.lock().await;
        entries
            .values()
            .filter(|e| matches!(e, CacheEntry::Resolved { .. }))
            .count()
    }

    /// Drops every cached entry. A lookup in flight across the clear still
    /// completes and returns to its waiters, but its result is discarded
    /// rather than written back.
    pub async fn clear(&self) {
        self.inner.entries.lock().await.clear();
    }

    /// Runs the resolver call for `key` and writes the outcome back.
    ///
    /// This future is shared by every caller attached to the key; the
    /// write-back happens exactly once, when the shared future first
    /// completes. The write-back only applies while this lookup's own
    /// pending marker is still in place; if the entry was cleared or
    /// replaced mid-flight, the result is returned to waiters but not
    /// cached.
    async fn perform_lookup(
        inner: Arc<CacheInner>,
        addr: IpAddr,
        key: String,
        lookup_id: u64,
    ) -> Result<GeoRecord, LookupError> {
        let result = inner.resolver.lookup(addr).await;

        let mut entries = inner.entries.lock().await;
        let still_ours = matches!(
            entries.get(&key),
            Some(CacheEntry::Pending { lookup_id: id, .. }) if *id == lookup_id
        );
        if !still_ours {
            log::debug!("Lookup for {} was superseded, discarding write-back", key);
            return result;
        }
        match &result {
            Ok(record) => {
                Self::evict_for_insert(&mut entries, inner.capacity);
                entries.insert(
                    key,
                    CacheEntry::Resolved {
                        record: record.clone(),
                        resolved_at: Instant::now(),
                    },
                );
            }
            Err(e) => {
                log::debug!("Lookup for {} failed ({}), not caching", key, e);
                entries.remove(&key);
            }
        }
        result
    }

    /// Evicts least-recently-resolved entries until a new resolved entry
    /// fits within capacity. Pending entries are exempt.
    fn evict_for_insert(entries: &mut HashMap<String, CacheEntry>, capacity: usize) {
        loop {
            let resolved = entries
                .iter()
                .filter_map(|(k, e)| match e {
                    CacheEntry::Resolved { resolved_at, .. } => Some((k.clone(), *resolved_at)),
                    CacheEntry::Pending { .. } => None,
                })
                .collect::<Vec<_>>();
            if resolved.len() < capacity {
                return;
            }
            if let Some((oldest, _)) = resolved.into_iter().min_by_key(|(_, at)| *at) {
                log::debug!("Evicting least-recently-resolved entry {}", oldest);
                entries.remove(&oldest);
            } else {
                return;
            }
        }
    }
}
