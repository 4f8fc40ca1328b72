//! Security-event ingestion.
//!
//! The ingestor subscribes to the event feed, enriches each event's source
//! IP through the location cache, and pushes the result into the tracked
//! location store. Enrichment is best-effort: a failed or impossible lookup
//! drops the map entry, never the underlying event.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::cache::LocationCache;
use crate::events::feed::EventFeed;
use crate::events::types::{EventCategory, SecurityEvent};
use crate::store::{status_for_severity, LocationKind, TrackedLocation, TrackedLocationStore};

/// Subscribes to a security-event feed and keeps the tracked-location store
/// populated.
///
/// Two states: idle (constructed, or after [`stop`](Self::stop)) and
/// listening (after [`start`](Self::start)). While listening, a background
/// task handles push notifications and runs a periodic reconciliation poll
/// that re-fetches recent events, so a missed notification self-heals within
/// one poll interval.
pub struct EventIngestor {
    cache: LocationCache,
    store: Arc<TrackedLocationStore>,
    feed: Arc<dyn EventFeed>,
    poll_interval: Duration,
    poll_depth: usize,
    listener: std::sync::Mutex<Option<CancellationToken>>,
}

impl EventIngestor {
    /// Creates an idle ingestor.
    pub fn new(
        cache: LocationCache,
        store: Arc<TrackedLocationStore>,
        feed: Arc<dyn EventFeed>,
        poll_interval: Duration,
        poll_depth: usize,
    ) -> Self {
        EventIngestor {
            cache,
            store,
            feed,
            poll_interval,
            poll_depth,
            listener: std::sync::Mutex::new(None),
        }
    }

    /// Idle -> listening: subscribes to the feed and spawns the ingest loop.
    ///
    /// The first reconciliation poll runs immediately, backfilling recent
    /// events published before the subscription existed. Calling `start` on
    /// an already-listening ingestor is a logged no-op.
    pub fn start(&self) {
        let mut listener = self
            .listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if listener.is_some() {
            log::warn!("Event ingestor already listening");
            return;
        }
        let token = CancellationToken::new();
        *listener = Some(token.clone());

        let receiver = self.feed.subscribe();
        let cache = self.cache.clone();
        let store = Arc::clone(&self.store);
        let feed = Arc::clone(&self.feed);
        let poll_interval = self.poll_interval;
        let poll_depth = self.poll_depth;

        tokio::spawn(async move {
            run_ingest_loop(cache, store, feed, receiver, poll_interval, poll_depth, token).await;
        });
        log::info!(
            "Event ingestor listening (reconciliation every {:?})",
            self.poll_interval
        );
    }

    /// Listening -> idle: stops accepting notifications.
    ///
    /// In-flight resolutions already requested are allowed to complete and
    /// may still populate the store.
    pub fn stop(&self) {
        let mut listener = self
            .listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(token) = listener.take() {
            token.cancel();
            log::info!("Event ingestor stopped");
        }
    }

    /// Whether the ingestor is currently listening.
    pub fn is_listening(&self) -> bool {
        self.listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }
}

impl Drop for EventIngestor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_ingest_loop(
    cache: LocationCache,
    store: Arc<TrackedLocationStore>,
    feed: Arc<dyn EventFeed>,
    mut receiver: broadcast::Receiver<SecurityEvent>,
    poll_interval: Duration,
    poll_depth: usize,
    token: CancellationToken,
) {
    let mut poll = tokio::time::interval(poll_interval);
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            received = receiver.recv() => match received {
                Ok(event) => spawn_ingest(cache.clone(), Arc::clone(&store), event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    // The next reconciliation poll re-fetches what we missed.
                    log::warn!("Event feed lagged, {} notifications dropped", missed);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    log::info!("Event feed closed, ingestor exiting");
                    break;
                }
            },
            _ = poll.tick() => {
                reconcile(&cache, &store, feed.as_ref(), poll_depth).await;
            }
        }
    }
}

/// Handles one pushed event off the select loop, so a slow resolver never
/// delays subsequent notifications.
fn spawn_ingest(cache: LocationCache, store: Arc<TrackedLocationStore>, event: SecurityEvent) {
    tokio::spawn(async move {
        let Some(ip) = event.source_ip().map(str::to_string) else {
            log::debug!("Event {} carries no source IP, skipping", event.id);
            return;
        };
        match cache.resolve(&ip).await {
            Ok(record) => {
                store.add(tracked_from_event(&event, record, Utc::now())).await;
            }
            Err(e) => {
                // Best-effort enrichment: the event itself is unaffected.
                log::debug!("Dropping map entry for event {} ({}): {}", event.id, ip, e);
            }
        }
    });
}

/// Re-fetches recent events and merges them into the store. Failed lookups
/// are dropped; a later poll may retry them.
async fn reconcile(
    cache: &LocationCache,
    store: &TrackedLocationStore,
    feed: &dyn EventFeed,
    poll_depth: usize,
) {
    let recent = feed.recent_events(poll_depth).await;
    if recent.is_empty() {
        return;
    }

    // Newest first, so the first occurrence per IP wins.
    let mut by_ip: HashMap<String, SecurityEvent> = HashMap::new();
    for event in recent {
        if let Some(ip) = event.source_ip().map(str::to_string) {
            by_ip.entry(ip).or_insert(event);
        }
    }

    let ips: Vec<String> = by_ip.keys().cloned().collect();
    let results = cache.resolve_many(&ips).await;

    let mut batch = Vec::new();
    for (ip, result) in results {
        match result {
            Ok(record) => {
                let event = &by_ip[&ip];
                batch.push(tracked_from_event(event, record, event.detected_at));
            }
            Err(e) => log::debug!("Reconciliation lookup for {} failed: {}", ip, e),
        }
    }
    let merged = batch.len();
    store.merge(batch).await;
    log::debug!("Reconciliation merged {} locations", merged);
}

fn tracked_from_event(
    event: &SecurityEvent,
    record: crate::geo::GeoRecord,
    timestamp: DateTime<Utc>,
) -> TrackedLocation {
    TrackedLocation {
        ip: record.ip.clone(),
        location: record,
        timestamp,
        kind: match event.category {
            EventCategory::SecurityEvent => LocationKind::SecurityEvent,
            EventCategory::ThreatDetection => LocationKind::Threat,
        },
        status: status_for_severity(event.severity),
        severity: Some(event.severity),
        event_type: Some(event.event_type.clone()),
        name: None,
    }
}
