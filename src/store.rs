//! Display-facing tracked-location store.
//!
//! An ordered, size-bounded, deduplicated collection of resolved locations
//! merged from manual lookups, bulk lookups, and ingested events. The
//! rendering layer only ever sees snapshots of this store.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::events::Severity;
use crate::geo::GeoRecord;

/// What a tracked location represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// Network infrastructure.
    Network,
    /// A managed device.
    Device,
    /// A threat-detection hit.
    Threat,
    /// A user-initiated lookup.
    User,
    /// A raw security event.
    SecurityEvent,
}

/// Display status of a tracked location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationStatus {
    /// Normal activity.
    Active,
    /// No recent activity.
    Inactive,
    /// Elevated-severity activity.
    Suspicious,
    /// Critical-severity activity.
    Blocked,
}

/// One display-facing record: a resolved location plus tracking metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedLocation {
    /// Source IP address. The store holds at most one entry per IP.
    pub ip: String,
    /// The resolved geolocation.
    pub location: GeoRecord,
    /// When this entry was tracked (not when the record was resolved).
    pub timestamp: DateTime<Utc>,
    /// What the entry represents.
    pub kind: LocationKind,
    /// Display status.
    pub status: LocationStatus,
    /// Severity of the originating event, if any.
    pub severity: Option<Severity>,
    /// Type of the originating event, if any.
    pub event_type: Option<String>,
    /// Optional display name.
    pub name: Option<String>,
}

/// Ordered, capacity-bounded, per-IP-deduplicated location collection.
///
/// Newest entries sit at the front; overflow drops the tail. Mutations go
/// through [`add`](Self::add) and [`merge`](Self::merge); consumers read
/// [`snapshot`](Self::snapshot).
pub struct TrackedLocationStore {
    entries: Mutex<VecDeque<TrackedLocation>>,
    capacity: usize,
}

impl TrackedLocationStore {
    /// Creates an empty store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        TrackedLocationStore {
            entries: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Tracks one location.
    ///
    /// If an entry with the same IP exists it is replaced and re-inserted at
    /// the front to signal recency (latest wins, timestamp refreshed).
    /// Otherwise the location is prepended. The store is then truncated to
    /// capacity, dropping oldest entries.
    pub async fn add(&self, location: TrackedLocation) {
        let mut entries = self.entries.lock().await;
        Self::insert_front(&mut entries, location);
        entries.truncate(self.capacity);
    }

    /// Batch merge used after bulk or reconciliation lookups.
    ///
    /// Never introduces duplicate IPs; when the same IP appears in both the
    /// batch and the store, the newer timestamp wins.
    pub async fn merge(&self, locations: Vec<TrackedLocation>) {
        let mut entries = self.entries.lock().await;
        for location in locations {
            let stale = entries
                .iter()
                .find(|e| e.ip == location.ip)
                .is_some_and(|existing| existing.timestamp >= location.timestamp);
            if stale {
                continue;
            }
            Self::insert_front(&mut entries, location);
        }
        entries.truncate(self.capacity);
    }

    /// Read-only snapshot, newest first.
    pub async fn snapshot(&self) -> Vec<TrackedLocation> {
        self.entries.lock().await.iter().cloned().collect()
    }

    /// Number of tracked entries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    fn insert_front(entries: &mut VecDeque<TrackedLocation>, location: TrackedLocation) {
        entries.retain(|e| e.ip != location.ip);
        entries.push_front(location);
    }
}

/// Maps event severity to a display status: critical events are blocked,
/// high-severity ones flagged suspicious, the rest shown active.
pub fn status_for_severity(severity: Severity) -> LocationStatus {
    match severity {
        Severity::Critical => LocationStatus::Blocked,
        Severity::High => LocationStatus::Suspicious,
        Severity::Medium | Severity::Low => LocationStatus::Active,
    }
}
