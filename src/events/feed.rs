//! The event-feed boundary and the crate-local simulated feed.
//!
//! The real backend pushes insert notifications and answers point queries;
//! both are abstracted behind `EventFeed`. `SimulatedFeed` is the in-memory
//! stand-in used by the demo mode and by tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::IndexedRandom;
use rand::Rng;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;

use super::types::{EventCategory, Indicators, SecurityEvent, Severity};

/// Broadcast buffer for insert notifications. Lagged subscribers resync via
/// the ingestor's reconciliation poll.
const NOTIFY_CHANNEL_CAPACITY: usize = 256;

/// How much history the simulated feed retains for point queries.
const HISTORY_CAPACITY: usize = 512;

/// A push feed of security events with point-query support.
#[async_trait]
pub trait EventFeed: Send + Sync {
    /// Subscribes to insert notifications. Events published before the call
    /// are not replayed on this channel; the reconciliation poll covers them.
    fn subscribe(&self) -> broadcast::Receiver<SecurityEvent>;

    /// The most recent events, newest first, up to `limit`.
    async fn recent_events(&self, limit: usize) -> Vec<SecurityEvent>;
}

/// In-memory event feed producing randomized but plausibly-shaped events.
///
/// Mirrors the dashboard's simulated backend: published events go out as a
/// push notification and are retained for point queries.
pub struct SimulatedFeed {
    inner: Arc<FeedInner>,
    producer: std::sync::Mutex<Option<CancellationToken>>,
}

struct FeedInner {
    notify: broadcast::Sender<SecurityEvent>,
    history: Mutex<VecDeque<SecurityEvent>>,
}

impl FeedInner {
    async fn publish(&self, event: SecurityEvent) {
        {
            let mut history = self.history.lock().await;
            history.push_front(event.clone());
            history.truncate(HISTORY_CAPACITY);
        }
        // No subscribers is fine; history still serves the poll path.
        let _ = self.notify.send(event);
    }
}

impl SimulatedFeed {
    /// Creates an idle feed. Call [`start`](Self::start) to begin producing
    /// events, or [`publish`](Self::publish) to inject them directly.
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(NOTIFY_CHANNEL_CAPACITY);
        SimulatedFeed {
            inner: Arc::new(FeedInner {
                notify,
                history: Mutex::new(VecDeque::new()),
            }),
            producer: std::sync::Mutex::new(None),
        }
    }

    /// Publishes one event: records it in history and pushes a notification
    /// to current subscribers.
    pub async fn publish(&self, event: SecurityEvent) {
        self.inner.publish(event).await;
    }

    /// Records an event in history without pushing a notification.
    ///
    /// Models a backend insert whose push notification was lost; only the
    /// reconciliation poll will surface it.
    pub async fn publish_unannounced(&self, event: SecurityEvent) {
        let mut history = self.inner.history.lock().await;
        history.push_front(event);
        history.truncate(HISTORY_CAPACITY);
    }

    /// Starts the random event producer on the given interval.
    pub fn start(&self, interval: Duration) {
        let mut producer = self
            .producer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if producer.is_some() {
            log::warn!("Simulated feed producer already running");
            return;
        }
        let token = CancellationToken::new();
        *producer = Some(token.clone());

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let event = random_event();
                        log::debug!(
                            "Simulated {} event from {:?}",
                            event.event_type,
                            event.source_ip()
                        );
                        inner.publish(event).await;
                    }
                }
            }
            log::debug!("Simulated feed producer stopped");
        });
    }

    /// Stops the random event producer. Already-published events remain in
    /// history.
    pub fn stop(&self) {
        let mut producer = self
            .producer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(token) = producer.take() {
            token.cancel();
        }
    }
}

impl Default for SimulatedFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventFeed for SimulatedFeed {
    fn subscribe(&self) -> broadcast::Receiver<SecurityEvent> {
        self.inner.notify.subscribe()
    }

    async fn recent_events(&self, limit: usize) -> Vec<SecurityEvent> {
        let history = self.inner.history.lock().await;
        history.iter().take(limit).cloned().collect()
    }
}

const EVENT_TYPES: &[&str] = &[
    "intrusion_attempt",
    "malware_detected",
    "port_scan",
    "brute_force",
    "data_exfiltration",
    "policy_violation",
];

const THREAT_TYPES: &[&str] = &["c2_beacon", "credential_theft", "lateral_movement"];

const SEVERITIES: &[Severity] = &[
    Severity::Low,
    Severity::Medium,
    Severity::High,
    Severity::Critical,
];

/// Generates one randomized event in either backend row shape. A small
/// fraction carries no source IP, exercising the discard path downstream.
fn random_event() -> SecurityEvent {
    let mut rng = rand::rng();

    let severity = *SEVERITIES.choose(&mut rng).expect("non-empty");
    let source_ip = if rng.random_range(0..10) == 0 {
        None
    } else {
        Some(format!(
            "{}.{}.{}.{}",
            rng.random_range(1..=223u8),
            rng.random_range(0..=255u8),
            rng.random_range(0..=255u8),
            rng.random_range(1..=254u8)
        ))
    };

    if rng.random_range(0..3) == 0 {
        SecurityEvent {
            id: format!("thr-{}", rng.random_range(0..u32::MAX)),
            event_type: THREAT_TYPES.choose(&mut rng).expect("non-empty").to_string(),
            severity,
            source_ip: None,
            indicators: Some(Indicators { source_ip }),
            detected_at: Utc::now(),
            category: EventCategory::ThreatDetection,
        }
    } else {
        SecurityEvent {
            id: format!("evt-{}", rng.random_range(0..u32::MAX)),
            event_type: EVENT_TYPES.choose(&mut rng).expect("non-empty").to_string(),
            severity,
            source_ip,
            indicators: None,
            detected_at: Utc::now(),
            category: EventCategory::SecurityEvent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_subscribers_and_history() {
        let feed = SimulatedFeed::new();
        let mut rx = feed.subscribe();

        feed.publish(random_event()).await;

        let received = rx.recv().await.expect("notification");
        let recent = feed.recent_events(10).await;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, received.id);
    }

    #[tokio::test]
    async fn recent_events_is_newest_first_and_bounded() {
        let feed = SimulatedFeed::new();
        for _ in 0..5 {
            feed.publish(random_event()).await;
        }
        let newest = feed.recent_events(10).await[0].clone();
        feed.publish(random_event()).await;

        let recent = feed.recent_events(3).await;
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[1].id, newest.id);
    }

    #[test]
    fn random_events_are_well_formed() {
        for _ in 0..100 {
            let event = random_event();
            assert!(!event.id.is_empty());
            assert!(!event.event_type.is_empty());
            if let Some(ip) = event.source_ip() {
                assert!(ip.parse::<std::net::IpAddr>().is_ok(), "bad IP {}", ip);
            }
        }
    }
}
