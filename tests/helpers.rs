// Shared test helpers: a scriptable mock resolver and event builders.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use geowatch::{
    EventCategory, GeoRecord, GeoResolver, LookupError, SecurityEvent, Severity,
};

/// A `GeoResolver` double with per-IP call counting, optional artificial
/// latency, and scriptable outcome sequences.
///
/// Unscripted addresses resolve to [`sample_record`]. Scripted outcomes are
/// consumed front-to-back, after which the address falls back to the default
/// record.
pub struct MockResolver {
    delay: Option<Duration>,
    per_ip_delay: HashMap<String, Duration>,
    scripted: Mutex<HashMap<String, VecDeque<Result<GeoRecord, LookupError>>>>,
    total_calls: AtomicUsize,
    per_ip_calls: Mutex<HashMap<String, usize>>,
}

#[allow(dead_code)] // Used by other test files
impl MockResolver {
    pub fn new() -> Self {
        MockResolver {
            delay: None,
            per_ip_delay: HashMap::new(),
            scripted: Mutex::new(HashMap::new()),
            total_calls: AtomicUsize::new(0),
            per_ip_calls: Mutex::new(HashMap::new()),
        }
    }

    /// Adds artificial latency to every lookup.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Adds artificial latency to lookups for one address only.
    pub fn with_delay_for(mut self, ip: &str, delay: Duration) -> Self {
        self.per_ip_delay.insert(ip.to_string(), delay);
        self
    }

    /// Queues one outcome for an address; outcomes are consumed in order.
    pub fn script(self, ip: &str, outcome: Result<GeoRecord, LookupError>) -> Self {
        self.scripted
            .lock()
            .expect("scripted lock")
            .entry(ip.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Total lookups issued against this resolver.
    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    /// Lookups issued for one address.
    pub fn calls_for(&self, ip: &str) -> usize {
        *self
            .per_ip_calls
            .lock()
            .expect("per-ip lock")
            .get(ip)
            .unwrap_or(&0)
    }
}

#[async_trait]
impl GeoResolver for MockResolver {
    async fn lookup(&self, ip: IpAddr) -> Result<GeoRecord, LookupError> {
        let key = ip.to_string();
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .per_ip_calls
            .lock()
            .expect("per-ip lock")
            .entry(key.clone())
            .or_insert(0) += 1;

        if let Some(delay) = self.per_ip_delay.get(&key).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .scripted
            .lock()
            .expect("scripted lock")
            .get_mut(&key)
            .and_then(|queue| queue.pop_front());
        match scripted {
            Some(outcome) => outcome,
            None => Ok(sample_record(&key)),
        }
    }
}

/// A plausible record for the given address. `8.8.8.8` gets its well-known
/// Google DNS shape; everything else gets a generic one.
#[allow(dead_code)]
pub fn sample_record(ip: &str) -> GeoRecord {
    if ip == "8.8.8.8" {
        GeoRecord {
            ip: ip.to_string(),
            country: Some("United States".to_string()),
            country_code: Some("US".to_string()),
            region: Some("Virginia".to_string()),
            city: Some("Ashburn".to_string()),
            latitude: 39.03,
            longitude: -77.5,
            isp: Some("Google LLC".to_string()),
            organization: Some("Google Public DNS".to_string()),
            asn: Some("AS15169 Google LLC".to_string()),
            timezone: Some("America/New_York".to_string()),
            resolved_at: Utc::now(),
        }
    } else {
        GeoRecord {
            ip: ip.to_string(),
            country: Some("Netherlands".to_string()),
            country_code: Some("NL".to_string()),
            region: Some("North Holland".to_string()),
            city: Some("Amsterdam".to_string()),
            latitude: 52.37,
            longitude: 4.89,
            isp: Some("Example ISP".to_string()),
            organization: None,
            asn: None,
            timezone: Some("Europe/Amsterdam".to_string()),
            resolved_at: Utc::now(),
        }
    }
}

/// Builds a `security_events`-shaped event.
#[allow(dead_code)]
pub fn security_event(id: &str, severity: Severity, source_ip: Option<&str>) -> SecurityEvent {
    SecurityEvent {
        id: id.to_string(),
        event_type: "intrusion_attempt".to_string(),
        severity,
        source_ip: source_ip.map(str::to_string),
        indicators: None,
        detected_at: Utc::now(),
        category: EventCategory::SecurityEvent,
    }
}

/// Builds a `threat_detections`-shaped event with the IP nested under
/// indicators.
#[allow(dead_code)]
pub fn threat_event(id: &str, severity: Severity, source_ip: Option<&str>) -> SecurityEvent {
    SecurityEvent {
        id: id.to_string(),
        event_type: "c2_beacon".to_string(),
        severity,
        source_ip: None,
        indicators: Some(geowatch::Indicators {
            source_ip: source_ip.map(str::to_string),
        }),
        detected_at: Utc::now(),
        category: EventCategory::ThreatDetection,
    }
}
