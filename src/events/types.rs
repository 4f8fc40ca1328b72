//! Security-event wire types.
//!
//! Events arrive from an external backend as JSON rows; the shapes here
//! accept both the `security_events` form (`event_type`, top-level
//! `source_ip`) and the `threat_detections` form (`threat_type`, source IP
//! nested under `indicators`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event severity as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational.
    Low,
    /// Worth a look.
    Medium,
    /// Needs attention.
    High,
    /// Active incident.
    Critical,
}

/// Which backend table an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// A `security_events` row.
    #[default]
    SecurityEvent,
    /// A `threat_detections` row.
    ThreatDetection,
}

/// Indicator block carried by threat-detection rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Indicators {
    /// Source IP of the detected activity.
    #[serde(default)]
    pub source_ip: Option<String>,
}

/// One inbound security event or threat detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Backend row identifier.
    pub id: String,
    /// Event or threat type label (accepts either column name).
    #[serde(alias = "threat_type")]
    pub event_type: String,
    /// Reported severity.
    pub severity: Severity,
    /// Source IP, when carried at the top level.
    #[serde(default)]
    pub source_ip: Option<String>,
    /// Indicator block, when the source IP is nested.
    #[serde(default)]
    pub indicators: Option<Indicators>,
    /// When the backend detected the event.
    pub detected_at: DateTime<Utc>,
    /// Originating table.
    #[serde(default)]
    pub category: EventCategory,
}

impl SecurityEvent {
    /// The event's source IP, wherever the payload carried it.
    ///
    /// Events without one are not an error; they are simply not mappable.
    pub fn source_ip(&self) -> Option<&str> {
        self.source_ip
            .as_deref()
            .or_else(|| self.indicators.as_ref().and_then(|i| i.source_ip.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_security_event_row() {
        let event: SecurityEvent = serde_json::from_str(
            r#"{
                "id": "evt-1",
                "event_type": "intrusion_attempt",
                "severity": "critical",
                "source_ip": "8.8.8.8",
                "detected_at": "2026-08-25T12:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(event.source_ip(), Some("8.8.8.8"));
        assert_eq!(event.severity, Severity::Critical);
        assert_eq!(event.category, EventCategory::SecurityEvent);
    }

    #[test]
    fn parses_threat_detection_row_with_nested_indicator() {
        let event: SecurityEvent = serde_json::from_str(
            r#"{
                "id": "thr-9",
                "threat_type": "c2_beacon",
                "severity": "high",
                "indicators": { "source_ip": "1.2.3.4" },
                "detected_at": "2026-08-25T12:00:00Z",
                "category": "threat_detection"
            }"#,
        )
        .unwrap();
        assert_eq!(event.event_type, "c2_beacon");
        assert_eq!(event.source_ip(), Some("1.2.3.4"));
        assert_eq!(event.category, EventCategory::ThreatDetection);
    }

    #[test]
    fn event_without_source_ip_is_not_mappable() {
        let event: SecurityEvent = serde_json::from_str(
            r#"{
                "id": "evt-2",
                "event_type": "policy_change",
                "severity": "low",
                "detected_at": "2026-08-25T12:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(event.source_ip(), None);
    }
}
