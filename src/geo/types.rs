//! Geolocation data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resolved geolocation for one IP address.
///
/// Immutable once created: a later resolution of the same IP produces a new
/// record rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    /// The IP address this record describes (normalized textual form).
    pub ip: String,
    /// Country name (e.g., "United States").
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2 country code (e.g., "US").
    pub country_code: Option<String>,
    /// Region or state name.
    pub region: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// Latitude in degrees, -90..90.
    pub latitude: f64,
    /// Longitude in degrees, -180..180.
    pub longitude: f64,
    /// Internet service provider.
    pub isp: Option<String>,
    /// Owning organization.
    pub organization: Option<String>,
    /// Autonomous system (e.g., "AS15169 Google LLC").
    pub asn: Option<String>,
    /// IANA timezone name (e.g., "America/New_York").
    pub timezone: Option<String>,
    /// When this record was resolved.
    pub resolved_at: DateTime<Utc>,
}

impl GeoRecord {
    /// Whether latitude and longitude fall within their valid ranges.
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}
