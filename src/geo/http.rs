//! HTTP-backed geolocation resolver.
//!
//! Talks to an ip-api.com style endpoint: `GET {base}/{ip}` returning a flat
//! JSON object. Any service speaking that shape is substitutable via
//! `--geo-endpoint`.

use std::net::IpAddr;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error_handling::LookupError;
use crate::geo::resolver::GeoResolver;
use crate::geo::types::GeoRecord;

/// Geolocation resolver backed by an ip-api style HTTP JSON endpoint.
pub struct HttpGeoResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGeoResolver {
    /// Creates a resolver against the given base URL.
    ///
    /// The client should carry a request timeout; expiry surfaces as
    /// `ResolverUnavailable`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        HttpGeoResolver {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl GeoResolver for HttpGeoResolver {
    async fn lookup(&self, ip: IpAddr) -> Result<GeoRecord, LookupError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), ip);
        log::debug!("Resolver request: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(classify_request_error)?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(LookupError::ResolverUnavailable(format!(
                "HTTP {} from resolver",
                response.status()
            )));
        }

        let payload: GeoApiResponse = response.json().await.map_err(|e| {
            LookupError::ResolverUnavailable(format!("Malformed resolver response: {}", e))
        })?;

        payload.into_record(ip)
    }
}

fn classify_request_error(e: reqwest::Error) -> LookupError {
    if e.is_timeout() {
        LookupError::ResolverUnavailable("Request timed out".to_string())
    } else {
        LookupError::ResolverUnavailable(e.to_string())
    }
}

/// Wire format of an ip-api.com style response.
#[derive(Debug, Deserialize)]
struct GeoApiResponse {
    status: String,
    message: Option<String>,
    country: Option<String>,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
    #[serde(rename = "regionName")]
    region: Option<String>,
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    isp: Option<String>,
    org: Option<String>,
    #[serde(rename = "as")]
    asn: Option<String>,
    timezone: Option<String>,
}

impl GeoApiResponse {
    fn into_record(self, ip: IpAddr) -> Result<GeoRecord, LookupError> {
        if self.status != "success" {
            return Err(LookupError::ResolverUnavailable(
                self.message
                    .unwrap_or_else(|| "Resolver reported failure".to_string()),
            ));
        }

        // A record without coordinates is useless to every consumer
        // (map plotting, distance annotations), so treat it as a failure.
        let (latitude, longitude) = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(LookupError::ResolverUnavailable(
                    "Resolver response missing coordinates".to_string(),
                ))
            }
        };

        Ok(GeoRecord {
            ip: ip.to_string(),
            country: self.country,
            country_code: self.country_code,
            region: self.region,
            city: self.city,
            latitude,
            longitude,
            isp: self.isp,
            organization: self.org,
            asn: self.asn,
            timezone: self.timezone,
            resolved_at: Utc::now(),
        })
    }
}
