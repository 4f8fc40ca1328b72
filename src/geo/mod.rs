//! Geolocation records and the resolver boundary.
//!
//! The `GeoResolver` trait is the substitution seam: the production
//! implementation is `HttpGeoResolver`, tests plug in mocks.

mod http;
mod resolver;
mod types;

pub use http::HttpGeoResolver;
pub use resolver::GeoResolver;
pub use types::GeoRecord;
