//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::error_handling::InitializationError;

/// Initializes the HTTP client used by the geolocation resolver.
///
/// The request timeout bounds every resolver call; expiry surfaces to
/// callers as `LookupError::ResolverUnavailable`.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_http_client(timeout: Duration) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(timeout)
        .user_agent(concat!("geowatch/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
