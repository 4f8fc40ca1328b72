//! Error type definitions.
//!
//! This module defines all error types used throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for a single geolocation lookup.
///
/// `Clone` is required because a resolved-or-failed outcome fans out to every
/// caller attached to the same in-flight lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The input is not a valid IPv4 or IPv6 address. Fails fast; the
    /// resolver is never contacted.
    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    /// The resolver could not be reached, timed out, or returned an
    /// unusable response. Transient; retryable; never cached.
    #[error("Geolocation resolver unavailable: {0}")]
    ResolverUnavailable(String),

    /// The resolver rejected the request due to rate limiting. Callers
    /// should back off before retrying.
    #[error("Geolocation resolver rate limited")]
    RateLimited,
}

impl LookupError {
    /// Returns the statistics category for this error.
    pub fn kind(&self) -> LookupErrorKind {
        match self {
            LookupError::InvalidAddress(_) => LookupErrorKind::InvalidAddress,
            LookupError::ResolverUnavailable(_) => LookupErrorKind::ResolverUnavailable,
            LookupError::RateLimited => LookupErrorKind::RateLimited,
        }
    }

    /// Whether a caller may reasonably retry this lookup after a delay.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LookupError::ResolverUnavailable(_) | LookupError::RateLimited
        )
    }
}

/// Payload-free lookup error categories, used for statistics counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum LookupErrorKind {
    /// Malformed IP address supplied by the caller.
    InvalidAddress,
    /// Resolver network/backend failure or timeout.
    ResolverUnavailable,
    /// Resolver rate limiting.
    RateLimited,
}

impl LookupErrorKind {
    /// Human-readable label used in statistics output.
    pub fn label(&self) -> &'static str {
        match self {
            LookupErrorKind::InvalidAddress => "invalid address",
            LookupErrorKind::ResolverUnavailable => "resolver unavailable",
            LookupErrorKind::RateLimited => "rate limited",
        }
    }
}
