//! Error handling and lookup statistics.
//!
//! This module provides:
//! - Typed errors for lookups and initialization
//! - Thread-safe per-kind failure statistics

mod stats;
mod types;

pub use stats::LookupStats;
pub use types::{InitializationError, LookupError, LookupErrorKind};
