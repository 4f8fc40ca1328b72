//! Security-event feed types and ingestion.

mod feed;
mod ingest;
mod types;

pub use feed::{EventFeed, SimulatedFeed};
pub use ingest::EventIngestor;
pub use types::{EventCategory, Indicators, SecurityEvent, Severity};
