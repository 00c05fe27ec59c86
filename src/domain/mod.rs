//! Domain layer - Locust report rows and scrape health.
//!
//! Pure parsing rules for the two Locust CSV reports. No I/O and no
//! metrics registry here; the scraper use case feeds raw CSV fields in
//! and publishes the typed records it gets back.

pub mod health;
pub mod record;

pub use health::HealthStatus;
pub use record::{FailureRecord, Row, ShortRow, StatRecord, parse_f64};
