//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates the domain row mapping with the report source port and
//! the metric store.
//!
//! Use cases:
//! - `Scraper`: maps both Locust reports onto the metric store
//! - `Exporter`: serializes scrape + publish behind one lock

pub mod exporter;
pub mod scraper;

pub use exporter::{Exporter, Snapshot};
pub use scraper::Scraper;
