//! Ports Layer - Boundaries of the Scrape Use Case
//!
//! Defines the interfaces the scraper needs from the outside world.
//! Adapters implement these traits.
//!
//! Port categories:
//! - `ReportSource`: opens the Locust CSV reports for reading

pub mod report_source;

pub use report_source::{ReportKind, ReportSource};
