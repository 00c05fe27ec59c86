//! Report Source Port - Access to the Locust CSV Reports
//!
//! The scraper asks for a fresh reader on every scrape. Opening is the
//! only fallible step the port exposes; a failed open is what turns a
//! scrape unhealthy.

use std::fmt;
use std::io::{self, Read};

/// Which of the two Locust reports to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// Aggregate per-endpoint statistics (`*_stats.csv`).
    Stats,
    /// Per-endpoint error occurrences (`*_failures.csv`).
    Failures,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stats => write!(f, "stats"),
            Self::Failures => write!(f, "failures"),
        }
    }
}

/// Trait for providers of Locust report contents.
///
/// Implementations must return a reader positioned at the start of the
/// report. Readers are consumed once and dropped at the end of a scrape.
pub trait ReportSource: Send + Sync + 'static {
    /// Open a report for reading.
    ///
    /// # Errors
    /// Any I/O error that prevents the report from being read at all.
    fn open(&self, kind: ReportKind) -> io::Result<Box<dyn Read + Send>>;
}
