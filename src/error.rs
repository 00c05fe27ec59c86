//! Scrape errors.
//!
//! A missing report is not an error: it only turns the scrape unhealthy.
//! The fatal variants cover reports that open but cannot be mapped or read
//! to the end, which means the Locust CSV layout no longer matches the
//! exporter or the file broke under it.

use thiserror::Error;

use crate::domain::ShortRow;
use crate::ports::ReportKind;

/// Unrecoverable failure while reading a report.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A data row is shorter than the column mapping requires.
    #[error("malformed {report} report at line {line}: {source}")]
    MalformedRow {
        report: ReportKind,
        line: u64,
        #[source]
        source: ShortRow,
    },

    /// Reading an opened report failed part way through.
    #[error("unreadable {report} report: {source}")]
    Csv {
        report: ReportKind,
        #[source]
        source: csv::Error,
    },

    /// The metric snapshot could not be rendered.
    #[error("failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),
}

impl ScrapeError {
    /// Report the error was raised for, if any.
    pub const fn report(&self) -> Option<ReportKind> {
        match self {
            Self::MalformedRow { report, .. } | Self::Csv { report, .. } => Some(*report),
            Self::Encode(_) => None,
        }
    }

    /// Whether the report layout itself is broken.
    ///
    /// The HTTP server terminates the process on these instead of serving
    /// misaligned metrics.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::MalformedRow { .. } | Self::Csv { .. })
    }
}
