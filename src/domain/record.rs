//! Locust report rows.
//!
//! Two CSV reports are consumed:
//! - `*_stats.csv`: one aggregate row per (method, name)
//! - `*_failures.csv`: one row per (method, name, error)
//!
//! Column positions are fixed by the Locust CSV writer. Header and
//! placeholder rows are recognised by their first field and skipped.
//! Cells that do not parse as numbers become `0.0`; rows that are too
//! short to map are rejected with [`ShortRow`].

use thiserror::Error;

/// First field of the stats header row.
pub const STATS_HEADER_SENTINEL: &str = "Type";
/// First field of the stats row Locust writes when no requests were made.
pub const STATS_EMPTY_SENTINEL: &str = "None";
/// First field of the failures header row.
pub const FAILURES_HEADER_SENTINEL: &str = "Method";

/// Highest stats column read is 16 (95th percentile).
pub const STATS_MIN_FIELDS: usize = 17;
/// method, name, error, occurrences.
pub const FAILURES_MIN_FIELDS: usize = 4;

/// A row with fewer fields than its column mapping needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("row has {found} fields, expected at least {expected}")]
pub struct ShortRow {
    pub expected: usize,
    pub found: usize,
}

/// Result of classifying a single CSV row.
#[derive(Debug, Clone, PartialEq)]
pub enum Row<T> {
    /// Header or placeholder row; publishes nothing.
    Sentinel,
    Record(T),
}

/// Parse a numeric cell, coercing anything unparseable to `0.0`.
pub fn parse_f64(cell: &str) -> f64 {
    cell.parse().unwrap_or(0.0)
}

/// One aggregate row of the stats report.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRecord {
    pub method: String,
    pub name: String,
    pub num_requests: f64,
    pub num_failures: f64,
    /// Milliseconds.
    pub median_response_time: f64,
    pub avg_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    /// Bytes.
    pub avg_content_length: f64,
    pub current_rps: f64,
    pub current_fail_per_sec: f64,
    pub response_time_percentile_50: f64,
    pub response_time_percentile_95: f64,
}

impl StatRecord {
    /// Classify and map one stats row.
    ///
    /// The sentinel check only looks at field 0, so a bare `None` row is
    /// skipped even though it is shorter than a data row.
    ///
    /// # Errors
    /// Returns [`ShortRow`] when a non-sentinel row has fewer than
    /// [`STATS_MIN_FIELDS`] fields.
    pub fn from_row(fields: &[&str]) -> Result<Row<Self>, ShortRow> {
        if let Some(&first) = fields.first() {
            if first == STATS_HEADER_SENTINEL || first == STATS_EMPTY_SENTINEL {
                return Ok(Row::Sentinel);
            }
        }

        if fields.len() < STATS_MIN_FIELDS {
            return Err(ShortRow {
                expected: STATS_MIN_FIELDS,
                found: fields.len(),
            });
        }

        Ok(Row::Record(Self {
            method: fields[0].to_string(),
            name: fields[1].to_string(),
            num_requests: parse_f64(fields[2]),
            num_failures: parse_f64(fields[3]),
            median_response_time: parse_f64(fields[4]),
            avg_response_time: parse_f64(fields[5]),
            min_response_time: parse_f64(fields[6]),
            max_response_time: parse_f64(fields[7]),
            avg_content_length: parse_f64(fields[8]),
            current_rps: parse_f64(fields[9]),
            current_fail_per_sec: parse_f64(fields[10]),
            response_time_percentile_50: parse_f64(fields[11]),
            // 12..=15 are the 66/75/80/90 percentiles, not exported
            response_time_percentile_95: parse_f64(fields[16]),
        }))
    }
}

/// One row of the failures report.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub method: String,
    pub name: String,
    pub error: String,
    pub occurrences: f64,
}

impl FailureRecord {
    /// Classify and map one failures row.
    ///
    /// # Errors
    /// Returns [`ShortRow`] when a non-header row has fewer than
    /// [`FAILURES_MIN_FIELDS`] fields.
    pub fn from_row(fields: &[&str]) -> Result<Row<Self>, ShortRow> {
        if fields.first() == Some(&FAILURES_HEADER_SENTINEL) {
            return Ok(Row::Sentinel);
        }

        if fields.len() < FAILURES_MIN_FIELDS {
            return Err(ShortRow {
                expected: FAILURES_MIN_FIELDS,
                found: fields.len(),
            });
        }

        Ok(Row::Record(Self {
            method: fields[0].to_string(),
            name: fields[1].to_string(),
            error: fields[2].to_string(),
            occurrences: parse_f64(fields[3]),
        }))
    }
}
