//! Scraper - Locust Reports to Prometheus Gauges
//!
//! One scrape reads the stats report, then the failures report, and
//! writes every data row into the metric store:
//! - stats rows set the eleven `locust_requests_*` gauges for (method, name)
//! - failure rows set `locust_errors` for (method, name, error)
//!
//! A report that cannot be opened makes the scrape unhealthy and ends it
//! without touching any further metrics. A report that opens but holds a
//! row too short to map is a [`ScrapeError`]. Nothing is cleared between
//! scrapes: a later row for the same labels overwrites, series that stop
//! appearing keep their last value.

use std::borrow::Cow;
use std::io::Read;
use std::sync::Arc;

use tracing::{debug, error, instrument};

use crate::adapters::metrics::MetricStore;
use crate::domain::{FailureRecord, HealthStatus, Row, ShortRow, StatRecord};
use crate::error::ScrapeError;
use crate::ports::report_source::{ReportKind, ReportSource};

/// Maps the two Locust reports onto a [`MetricStore`].
pub struct Scraper<S: ReportSource> {
    /// Report source port.
    source: Arc<S>,
}

impl<S: ReportSource> Scraper<S> {
    /// Create a new scraper.
    pub const fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Run one scrape against `store`.
    ///
    /// Increments `locust_total_scrapes` first, whatever happens next.
    /// Does not set `locust_up`; the caller publishes the returned health.
    ///
    /// # Errors
    /// Returns [`ScrapeError`] when an opened report cannot be mapped.
    /// Rows published before the bad row stay published.
    #[instrument(skip_all)]
    pub fn scrape(&self, store: &MetricStore) -> Result<HealthStatus, ScrapeError> {
        store.total_scrapes.inc();

        let Some(stats) = self.open(ReportKind::Stats) else {
            return Ok(HealthStatus::Unhealthy);
        };
        let stat_rows = publish_stats(stats, store)?;

        let Some(failures) = self.open(ReportKind::Failures) else {
            return Ok(HealthStatus::Unhealthy);
        };
        let failure_rows = publish_failures(failures, store)?;

        debug!(stat_rows, failure_rows, "Scrape complete");
        Ok(HealthStatus::Healthy)
    }

    fn open(&self, kind: ReportKind) -> Option<Box<dyn Read + Send>> {
        match self.source.open(kind) {
            Ok(reader) => Some(reader),
            Err(e) => {
                error!(report = %kind, error = %e, "Couldn't open the csv file");
                None
            }
        }
    }
}

/// Publish every stats data row, returning how many were written.
fn publish_stats(reader: impl Read, store: &MetricStore) -> Result<usize, ScrapeError> {
    let mut published = 0;

    for_each_row(reader, ReportKind::Stats, |fields| {
        let Row::Record(rec) = StatRecord::from_row(fields)? else {
            return Ok(());
        };
        let labels = [rec.method.as_str(), rec.name.as_str()];

        store.num_requests.with_label_values(&labels).set(rec.num_requests);
        store.num_failures.with_label_values(&labels).set(rec.num_failures);
        store
            .median_response_time
            .with_label_values(&labels)
            .set(rec.median_response_time);
        store
            .avg_response_time
            .with_label_values(&labels)
            .set(rec.avg_response_time);
        store
            .min_response_time
            .with_label_values(&labels)
            .set(rec.min_response_time);
        store
            .max_response_time
            .with_label_values(&labels)
            .set(rec.max_response_time);
        store
            .avg_content_length
            .with_label_values(&labels)
            .set(rec.avg_content_length);
        store.current_rps.with_label_values(&labels).set(rec.current_rps);
        store
            .current_fail_per_sec
            .with_label_values(&labels)
            .set(rec.current_fail_per_sec);
        store
            .response_time_percentile_50
            .with_label_values(&labels)
            .set(rec.response_time_percentile_50);
        store
            .response_time_percentile_95
            .with_label_values(&labels)
            .set(rec.response_time_percentile_95);

        published += 1;
        Ok(())
    })?;

    Ok(published)
}

/// Publish every failures data row, returning how many were written.
fn publish_failures(reader: impl Read, store: &MetricStore) -> Result<usize, ScrapeError> {
    let mut published = 0;

    for_each_row(reader, ReportKind::Failures, |fields| {
        if let Row::Record(rec) = FailureRecord::from_row(fields)? {
            store
                .errors
                .with_label_values(&[rec.method.as_str(), rec.name.as_str(), rec.error.as_str()])
                .set(rec.occurrences);
            published += 1;
        }
        Ok(())
    })?;

    Ok(published)
}

/// Feed each CSV record of a report to `apply` in file order.
///
/// Records may have any number of fields; the row mapping decides what is
/// too short. Blank lines are skipped by the reader. Cells are decoded
/// lossily, so invalid UTF-8 in a numeric cell reads as zero and in a label
/// cell as U+FFFD.
fn for_each_row<R, F>(reader: R, report: ReportKind, mut apply: F) -> Result<(), ScrapeError>
where
    R: Read,
    F: FnMut(&[&str]) -> Result<(), ShortRow>,
{
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut record = csv::ByteRecord::new();
    loop {
        match csv.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(source) => return Err(ScrapeError::Csv { report, source }),
        }

        let cells: Vec<Cow<'_, str>> = record.iter().map(String::from_utf8_lossy).collect();
        let fields: Vec<&str> = cells.iter().map(|cell| &**cell).collect();
        apply(&fields).map_err(|source| ScrapeError::MalformedRow {
            report,
            line: record.position().map_or(0, csv::Position::line),
            source,
        })?;
    }
}
