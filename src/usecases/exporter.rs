//! Exporter - Serialized Scrape and Publish
//!
//! Wraps the scraper and its metric store behind one mutex. A collection
//! holds the lock for the whole sequence: bump the scrape counter, read
//! both reports, set `locust_up`, encode. Concurrent collections queue up
//! behind each other; nothing else in the process takes this lock.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, instrument};

use crate::adapters::metrics::MetricStore;
use crate::domain::HealthStatus;
use crate::error::ScrapeError;
use crate::ports::report_source::ReportSource;
use crate::usecases::scraper::Scraper;

/// Result of one collection.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Health published as `locust_up`.
    pub health: HealthStatus,
    /// Text exposition of the whole store.
    pub body: String,
}

/// The single collection entry point used by the HTTP server.
pub struct Exporter<S: ReportSource> {
    scraper: Scraper<S>,
    store: MetricStore,
    /// Held for a full scrape + encode.
    lock: Mutex<()>,
}

impl<S: ReportSource> Exporter<S> {
    /// Create an exporter over a report source and a fresh store.
    pub fn new(source: Arc<S>, store: MetricStore) -> Self {
        Self {
            scraper: Scraper::new(source),
            store,
            lock: Mutex::new(()),
        }
    }

    /// Metric store, for read access outside a collection.
    pub const fn store(&self) -> &MetricStore {
        &self.store
    }

    /// Scrape both reports and render the resulting snapshot.
    ///
    /// Blocks on file I/O; call from a blocking context.
    ///
    /// # Errors
    /// Fatal report errors from the scraper, or an encoding failure.
    /// `locust_up` is left untouched when the scrape itself fails.
    #[instrument(skip_all)]
    pub fn collect(&self) -> Result<Snapshot, ScrapeError> {
        // the mutex guards no data, so poisoning is ignored
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let health = self.scraper.scrape(&self.store)?;
        self.store.up.set(health.as_gauge());

        let body = self.store.encode()?;
        debug!(%health, bytes = body.len(), "Collection rendered");

        Ok(Snapshot { health, body })
    }
}
