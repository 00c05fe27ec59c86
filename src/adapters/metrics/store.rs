//! Prometheus Metric Store - Locust Exporter Gauges
//!
//! Owns a private Prometheus registry with one gauge family per exported
//! Locust statistic, the error family, the health gauge and the scrape
//! counter. The store only stores: which label tuple gets which value is
//! decided by the scraper.
//!
//! Families are registered once at construction and never shrink. Label
//! tuples that disappear from the reports keep their last value.

use prometheus::core::Collector;
use prometheus::proto::{MetricFamily, MetricType};
use prometheus::{Encoder, Gauge, GaugeVec, IntCounter, Opts, Registry, TextEncoder};

/// Metric name prefix shared by every Locust family.
pub const NAMESPACE: &str = "locust";
/// Subsystem of the per-endpoint aggregate families.
const REQUESTS_SUBSYSTEM: &str = "requests";

/// Labels of the aggregate families.
pub const REQUEST_LABELS: [&str; 2] = ["method", "name"];
/// Labels of the error family.
pub const ERROR_LABELS: [&str; 3] = ["method", "name", "error"];

/// Centralized Prometheus metrics for the exporter.
///
/// All names follow `locust_*`; the aggregate families live under
/// `locust_requests_*` and carry `method` and `name` labels.
pub struct MetricStore {
    /// Prometheus registry.
    registry: Registry,
    /// Health of the last scrape (1 = UP, 0 = DOWN).
    pub up: Gauge,
    /// Total scrapes attempted.
    pub total_scrapes: IntCounter,
    pub num_requests: GaugeVec,
    pub num_failures: GaugeVec,
    pub median_response_time: GaugeVec,
    pub avg_response_time: GaugeVec,
    pub min_response_time: GaugeVec,
    pub max_response_time: GaugeVec,
    pub avg_content_length: GaugeVec,
    pub current_rps: GaugeVec,
    pub current_fail_per_sec: GaugeVec,
    pub response_time_percentile_50: GaugeVec,
    pub response_time_percentile_95: GaugeVec,
    /// Error occurrences keyed by method, name and error text.
    pub errors: GaugeVec,
    /// Constant 1, labeled with the exporter build.
    build_info: Gauge,
}

impl MetricStore {
    /// Create and register all exporter metrics.
    ///
    /// # Errors
    /// Fails only if a metric definition is invalid or registered twice.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let up = Gauge::with_opts(
            Opts::new(
                "up",
                "The current health status of the server (1 = UP, 0 = DOWN).",
            )
            .namespace(NAMESPACE),
        )?;

        let total_scrapes = IntCounter::with_opts(
            Opts::new("total_scrapes", "The total number of scrapes.").namespace(NAMESPACE),
        )?;

        let num_requests = request_gauge("num_requests", "Number of requests made.")?;
        let num_failures = request_gauge("num_failures", "Number of failed requests.")?;
        let median_response_time =
            request_gauge("median_response_time", "Median response time in milliseconds.")?;
        let avg_response_time =
            request_gauge("avg_response_time", "Average response time in milliseconds.")?;
        let min_response_time =
            request_gauge("min_response_time", "Minimum response time in milliseconds.")?;
        let max_response_time =
            request_gauge("max_response_time", "Maximum response time in milliseconds.")?;
        let avg_content_length =
            request_gauge("avg_content_length", "Average response size in bytes.")?;
        let current_rps = request_gauge("current_rps", "Current requests per second.")?;
        let current_fail_per_sec =
            request_gauge("current_fail_per_sec", "Current failures per second.")?;
        let response_time_percentile_50 = request_gauge(
            "current_response_time_percentile_50",
            "50th percentile response time in milliseconds.",
        )?;
        let response_time_percentile_95 = request_gauge(
            "current_response_time_percentile_95",
            "95th percentile response time in milliseconds.",
        )?;

        let errors = GaugeVec::new(
            Opts::new("errors", "The current number of errors.").namespace(NAMESPACE),
            &ERROR_LABELS,
        )?;

        let build_info = Gauge::with_opts(
            Opts::new(
                "locustexporter_build_info",
                "A metric with a constant '1' value labeled by version and revision of the exporter.",
            )
            .const_label("version", env!("CARGO_PKG_VERSION"))
            .const_label("revision", option_env!("GIT_REVISION").unwrap_or("unknown")),
        )?;
        build_info.set(1.0);

        let store = Self {
            registry,
            up,
            total_scrapes,
            num_requests,
            num_failures,
            median_response_time,
            avg_response_time,
            min_response_time,
            max_response_time,
            avg_content_length,
            current_rps,
            current_fail_per_sec,
            response_time_percentile_50,
            response_time_percentile_95,
            errors,
            build_info,
        };

        // Register all metrics
        for collector in store.collectors() {
            store.registry.register(collector)?;
        }

        Ok(store)
    }

    fn collectors(&self) -> Vec<Box<dyn Collector>> {
        vec![
            Box::new(self.up.clone()),
            Box::new(self.total_scrapes.clone()),
            Box::new(self.num_requests.clone()),
            Box::new(self.num_failures.clone()),
            Box::new(self.median_response_time.clone()),
            Box::new(self.avg_response_time.clone()),
            Box::new(self.min_response_time.clone()),
            Box::new(self.max_response_time.clone()),
            Box::new(self.avg_content_length.clone()),
            Box::new(self.current_rps.clone()),
            Box::new(self.current_fail_per_sec.clone()),
            Box::new(self.response_time_percentile_50.clone()),
            Box::new(self.response_time_percentile_95.clone()),
            Box::new(self.errors.clone()),
            Box::new(self.build_info.clone()),
        ]
    }

    /// Snapshot of every registered family.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render the current snapshot in the Prometheus text format.
    ///
    /// # Errors
    /// Propagates encoder failures.
    pub fn encode(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Read one gauge or counter value by full metric name and labels.
    ///
    /// Returns `None` when no series with exactly these labels exists.
    /// Reading never creates a series.
    pub fn value(&self, metric: &str, labels: &[(&str, &str)]) -> Option<f64> {
        let family = self.gather().into_iter().find(|f| f.get_name() == metric)?;
        let field_type = family.get_field_type();

        family
            .get_metric()
            .iter()
            .find(|m| {
                let pairs = m.get_label();
                pairs.len() == labels.len()
                    && labels.iter().all(|(name, value)| {
                        pairs
                            .iter()
                            .any(|p| p.get_name() == *name && p.get_value() == *value)
                    })
            })
            .map(|m| match field_type {
                MetricType::COUNTER => m.get_counter().get_value(),
                _ => m.get_gauge().get_value(),
            })
    }

    /// Number of label tuples currently held by a family.
    pub fn series_count(&self, metric: &str) -> usize {
        self.gather()
            .iter()
            .find(|f| f.get_name() == metric)
            .map_or(0, |f| f.get_metric().len())
    }
}

fn request_gauge(name: &str, help: &str) -> prometheus::Result<GaugeVec> {
    GaugeVec::new(
        Opts::new(name, help)
            .namespace(NAMESPACE)
            .subsystem(REQUESTS_SUBSYSTEM),
        &REQUEST_LABELS,
    )
}
