//! Scraper Integration Tests - Real Report Files on Disk
//!
//! Drives `Scraper` and `Exporter` through `CsvFileSource` with reports
//! written to a temp directory, rewriting them between scrapes the way a
//! running Locust master does.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use locust_exporter::adapters::metrics::MetricStore;
use locust_exporter::adapters::source::CsvFileSource;
use locust_exporter::domain::HealthStatus;
use locust_exporter::error::ScrapeError;
use locust_exporter::ports::ReportKind;
use locust_exporter::usecases::{Exporter, Scraper};
use tempfile::TempDir;

const STATS_HEADER: &str = "Type,Name,Request Count,Failure Count,Median Response Time,Average Response Time,Min Response Time,Max Response Time,Average Content Size,Requests/s,Failures/s,50%,66%,75%,80%,90%,95%\n";
const FAILURES_HEADER: &str = "Method,Name,Error,Occurrences\n";

const LOGIN_ROW: &str = "GET,/login,100,2,120,130,50,900,512,10.5,0.2,110,,,,,180\n";
const CART_FAILURE: &str = "POST,/cart,Connection refused,7\n";

struct Reports {
    _dir: TempDir,
    stats: PathBuf,
    failures: PathBuf,
}

impl Reports {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let stats = dir.path().join("run_stats.csv");
        let failures = dir.path().join("run_failures.csv");
        Self {
            _dir: dir,
            stats,
            failures,
        }
    }

    fn write_stats(&self, rows: &str) {
        fs::write(&self.stats, format!("{STATS_HEADER}{rows}")).unwrap();
    }

    fn write_failures(&self, rows: &str) {
        fs::write(&self.failures, format!("{FAILURES_HEADER}{rows}")).unwrap();
    }

    fn scraper(&self) -> Scraper<CsvFileSource> {
        Scraper::new(Arc::new(CsvFileSource::new(&self.stats, &self.failures)))
    }
}

fn stat(store: &MetricStore, metric: &str, method: &str, name: &str) -> Option<f64> {
    store.value(
        &format!("locust_requests_{metric}"),
        &[("method", method), ("name", name)],
    )
}

fn error_count(store: &MetricStore, method: &str, name: &str, error: &str) -> Option<f64> {
    store.value(
        "locust_errors",
        &[("method", method), ("name", name), ("error", error)],
    )
}

#[test]
fn test_healthy_scrape_maps_every_column() {
    let reports = Reports::new();
    reports.write_stats(LOGIN_ROW);
    reports.write_failures(CART_FAILURE);

    let store = MetricStore::new().unwrap();
    let health = reports.scraper().scrape(&store).unwrap();
    assert_eq!(health, HealthStatus::Healthy);

    let expected = [
        ("num_requests", 100.0),
        ("num_failures", 2.0),
        ("median_response_time", 120.0),
        ("avg_response_time", 130.0),
        ("min_response_time", 50.0),
        ("max_response_time", 900.0),
        ("avg_content_length", 512.0),
        ("current_rps", 10.5),
        ("current_fail_per_sec", 0.2),
        ("current_response_time_percentile_50", 110.0),
        ("current_response_time_percentile_95", 180.0),
    ];
    for (metric, value) in expected {
        assert_eq!(
            stat(&store, metric, "GET", "/login"),
            Some(value),
            "{metric}"
        );
    }

    assert_eq!(
        error_count(&store, "POST", "/cart", "Connection refused"),
        Some(7.0)
    );
}

#[test]
fn test_header_and_placeholder_rows_publish_nothing() {
    let reports = Reports::new();
    reports.write_stats("None,Aggregated,0,0,0,0,0,0,0,0,0,0,,,,,0\n");
    reports.write_failures("");

    let store = MetricStore::new().unwrap();
    assert_eq!(
        reports.scraper().scrape(&store).unwrap(),
        HealthStatus::Healthy
    );

    for family in [
        "locust_requests_num_requests",
        "locust_requests_current_rps",
        "locust_errors",
    ] {
        assert_eq!(store.series_count(family), 0, "{family}");
    }
}

#[test]
fn test_non_numeric_cell_zeroes_only_that_field() {
    let reports = Reports::new();
    reports.write_stats("GET,/search,12,N/A,40,45,5,80,64,1.5,0,40,,,,,70\n");
    reports.write_failures("GET,/search,timeout,lots\n");

    let store = MetricStore::new().unwrap();
    reports.scraper().scrape(&store).unwrap();

    assert_eq!(stat(&store, "num_failures", "GET", "/search"), Some(0.0));
    assert_eq!(stat(&store, "num_requests", "GET", "/search"), Some(12.0));
    assert_eq!(stat(&store, "avg_response_time", "GET", "/search"), Some(45.0));
    assert_eq!(error_count(&store, "GET", "/search", "timeout"), Some(0.0));
}

#[test]
fn test_invalid_utf8_cell_zeroes_only_that_field() {
    let reports = Reports::new();
    let mut stats = STATS_HEADER.as_bytes().to_vec();
    stats.extend_from_slice(b"GET,/login,100,\xff\xfe,120,130,50,900,512,10.5,0.2,110,,,,,180\n");
    fs::write(&reports.stats, stats).unwrap();
    reports.write_failures(CART_FAILURE);

    let store = MetricStore::new().unwrap();
    let health = reports.scraper().scrape(&store).unwrap();

    assert_eq!(health, HealthStatus::Healthy);
    assert_eq!(stat(&store, "num_failures", "GET", "/login"), Some(0.0));
    assert_eq!(stat(&store, "num_requests", "GET", "/login"), Some(100.0));
    assert_eq!(stat(&store, "max_response_time", "GET", "/login"), Some(900.0));
    assert_eq!(
        error_count(&store, "POST", "/cart", "Connection refused"),
        Some(7.0)
    );
}

#[test]
fn test_directory_in_place_of_report_is_unhealthy() {
    let reports = Reports::new();
    fs::create_dir(&reports.stats).unwrap();
    reports.write_failures(CART_FAILURE);

    let store = MetricStore::new().unwrap();
    let health = reports.scraper().scrape(&store).unwrap();

    assert_eq!(health, HealthStatus::Unhealthy);
    assert_eq!(store.series_count("locust_errors"), 0);
    assert_eq!(store.value("locust_total_scrapes", &[]), Some(1.0));
}

#[test]
fn test_duplicate_identity_later_row_wins() {
    let reports = Reports::new();
    reports.write_stats(
        "GET,/login,100,2,120,130,50,900,512,10.5,0.2,110,,,,,180\n\
         GET,/login,250,3,121,131,51,901,513,11.5,0.3,111,,,,,181\n",
    );
    reports.write_failures("");

    let store = MetricStore::new().unwrap();
    reports.scraper().scrape(&store).unwrap();

    assert_eq!(stat(&store, "num_requests", "GET", "/login"), Some(250.0));
    assert_eq!(stat(&store, "current_rps", "GET", "/login"), Some(11.5));
    assert_eq!(store.series_count("locust_requests_num_requests"), 1);
}

#[test]
fn test_short_row_is_malformed_error() {
    let reports = Reports::new();
    reports.write_stats(&format!("{LOGIN_ROW}GET,/broken,1,2,3\n"));
    reports.write_failures(CART_FAILURE);

    let store = MetricStore::new().unwrap();
    let err = reports.scraper().scrape(&store).unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(
        err,
        ScrapeError::MalformedRow {
            report: ReportKind::Stats,
            line: 3,
            ..
        }
    ));
    // failures were never reached
    assert_eq!(store.series_count("locust_errors"), 0);
}

#[test]
fn test_short_failure_row_is_malformed_error() {
    let reports = Reports::new();
    reports.write_stats(LOGIN_ROW);
    reports.write_failures("POST,/cart,Connection refused\n");

    let store = MetricStore::new().unwrap();
    let err = reports.scraper().scrape(&store).unwrap_err();
    assert_eq!(err.report(), Some(ReportKind::Failures));
}

#[test]
fn test_missing_stats_file_leaves_everything_untouched() {
    let reports = Reports::new();
    reports.write_stats(LOGIN_ROW);
    reports.write_failures(CART_FAILURE);

    let store = MetricStore::new().unwrap();
    let scraper = reports.scraper();
    scraper.scrape(&store).unwrap();

    // new values on disk, but the stats file is gone
    reports.write_failures("POST,/cart,Connection refused,99\n");
    fs::remove_file(&reports.stats).unwrap();

    let health = scraper.scrape(&store).unwrap();
    assert_eq!(health, HealthStatus::Unhealthy);
    assert_eq!(stat(&store, "num_requests", "GET", "/login"), Some(100.0));
    assert_eq!(
        error_count(&store, "POST", "/cart", "Connection refused"),
        Some(7.0)
    );
    assert_eq!(store.value("locust_total_scrapes", &[]), Some(2.0));
}

#[test]
fn test_missing_failures_file_keeps_new_stats() {
    let reports = Reports::new();
    reports.write_stats(LOGIN_ROW);
    reports.write_failures(CART_FAILURE);

    let store = MetricStore::new().unwrap();
    let scraper = reports.scraper();
    scraper.scrape(&store).unwrap();

    reports.write_stats("GET,/login,300,2,120,130,50,900,512,10.5,0.2,110,,,,,180\n");
    fs::remove_file(&reports.failures).unwrap();

    let health = scraper.scrape(&store).unwrap();
    assert_eq!(health, HealthStatus::Unhealthy);
    assert_eq!(stat(&store, "num_requests", "GET", "/login"), Some(300.0));
    assert_eq!(
        error_count(&store, "POST", "/cart", "Connection refused"),
        Some(7.0)
    );
}

#[test]
fn test_stale_series_keep_last_value() {
    let reports = Reports::new();
    reports.write_stats(&format!(
        "{LOGIN_ROW}GET,/logout,5,0,10,10,10,10,0,0.1,0,10,,,,,10\n"
    ));
    reports.write_failures(CART_FAILURE);

    let store = MetricStore::new().unwrap();
    let scraper = reports.scraper();
    scraper.scrape(&store).unwrap();

    // /logout and the cart error disappear from the next reports
    reports.write_stats("GET,/login,101,2,120,130,50,900,512,10.5,0.2,110,,,,,180\n");
    reports.write_failures("");
    scraper.scrape(&store).unwrap();

    assert_eq!(stat(&store, "num_requests", "GET", "/login"), Some(101.0));
    // stale: still published with the previous scrape's value
    assert_eq!(stat(&store, "num_requests", "GET", "/logout"), Some(5.0));
    assert_eq!(
        error_count(&store, "POST", "/cart", "Connection refused"),
        Some(7.0)
    );
}

#[test]
fn test_exporter_publishes_health_and_counts() {
    let reports = Reports::new();
    reports.write_stats(LOGIN_ROW);
    reports.write_failures(CART_FAILURE);

    let source = Arc::new(CsvFileSource::new(&reports.stats, &reports.failures));
    let exporter = Exporter::new(source, MetricStore::new().unwrap());

    let snapshot = exporter.collect().unwrap();
    assert_eq!(snapshot.health, HealthStatus::Healthy);
    assert!(snapshot.body.contains("locust_up 1"));
    assert!(snapshot.body.contains("locust_total_scrapes 1"));
    assert!(
        snapshot
            .body
            .contains(r#"locust_requests_num_requests{method="GET",name="/login"} 100"#)
    );

    fs::remove_file(&reports.failures).unwrap();
    let snapshot = exporter.collect().unwrap();
    assert_eq!(snapshot.health, HealthStatus::Unhealthy);
    assert!(snapshot.body.contains("locust_up 0"));
    assert!(snapshot.body.contains("locust_total_scrapes 2"));
}

#[test]
fn test_exporter_failed_scrape_leaves_up_unchanged() {
    let reports = Reports::new();
    reports.write_stats(LOGIN_ROW);
    reports.write_failures(CART_FAILURE);

    let source = Arc::new(CsvFileSource::new(&reports.stats, &reports.failures));
    let exporter = Exporter::new(source, MetricStore::new().unwrap());
    exporter.collect().unwrap();

    reports.write_stats("GET,/login,1\n");
    assert!(exporter.collect().is_err());
    assert_eq!(exporter.store().value("locust_up", &[]), Some(1.0));
    assert_eq!(exporter.store().value("locust_total_scrapes", &[]), Some(2.0));
}
