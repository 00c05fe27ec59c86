//! Metrics and Monitoring Adapters
//!
//! Holds the Prometheus metric store and the axum server that exposes it
//! together with the landing page and the liveness probe.

pub mod server;
pub mod store;

pub use server::{FatalAction, MetricsServer};
pub use store::MetricStore;
