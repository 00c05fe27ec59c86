//! Metrics HTTP Server - Landing Page, Telemetry and Liveness
//!
//! Exposes the exporter via axum 0.7:
//! - `/`                 : HTML landing page linking to the telemetry path
//! - `<telemetry path>`  : one collection per request, Prometheus text format
//! - `/live`             : liveness probe, never waits on a scrape
//!
//! A report whose layout no longer matches is fatal: the server logs the
//! error and exits the process rather than serve misaligned metrics.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::sync::broadcast;
use tracing::{error, info, instrument, warn};

use crate::ports::report_source::ReportSource;
use crate::usecases::exporter::Exporter;

/// What the telemetry handler does with a fatal scrape error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalAction {
    /// Log and terminate the process with status 1.
    Exit,
    /// Log and answer 500, keeping the process alive.
    Respond,
}

/// Shared state of the route handlers.
struct ServerState<S: ReportSource> {
    exporter: Arc<Exporter<S>>,
    telemetry_path: Arc<str>,
    on_fatal: FatalAction,
}

// derive(Clone) would require S: Clone
impl<S: ReportSource> Clone for ServerState<S> {
    fn clone(&self) -> Self {
        Self {
            exporter: Arc::clone(&self.exporter),
            telemetry_path: Arc::clone(&self.telemetry_path),
            on_fatal: self.on_fatal,
        }
    }
}

/// Axum-based exporter HTTP server.
pub struct MetricsServer<S: ReportSource> {
    state: ServerState<S>,
}

impl<S: ReportSource> MetricsServer<S> {
    /// Create a new server over an exporter.
    pub fn new(exporter: Arc<Exporter<S>>, telemetry_path: &str, on_fatal: FatalAction) -> Self {
        Self {
            state: ServerState {
                exporter,
                telemetry_path: Arc::from(telemetry_path),
                on_fatal,
            },
        }
    }

    /// Build the router for all exporter endpoints.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(landing::<S>))
            .route(&self.state.telemetry_path, get(telemetry::<S>))
            .route("/live", get(liveness))
            .with_state(self.state.clone())
    }

    /// Serve until the shutdown signal fires.
    ///
    /// # Errors
    /// Fails if the address cannot be bound or the server stops abnormally.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(
        self,
        listen_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(&listen_address).await?;
        info!(
            address = %listen_address,
            telemetry_path = %self.state.telemetry_path,
            "Listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

async fn landing<S: ReportSource>(State(state): State<ServerState<S>>) -> Html<String> {
    Html(format!(
        "<html><head><title>Locust Exporter</title></head><body>\
         <h1>Locust Exporter</h1><p><a href='{}'>Metrics</a></p></body></html>",
        state.telemetry_path
    ))
}

async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Run one collection on the blocking pool and return its exposition.
async fn telemetry<S: ReportSource>(State(state): State<ServerState<S>>) -> Response {
    let exporter = Arc::clone(&state.exporter);

    match tokio::task::spawn_blocking(move || exporter.collect()).await {
        Ok(Ok(snapshot)) => {
            if !snapshot.health.is_healthy() {
                warn!("Serving snapshot from an unhealthy scrape");
            }
            ([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], snapshot.body).into_response()
        }
        Ok(Err(e)) if e.is_fatal() => {
            error!(error = %e, report = ?e.report(), "Report layout does not match, giving up");
            if state.on_fatal == FatalAction::Exit {
                std::process::exit(1);
            }
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Ok(Err(e)) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
        Err(e) => {
            error!(error = %e, "Collection task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
