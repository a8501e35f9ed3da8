//! Prometheus Metrics
//!
//! # Metrics
//!
//! ## Counters
//! - `flood_http_requests_total` - HTTP requests by method, path, status
//! - `flood_reports_submitted_total` - accepted report submissions
//! - `flood_reports_reviewed_total` - reviews by decision
//! - `flood_emails_total` - notification emails by event and outcome
//!   (recorded by the notification dispatcher)
//!
//! ## Histograms
//! - `flood_http_request_duration_seconds` - HTTP request duration
//!
//! # Configuration
//!
//! - `FLOOD_METRICS_ENABLED`: install the Prometheus recorder (default: true)

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

use flood_core::ReviewDecision;

/// Metrics configuration
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let enabled = std::env::var("FLOOD_METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        Self { enabled }
    }
}

/// Install the global Prometheus recorder.
///
/// Call once at startup. Returns `None` when metrics are disabled; the
/// handle renders the `/metrics` body.
pub fn init_metrics(config: &MetricsConfig) -> Result<Option<PrometheusHandle>, String> {
    if !config.enabled {
        tracing::info!("Metrics disabled");
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install metrics recorder: {}", e))?;

    tracing::info!("Metrics initialized");
    Ok(Some(handle))
}

/// Record a request metric
pub fn record_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!("flood_http_requests_total", &labels).increment(1);
    histogram!("flood_http_request_duration_seconds", &labels).record(duration_secs);
}

pub fn record_report_submitted(has_photo: bool) {
    counter!("flood_reports_submitted_total", "has_photo" => has_photo.to_string()).increment(1);
}

pub fn record_report_reviewed(decision: ReviewDecision) {
    let decision = match decision {
        ReviewDecision::Validate => "validate",
        ReviewDecision::Reject => "reject",
    };
    counter!("flood_reports_reviewed_total", "decision" => decision).increment(1);
}

/// Collapse numeric path segments so label cardinality stays bounded
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|part| {
            if !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()) {
                ":id"
            } else {
                part
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Metrics middleware for tracking HTTP requests
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    // Prefer the route template; fall back to the raw path for 404s
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| normalize_path(request.uri().path()));

    let response = next.run(request).await;

    record_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}
