//! Health and metrics handlers

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    dto::HealthResponse,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage_ready = state.store.is_ready().await;

    Json(HealthResponse {
        status: if storage_ready { "healthy" } else { "degraded" }.to_string(),
        version: crate::VERSION.to_string(),
        storage_ready,
        mailer: state.notifier.mailer_name().to_string(),
        risk_policy: format!("{:?}", state.risk.policy()).to_lowercase(),
    })
}

/// Liveness probe (for Kubernetes)
pub async fn liveness() -> &'static str {
    "OK"
}

/// Readiness probe (for Kubernetes)
pub async fn readiness(State(state): State<AppState>) -> ApiResult<&'static str> {
    if state.store.is_ready().await {
        Ok("OK")
    } else {
        Err(ApiError::Unavailable("Store not ready".to_string()))
    }
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
