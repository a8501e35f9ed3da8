//! Alert and dashboard handlers

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use validator::Validate;

use flood_core::ledger::WardRegistry;
use flood_core::{DailySummary, RiskLevel};

use crate::{
    dto::{AlertBatchResponse, DailySummaryRequest, DashboardResponse, SendAlertRequest},
    error::ApiResult,
    state::AppState,
};

const RECENT_ALERTS: usize = 10;

/// Broadcast an alert for one ward, or for every ward at the requested
/// risk level or above
pub async fn send_alert(
    State(state): State<AppState>,
    Json(request): Json<SendAlertRequest>,
) -> ApiResult<(StatusCode, Json<AlertBatchResponse>)> {
    request.validate()?;

    let sent = match request.ward_id {
        Some(ward_id) => vec![
            state
                .alerts
                .send_alert(ward_id, request.risk_level, request.message)
                .await?,
        ],
        None => {
            state
                .alerts
                .send_risk_alerts(request.risk_level, request.message)
                .await?
        }
    };

    let status = if sent.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(AlertBatchResponse::from(sent))))
}

/// Send the daily digest to authorities
pub async fn send_daily_summary(
    State(state): State<AppState>,
    body: Option<Json<DailySummaryRequest>>,
) -> ApiResult<Json<DailySummary>> {
    let date = body
        .and_then(|Json(request)| request.date)
        .unwrap_or_else(|| Utc::now().date_naive());

    let (summary, _) = state.alerts.daily_summary(date).await?;
    Ok(Json(summary))
}

/// Report counts, high-risk ward count and the latest alerts
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardResponse>> {
    let reports = state.lifecycle.status_counts().await?;
    let high_risk_wards = state
        .store
        .list_wards()
        .await?
        .iter()
        .filter(|w| w.current_risk_level == RiskLevel::High)
        .count();
    let recent_alerts = state.store.list_alerts(None, RECENT_ALERTS).await?;

    Ok(Json(DashboardResponse {
        reports,
        high_risk_wards,
        recent_alerts,
    }))
}
