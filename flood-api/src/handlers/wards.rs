//! Ward map and risk handlers

use axum::{
    extract::{Path, State},
    http::header::CACHE_CONTROL,
    response::IntoResponse,
    Extension, Json,
};
use std::collections::BTreeMap;

use flood_core::geojson::FeatureCollection;
use flood_core::{WardFloodStatistics, WardId};

use crate::{
    dto::{RiskChangeResponse, SetRiskRequest, WardRiskResponse},
    error::ApiResult,
    middleware::AuthClaims,
    state::AppState,
};

/// Ward boundaries change rarely; map clients may cache for five minutes
const WARD_DATA_CACHE: &str = "public, max-age=300";

/// Ward GeoJSON feature collection
pub async fn ward_data(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let collection: FeatureCollection = state.map.ward_geojson().await?;
    Ok(([(CACHE_CONTROL, WARD_DATA_CACHE)], Json(collection)))
}

/// Historical flood statistics keyed by ward ID
pub async fn historical_flood_data(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<WardId, WardFloodStatistics>>> {
    Ok(Json(state.risk.historical_statistics().await?))
}

pub async fn get_ward_risk(
    State(state): State<AppState>,
    Path(ward_id): Path<u64>,
) -> ApiResult<Json<WardRiskResponse>> {
    let ward_id = WardId(ward_id);
    let risk_level = state.risk.current_risk(ward_id).await?;
    Ok(Json(WardRiskResponse {
        ward_id,
        risk_level,
    }))
}

/// Authority risk update. Escalation to High triggers the ward alert.
pub async fn set_ward_risk(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(ward_id): Path<u64>,
    Json(request): Json<SetRiskRequest>,
) -> ApiResult<Json<RiskChangeResponse>> {
    let change = state
        .risk
        .set_risk(WardId(ward_id), request.risk_level, &claims.user_id())
        .await?;
    Ok(Json(change.into()))
}
