//! Report Handlers
//!
//! Submission, listing, detail, review and voting.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use flood_core::{NewReport, ReportId, ReportRecord, VoteTally};

use crate::{
    dto::{
        ListReportsQuery, ReportListResponse, ReviewRequest, ReviewResponse,
        SubmitReportRequest, VoteRequest,
    },
    error::ApiResult,
    metrics,
    middleware::AuthClaims,
    state::AppState,
};

const DEFAULT_LIST_LIMIT: usize = 100;
const MAX_LIST_LIMIT: usize = 500;

/// Submit a flood report as the authenticated user
pub async fn submit_report(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Json(request): Json<SubmitReportRequest>,
) -> ApiResult<(StatusCode, Json<ReportRecord>)> {
    request.validate()?;

    let coordinates = request.coordinates();
    let photo = request.photo.map(|p| p.decode()).transpose()?;

    let record = state
        .lifecycle
        .submit(NewReport {
            reporter_id: claims.user_id(),
            location: request.location,
            coordinates,
            description: request.description,
            photo,
        })
        .await?;

    metrics::record_report_submitted(record.photo.is_some());

    Ok((StatusCode::CREATED, Json(record)))
}

/// List reports, newest first
pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> ApiResult<Json<ReportListResponse>> {
    let status = query.status()?;
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);

    let reports = state.lifecycle.list(status, limit).await?;
    Ok(Json(ReportListResponse {
        count: reports.len(),
        reports,
    }))
}

pub async fn get_report(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(report_id): Path<u64>,
) -> ApiResult<Json<ReportRecord>> {
    let report = state
        .lifecycle
        .get(ReportId(report_id), &claims.user_id())
        .await?;
    Ok(Json(report))
}

/// Validate or reject a pending report
pub async fn review_report(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(report_id): Path<u64>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<Json<ReviewResponse>> {
    request.validate()?;

    let report_id = ReportId(report_id);
    let actor = claims.user_id();

    let action = state
        .lifecycle
        .review(report_id, &actor, request.decision, request.notes)
        .await?;
    metrics::record_report_reviewed(action.decision);

    let report = state.lifecycle.get(report_id, &actor).await?;
    Ok(Json(ReviewResponse { report, action }))
}

/// Cast or replace the caller's vote on a report they can see
pub async fn vote_report(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(report_id): Path<u64>,
    Json(request): Json<VoteRequest>,
) -> ApiResult<Json<VoteTally>> {
    let tally = state
        .lifecycle
        .vote(ReportId(report_id), &claims.user_id(), request.vote)
        .await?;
    Ok(Json(tally))
}
