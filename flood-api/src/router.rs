//! API Router
//!
//! Health and metrics routes are public. Every `/api` route runs
//! `require_auth` first, then the permission check for its method.

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put, MethodRouter},
    Router,
};

use crate::{
    handlers,
    metrics::track_requests,
    middleware::{require_auth, require_permission, Permission, RbacState},
    state::AppState,
    MAX_REQUEST_BYTES,
};

/// Guard a method router with a permission check
fn guarded(
    route: MethodRouter<AppState>,
    rbac: &RbacState,
    permission: Permission,
) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(
        rbac.clone(),
        require_permission(permission),
    ))
}

/// Authenticated `/api` routes
fn api_routes(state: &AppState) -> Router<AppState> {
    let rbac = &state.rbac;

    Router::new()
        // Map data
        .route(
            "/api/ward-data/",
            guarded(get(handlers::ward_data), rbac, Permission::WardRead),
        )
        .route(
            "/api/historical-flood-data/",
            guarded(
                get(handlers::historical_flood_data),
                rbac,
                Permission::HistoryRead,
            ),
        )
        .route(
            "/api/wards/:ward_id/risk",
            guarded(get(handlers::get_ward_risk), rbac, Permission::WardRead).merge(guarded(
                put(handlers::set_ward_risk),
                rbac,
                Permission::WardRiskUpdate,
            )),
        )
        // Reports
        .route(
            "/api/reports",
            guarded(post(handlers::submit_report), rbac, Permission::ReportSubmit).merge(
                guarded(get(handlers::list_reports), rbac, Permission::ReportReadAll),
            ),
        )
        .route(
            "/api/reports/:report_id",
            guarded(get(handlers::get_report), rbac, Permission::ReportRead),
        )
        .route(
            "/api/reports/:report_id/review",
            guarded(post(handlers::review_report), rbac, Permission::ReportReview),
        )
        .route(
            "/api/reports/:report_id/vote",
            guarded(post(handlers::vote_report), rbac, Permission::ReportVote),
        )
        // Alerts
        .route(
            "/api/dashboard",
            guarded(get(handlers::dashboard), rbac, Permission::DashboardRead),
        )
        .route(
            "/api/alerts",
            guarded(post(handlers::send_alert), rbac, Permission::AlertSend),
        )
        .route(
            "/api/alerts/daily-summary",
            guarded(
                post(handlers::send_daily_summary),
                rbac,
                Permission::SummarySend,
            ),
        )
        .route_layer(from_fn_with_state(state.auth.clone(), require_auth))
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::liveness))
        .route("/health/ready", get(handlers::readiness))
        .route("/metrics", get(handlers::metrics))
        .merge(api_routes(&state))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(from_fn(track_requests))
        .with_state(state)
}
