//! RBAC (Role-Based Access Control) Middleware
//!
//! Maps the `roles` claim onto Flood Watch permissions. Handlers that need a
//! finer check (report ownership) still consult the user record.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use flood_core::Role;

use super::auth::AuthClaims;
use crate::error::ErrorResponse;

/// Permission enumeration for Flood Watch API operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Reports
    ReportSubmit,
    ReportRead,
    ReportReadAll,
    ReportReview,
    ReportVote,

    // Wards and risk
    WardRead,
    WardRiskUpdate,
    HistoryRead,

    // Alerts
    AlertSend,
    SummarySend,

    DashboardRead,
}

/// Default permissions for a role
pub fn default_permissions(role: Role) -> HashSet<Permission> {
    let mut perms: HashSet<Permission> = [
        Permission::ReportSubmit,
        Permission::ReportRead,
        Permission::ReportVote,
        Permission::WardRead,
        Permission::HistoryRead,
        Permission::DashboardRead,
    ]
    .into_iter()
    .collect();

    if role == Role::Authority {
        perms.extend([
            Permission::ReportReadAll,
            Permission::ReportReview,
            Permission::WardRiskUpdate,
            Permission::AlertSend,
            Permission::SummarySend,
        ]);
    }

    perms
}

/// RBAC configuration
#[derive(Debug, Clone, Default)]
pub struct RbacConfig {
    /// Custom role-permission mappings (overrides defaults)
    pub role_permissions: HashMap<Role, HashSet<Permission>>,
}

impl RbacConfig {
    pub fn get_permissions(&self, role: Role) -> HashSet<Permission> {
        self.role_permissions
            .get(&role)
            .cloned()
            .unwrap_or_else(|| default_permissions(role))
    }

    pub fn add_permission(&mut self, role: Role, permission: Permission) {
        self.role_permissions
            .entry(role)
            .or_insert_with(|| default_permissions(role))
            .insert(permission);
    }

    pub fn remove_permission(&mut self, role: Role, permission: Permission) {
        self.role_permissions
            .entry(role)
            .or_insert_with(|| default_permissions(role))
            .remove(&permission);
    }
}

/// RBAC error
#[derive(Debug)]
pub enum RbacError {
    /// No authentication found
    Unauthenticated,
    /// Missing required permission
    Forbidden(Permission),
    /// Token carries no recognised role
    InvalidRole(String),
}

impl IntoResponse for RbacError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            RbacError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required".to_string(),
            ),
            RbacError::Forbidden(perm) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                format!("Missing required permission: {:?}", perm),
            ),
            RbacError::InvalidRole(role) => (
                StatusCode::FORBIDDEN,
                "INVALID_ROLE",
                format!("Invalid role: {}", role),
            ),
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

/// RBAC state
#[derive(Clone, Default)]
pub struct RbacState {
    pub config: Arc<RbacConfig>,
}

impl RbacState {
    pub fn new(config: RbacConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn has_permission(&self, claims: &AuthClaims, permission: Permission) -> bool {
        claims
            .roles
            .iter()
            .filter_map(|r| Role::parse(r))
            .any(|role| self.config.get_permissions(role).contains(&permission))
    }

    fn check(&self, claims: &AuthClaims, permission: Permission) -> Result<(), RbacError> {
        if !claims.roles.iter().any(|r| Role::parse(r).is_some()) {
            let shown = claims.roles.first().cloned().unwrap_or_default();
            return Err(RbacError::InvalidRole(shown));
        }
        if !self.has_permission(claims, permission) {
            return Err(RbacError::Forbidden(permission));
        }
        Ok(())
    }
}

type RbacFuture = Pin<Box<dyn Future<Output = Result<Response, RbacError>> + Send>>;

/// Require permission middleware factory
pub fn require_permission(
    permission: Permission,
) -> impl Fn(State<RbacState>, Request, Next) -> RbacFuture + Clone + Send {
    move |State(state): State<RbacState>, request: Request, next: Next| {
        Box::pin(async move {
            // Claims are set by `require_auth`
            let claims = request
                .extensions()
                .get::<AuthClaims>()
                .ok_or(RbacError::Unauthenticated)?;

            state.check(claims, permission)?;

            Ok(next.run(request).await)
        })
    }
}
