//! Flood Watch API Middleware

pub mod auth;
pub mod rbac;

pub use auth::{issue_token, require_auth, AuthClaims, AuthState, JwtConfig};
pub use rbac::{require_permission, Permission, RbacConfig, RbacState};
