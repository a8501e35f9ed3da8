//! Flood Watch REST API
//!
//! HTTP interface for crowdsourced flood reporting in Nairobi.
//!
//! # Endpoints
//!
//! ## Health
//! - `GET /health` - Health check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /metrics` - Prometheus exposition
//!
//! ## Map data
//! - `GET /api/ward-data/` - Ward GeoJSON feature collection
//! - `GET /api/historical-flood-data/` - Per-ward flood statistics
//! - `GET /api/wards/:ward_id/risk` - Current ward risk level
//! - `PUT /api/wards/:ward_id/risk` - Set ward risk level (authority)
//!
//! ## Reports
//! - `POST /api/reports` - Submit a flood report
//! - `GET /api/reports` - List reports, optionally by `status` (authority)
//! - `GET /api/reports/:report_id` - Report detail (owner or authority)
//! - `POST /api/reports/:report_id/review` - Validate or reject (authority)
//! - `POST /api/reports/:report_id/vote` - Up/down vote
//!
//! ## Alerts
//! - `GET /api/dashboard` - Status counts and recent alerts
//! - `POST /api/alerts` - Broadcast a ward alert (authority)
//! - `POST /api/alerts/daily-summary` - Send the daily digest (authority)
//!
//! Every `/api` route requires `Authorization: Bearer <jwt>`.
//!
//! # Usage
//!
//! ```ignore
//! use flood_api::{run_server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     run_server(ServerConfig::from_env()).await
//! }
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod server;
pub mod state;
pub mod telemetry;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use metrics::MetricsConfig;
pub use middleware::{issue_token, AuthClaims, JwtConfig, Permission, RbacConfig};
pub use router::create_router;
pub use server::{create_server, run_server};
pub use state::AppState;
pub use telemetry::{init_logging, LogConfig, LogFormat, LogLevel};

use flood_db::RiskPolicy;

/// API version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default port
pub const DEFAULT_PORT: u16 = 8000;

/// Default data directory
pub const DEFAULT_DATA_PATH: &str = "./data";

/// Request body cap. Leaves room for a base64-encoded 5 MiB photo.
pub const MAX_REQUEST_BYTES: usize = 8 * 1024 * 1024;

/// Configuration for the Flood Watch API server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Directory holding the store database and uploaded media
    pub data_path: String,
    pub risk_policy: RiskPolicy,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            data_path: DEFAULT_DATA_PATH.to_string(),
            risk_policy: RiskPolicy::Manual,
            enable_cors: true,
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("FLOOD_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: std::env::var("FLOOD_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            data_path: std::env::var("FLOOD_DATA_PATH").unwrap_or(defaults.data_path),
            risk_policy: std::env::var("FLOOD_RISK_POLICY")
                .ok()
                .and_then(|p| parse_risk_policy(&p))
                .unwrap_or(defaults.risk_policy),
            enable_cors: std::env::var("FLOOD_ENABLE_CORS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.enable_cors),
        }
    }

    /// Get the full bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// `manual` or `automatic`
pub fn parse_risk_policy(s: &str) -> Option<RiskPolicy> {
    match s.trim().to_lowercase().as_str() {
        "manual" => Some(RiskPolicy::Manual),
        "automatic" | "auto" => Some(RiskPolicy::Automatic),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = ServerConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 9000,
            ..Default::default()
        };
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
    }

    #[test]
    fn test_parse_risk_policy() {
        assert_eq!(parse_risk_policy("Automatic"), Some(RiskPolicy::Automatic));
        assert_eq!(parse_risk_policy("manual"), Some(RiskPolicy::Manual));
        assert_eq!(parse_risk_policy("sometimes"), None);
    }
}
