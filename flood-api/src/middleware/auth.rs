//! JWT Authentication Middleware
//!
//! Validates bearer tokens and stores the claims in request extensions.
//! Tokens are issued by the identity provider (or `flood issue-token`);
//! the API only verifies them.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use flood_core::{Role, UserId};

use crate::error::ErrorResponse;

/// Environment variable holding the HS256 secret
pub const JWT_SECRET_ENV: &str = "FLOOD_JWT_SECRET";

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub validate_exp: bool,
}

/// Error type for JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfigError {
    pub message: String,
}

impl std::fmt::Display for JwtConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JWT config error: {}", self.message)
    }
}

impl std::error::Error for JwtConfigError {}

impl JwtConfig {
    /// Minimum secret length
    const MIN_SECRET_LENGTH: usize = 32;

    /// Create a config, rejecting secrets shorter than 32 bytes
    pub fn try_new(secret: impl Into<String>) -> Result<Self, JwtConfigError> {
        let secret = secret.into();
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(JwtConfigError {
                message: format!(
                    "JWT secret must be at least {} bytes. Got {} bytes.",
                    Self::MIN_SECRET_LENGTH,
                    secret.len()
                ),
            });
        }
        Ok(Self {
            secret,
            algorithm: Algorithm::HS256,
            issuer: None,
            audience: None,
            validate_exp: true,
        })
    }

    /// Read the secret from `FLOOD_JWT_SECRET`
    pub fn try_from_env() -> Result<Self, JwtConfigError> {
        let secret = std::env::var(JWT_SECRET_ENV).map_err(|_| JwtConfigError {
            message: format!(
                "environment variable '{}' is not set. \
                 Set it to a random value of at least 32 bytes.",
                JWT_SECRET_ENV
            ),
        })?;
        Self::try_new(secret)
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl AuthClaims {
    /// Claims for `sub` valid for `ttl_secs` from now
    pub fn new(sub: impl Into<String>, roles: &[Role], ttl_secs: u64) -> Self {
        let now = Utc::now().timestamp().max(0) as u64;
        Self {
            sub: sub.into(),
            exp: now + ttl_secs,
            iat: now,
            iss: None,
            aud: None,
            roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
        }
    }

    pub fn user_id(&self) -> UserId {
        UserId::new(&self.sub)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|r| Role::parse(r) == Some(role))
    }

    pub fn is_authority(&self) -> bool {
        self.has_role(Role::Authority)
    }
}

/// Authentication error
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidTokenFormat,
    ValidationFailed(String),
    TokenExpired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AuthError::MissingToken => (
                "MISSING_TOKEN",
                "Authorization header is required".to_string(),
            ),
            AuthError::InvalidTokenFormat => (
                "INVALID_TOKEN_FORMAT",
                "Invalid authorization header format. Expected: Bearer <token>".to_string(),
            ),
            AuthError::ValidationFailed(msg) => ("TOKEN_VALIDATION_FAILED", msg),
            AuthError::TokenExpired => ("TOKEN_EXPIRED", "Token has expired".to_string()),
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(code, message)),
        )
            .into_response()
    }
}

/// Strip the `Bearer ` prefix
pub fn extract_token(auth_header: &str) -> Result<&str, AuthError> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidTokenFormat)
}

/// Validate JWT token and extract claims
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<AuthClaims, AuthError> {
    let mut validation = Validation::new(config.algorithm);
    validation.validate_exp = config.validate_exp;

    if let Some(ref iss) = config.issuer {
        validation.set_issuer(&[iss]);
    }
    if let Some(ref aud) = config.audience {
        validation.set_audience(&[aud]);
    }

    let key = DecodingKey::from_secret(config.secret.as_bytes());

    let token_data = decode::<AuthClaims>(token, &key, &validation).map_err(|e| {
        if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature {
            AuthError::TokenExpired
        } else {
            AuthError::ValidationFailed(e.to_string())
        }
    })?;

    Ok(token_data.claims)
}

/// Sign claims with the configured secret
pub fn issue_token(
    claims: &AuthClaims,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let mut claims = claims.clone();
    if claims.iss.is_none() {
        claims.iss = config.issuer.clone();
    }
    if claims.aud.is_none() {
        claims.aud = config.audience.clone();
    }
    encode(
        &Header::new(config.algorithm),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Authentication state for sharing config
#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<JwtConfig>,
}

impl AuthState {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Require authentication middleware
pub async fn require_auth(
    State(auth_state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = extract_token(auth_header)?;
    let claims = validate_token(token, &auth_state.config)?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_short_secret_rejected() {
        assert!(JwtConfig::try_new("short").is_err());
        assert!(JwtConfig::try_new(SECRET).is_ok());
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token("Bearer abc").unwrap(), "abc");
        assert!(matches!(
            extract_token("Basic abc"),
            Err(AuthError::InvalidTokenFormat)
        ));
        assert!(matches!(
            extract_token("Bearer "),
            Err(AuthError::InvalidTokenFormat)
        ));
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let config = JwtConfig::try_new(SECRET).unwrap().with_issuer("flood-watch");
        let claims = AuthClaims::new("officer-1", &[Role::Authority], 3600);

        let token = issue_token(&claims, &config).unwrap();
        let decoded = validate_token(&token, &config).unwrap();

        assert_eq!(decoded.sub, "officer-1");
        assert_eq!(decoded.iss.as_deref(), Some("flood-watch"));
        assert!(decoded.is_authority());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let config = JwtConfig::try_new(SECRET).unwrap();
        let other = JwtConfig::try_new("ffffffffffffffffffffffffffffffff").unwrap();
        let token = issue_token(&AuthClaims::new("u", &[Role::Resident], 60), &config).unwrap();

        assert!(matches!(
            validate_token(&token, &other),
            Err(AuthError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let config = JwtConfig::try_new(SECRET).unwrap();
        let mut claims = AuthClaims::new("u", &[Role::Resident], 0);
        claims.exp = claims.iat.saturating_sub(3600);
        let token = issue_token(&claims, &config).unwrap();

        assert!(matches!(
            validate_token(&token, &config),
            Err(AuthError::TokenExpired)
        ));
    }
}
