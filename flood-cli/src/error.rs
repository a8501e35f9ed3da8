//! CLI Error Types

use thiserror::Error;

use flood_core::FloodError;
use flood_db::DbError;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Store could not be opened or written
    #[error("Storage error: {0}")]
    StorageError(#[from] DbError),

    /// Domain rule rejected the operation
    #[error("{0}")]
    DomainError(#[from] FloodError),

    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("Server error: {message}")]
    ServerError { message: String },
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn config(message: impl Into<String>) -> Self {
        CliError::ConfigError {
            message: message.into(),
        }
    }

    pub fn invalid_arg(message: impl Into<String>) -> Self {
        CliError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        CliError::ServerError {
            message: message.into(),
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ConfigError { .. } => 1,
            CliError::InvalidArgument { .. } => 2,
            CliError::IoError(_) => 5,
            CliError::JsonError(_) => 6,
            CliError::StorageError(_) => 10,
            CliError::DomainError(FloodError::NotFound(_)) => 21,
            CliError::DomainError(_) => 11,
            CliError::TokenError(_) => 12,
            CliError::ServerError { .. } => 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("FLOOD_JWT_SECRET is not set");
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("FLOOD_JWT_SECRET"));
    }

    #[test]
    fn test_domain_errors() {
        let err = CliError::from(FloodError::not_found("ward 7"));
        assert_eq!(err.exit_code(), 21);

        let err = CliError::from(FloodError::validation("bad ward file"));
        assert_eq!(err.exit_code(), 11);
    }
}
