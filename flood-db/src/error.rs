//! Flood Watch storage error types

use flood_core::FloodError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored column holds a value the domain types cannot represent
    #[error("Invalid stored value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Domain rule rejected the write; passed through unchanged
    #[error(transparent)]
    Domain(#[from] FloodError),
}

pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }
}

impl From<DbError> for FloodError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Domain(inner) => inner,
            other => FloodError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_pass_through() {
        let err: FloodError = DbError::from(FloodError::not_found("ward 3")).into();
        assert!(matches!(err, FloodError::NotFound(_)));

        let err: FloodError = DbError::invalid_value("status", "Archived").into();
        assert!(matches!(err, FloodError::Storage(_)));
    }
}
