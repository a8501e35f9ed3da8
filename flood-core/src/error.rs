//! Error types for Flood Watch Core

use thiserror::Error;

/// Domain errors shared by the storage, service and API layers
#[derive(Error, Debug)]
pub enum FloodError {
    /// Bad input, surfaced to the caller as a user-visible message
    #[error("Validation error: {0}")]
    Validation(String),

    /// Illegal lifecycle transition
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Actor lacks the role required for the operation
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    /// Email delivery failure. Logged by the dispatcher, never propagated
    /// past it.
    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FloodError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Result type alias for Flood Watch operations
pub type FloodResult<T> = Result<T, FloodError>;
