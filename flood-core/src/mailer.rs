//! Mail transport interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FloodResult;

/// A rendered email ready for delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Email delivery transport
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Transport name for logs
    fn name(&self) -> &'static str;

    /// Deliver a message, returning the provider's message ID.
    /// Failures are reported as `FloodError::Delivery`.
    async fn send(&self, message: &EmailMessage) -> FloodResult<String>;
}
