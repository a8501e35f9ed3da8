//! Mail transports
//!
//! - `ConsoleMailer`: logs each message (default, development)
//! - `ResendMailer`: HTTPS JSON delivery through the Resend API
//! - `MemoryMailer`: captures messages in memory for tests
//!
//! # Configuration
//!
//! - `FLOOD_FROM_EMAIL`: sender address (default: `noreply@floodwarning.biz`)
//! - `FLOOD_SITE_URL`: base URL used in email links (default: `http://localhost:8000`)
//! - `FLOOD_USE_CONSOLE_EMAIL`: log instead of sending (default: true)
//! - `RESEND_API_KEY`: Resend API key, required for real delivery

mod console;
mod memory;
mod resend;

pub use console::ConsoleMailer;
pub use memory::MemoryMailer;
pub use resend::ResendMailer;

use flood_core::mailer::Mailer;
use flood_core::FloodResult;
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_FROM_EMAIL: &str = "noreply@floodwarning.biz";
pub const DEFAULT_SITE_URL: &str = "http://localhost:8000";

/// Mail configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub from_email: String,
    pub site_url: String,
    pub use_console: bool,
    pub resend_api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            use_console: true,
            resend_api_key: None,
            timeout_secs: 15,
        }
    }
}

impl MailerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let use_console = std::env::var("FLOOD_USE_CONSOLE_EMAIL")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(defaults.use_console);

        Self {
            from_email: std::env::var("FLOOD_FROM_EMAIL").unwrap_or(defaults.from_email),
            site_url: std::env::var("FLOOD_SITE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_url),
            use_console,
            resend_api_key: std::env::var("RESEND_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            ..defaults
        }
    }

    /// Build the configured transport. Falls back to the console transport
    /// when real delivery is requested without an API key.
    pub fn build(&self) -> FloodResult<Arc<dyn Mailer>> {
        if self.use_console {
            return Ok(Arc::new(ConsoleMailer::new(&self.from_email)));
        }

        match &self.resend_api_key {
            Some(key) => Ok(Arc::new(ResendMailer::new(
                key,
                &self.from_email,
                self.timeout_secs,
            )?)),
            None => {
                warn!("RESEND_API_KEY not set, emails will be logged instead of sent");
                Ok(Arc::new(ConsoleMailer::new(&self.from_email)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_by_default() {
        let mailer = MailerConfig::default().build().unwrap();
        assert_eq!(mailer.name(), "console");
    }

    #[test]
    fn test_missing_key_falls_back_to_console() {
        let config = MailerConfig {
            use_console: false,
            ..Default::default()
        };
        assert_eq!(config.build().unwrap().name(), "console");
    }

    #[test]
    fn test_resend_with_key() {
        let config = MailerConfig {
            use_console: false,
            resend_api_key: Some("re_test".to_string()),
            ..Default::default()
        };
        assert_eq!(config.build().unwrap().name(), "resend");
    }
}
