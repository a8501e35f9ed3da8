use async_trait::async_trait;
use flood_core::mailer::{EmailMessage, Mailer};
use flood_core::FloodResult;
use tracing::info;

/// Logs messages instead of delivering them
#[derive(Debug, Clone)]
pub struct ConsoleMailer {
    from_email: String,
}

impl ConsoleMailer {
    pub fn new(from_email: impl Into<String>) -> Self {
        Self {
            from_email: from_email.into(),
        }
    }
}

#[async_trait]
impl Mailer for ConsoleMailer {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn send(&self, message: &EmailMessage) -> FloodResult<String> {
        let message_id = format!("console-{}", uuid::Uuid::new_v4());
        info!(
            message_id = %message_id,
            from = %self.from_email,
            to = %message.to,
            subject = %message.subject,
            body = %message.text,
            "Email (console transport)"
        );
        Ok(message_id)
    }
}
