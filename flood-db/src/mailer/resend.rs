use async_trait::async_trait;
use flood_core::mailer::{EmailMessage, Mailer};
use flood_core::{FloodError, FloodResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// Delivers through the Resend HTTP API
pub struct ResendMailer {
    client: Client,
    api_key: String,
    from_email: String,
}

impl ResendMailer {
    pub fn new(
        api_key: impl Into<String>,
        from_email: impl Into<String>,
        timeout_secs: u64,
    ) -> FloodResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FloodError::Delivery(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            from_email: from_email.into(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, message: &EmailMessage) -> FloodResult<String> {
        let request = SendEmailRequest {
            from: &self.from_email,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
        };

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| FloodError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FloodError::Delivery(format!(
                "Resend returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let sent: SendEmailResponse = response
            .json()
            .await
            .map_err(|e| FloodError::Delivery(format!("invalid Resend response: {}", e)))?;

        debug!(message_id = %sent.id, to = %message.to, "Email accepted by Resend");
        Ok(sent.id)
    }
}
