use async_trait::async_trait;
use flood_core::mailer::{EmailMessage, Mailer};
use flood_core::{FloodError, FloodResult};
use std::collections::HashSet;
use tokio::sync::Mutex;

/// Captures delivered messages; addresses in the failure set are refused
#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<EmailMessage>>,
    failing: HashSet<String>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse delivery to `address`
    pub fn failing_for(mut self, address: impl Into<String>) -> Self {
        self.failing.insert(address.into());
        self
    }

    pub async fn outbox(&self) -> Vec<EmailMessage> {
        self.outbox.lock().await.clone()
    }

    pub async fn sent_to(&self, address: &str) -> Vec<EmailMessage> {
        self.outbox
            .lock()
            .await
            .iter()
            .filter(|m| m.to == address)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn send(&self, message: &EmailMessage) -> FloodResult<String> {
        if self.failing.contains(&message.to) {
            return Err(FloodError::Delivery(format!(
                "mailbox {} unavailable",
                message.to
            )));
        }
        let mut outbox = self.outbox.lock().await;
        outbox.push(message.clone());
        Ok(format!("memory-{}", outbox.len()))
    }
}
