//! Notification and email log types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::ReportId;

/// Lifecycle and broadcast events that trigger email
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Confirmation to the reporter and a review request to authorities
    ReportSubmitted,
    ReportValidated,
    ReportRejected,
    FloodAlert,
    DailySummary,
    /// Ward escalated to High; sent to the ward's subscribers
    RiskEscalated,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ReportSubmitted => "report_submitted",
            EventKind::ReportValidated => "report_validated",
            EventKind::ReportRejected => "report_rejected",
            EventKind::FloodAlert => "flood_alert",
            EventKind::DailySummary => "daily_summary",
            EventKind::RiskEscalated => "risk_escalated",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    User,
    Authority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// One email delivery attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailLogEntry {
    pub recipient_email: String,
    pub recipient_kind: RecipientKind,
    pub subject: String,
    pub event: EventKind,
    pub related_report: Option<ReportId>,
    pub sent_at: DateTime<Utc>,
    pub status: DeliveryStatus,
    #[serde(default)]
    pub error_message: String,
}
