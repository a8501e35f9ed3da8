//! Ward alert records and the authority daily digest

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::common::{AlertId, WardId};
use super::ward::RiskLevel;

/// A broadcast alert issued for a ward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub alert_id: AlertId,
    pub ward_id: WardId,
    pub risk_level: RiskLevel,
    pub message: String,
    pub issued_at: DateTime<Utc>,
}

/// Daily digest sent to authorities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub pending_reports: u64,
    /// Reports created the previous day that are now validated
    pub validated_yesterday: u64,
    pub high_risk_wards: u64,
    pub medium_risk_wards: u64,
    pub low_risk_wards: u64,
}

impl DailySummary {
    pub fn wards_at(&self, level: RiskLevel) -> u64 {
        match level {
            RiskLevel::High => self.high_risk_wards,
            RiskLevel::Medium => self.medium_risk_wards,
            RiskLevel::Low => self.low_risk_wards,
        }
    }
}
