//! Ward and risk level types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::WardId;

/// Ward flood risk level. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Low
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrative ward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardRecord {
    pub ward_id: WardId,
    pub name: String,
    /// GeoJSON geometry object of the ward boundary
    pub geometry: serde_json::Value,
    #[serde(default)]
    pub current_risk_level: RiskLevel,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub critical_infrastructure: bool,
    pub last_updated: DateTime<Utc>,
}

impl WardRecord {
    pub fn new(ward_id: WardId, name: impl Into<String>, geometry: serde_json::Value) -> Self {
        Self {
            ward_id,
            name: name.into(),
            geometry,
            current_risk_level: RiskLevel::Low,
            population: 0,
            critical_infrastructure: false,
            last_updated: Utc::now(),
        }
    }
}

/// Outcome of a risk level update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskChange {
    pub ward_id: WardId,
    pub previous: RiskLevel,
    pub current: RiskLevel,
}

impl RiskChange {
    /// Whether the ward just escalated to High from a lower level
    pub fn escalated_to_high(&self) -> bool {
        self.current == RiskLevel::High && self.previous != RiskLevel::High
    }

    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_ordering() {
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
    }

    #[test]
    fn test_escalation_detection() {
        let change = RiskChange {
            ward_id: WardId(1),
            previous: RiskLevel::Medium,
            current: RiskLevel::High,
        };
        assert!(change.escalated_to_high());

        let steady = RiskChange {
            previous: RiskLevel::High,
            ..change
        };
        assert!(!steady.escalated_to_high());
        assert!(!steady.changed());
    }
}
