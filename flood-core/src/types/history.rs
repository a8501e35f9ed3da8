//! Historical flood reference data

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::WardId;
use super::ward::RiskLevel;

/// Primary cause of a historical flood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloodCause {
    HeavyRainfall,
    PoorDrainage,
    RiverOverflow,
    DamFailure,
    PoorInfrastructure,
    ClimateChange,
}

/// A recorded past flood. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalFloodEvent {
    pub event_id: u64,
    pub name: String,
    pub description: String,
    pub date_occurred: NaiveDate,
    pub affected_wards: Vec<WardId>,
    pub latitude: f64,
    pub longitude: f64,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub estimated_casualties: u64,
    #[serde(default)]
    pub estimated_displaced: u64,
    pub rainfall_mm: f64,
    pub primary_cause: FloodCause,
    pub data_source: String,
}

/// Aggregated flood statistics for a ward and year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardYearStats {
    pub ward_id: WardId,
    pub year: i32,
    pub flood_count: u32,
    pub avg_rainfall_mm: f64,
    /// 0-100
    pub vulnerability_index: f64,
    /// 0-100
    pub flood_risk_score: f64,
}

/// Per-ward historical statistics served to the map dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardFloodStatistics {
    pub ward_name: String,
    /// Flood probability in percent, one decimal
    pub probability: f64,
    pub flood_count: u64,
    pub avg_rainfall: f64,
    pub vulnerability: f64,
    pub risk_score: f64,
}
