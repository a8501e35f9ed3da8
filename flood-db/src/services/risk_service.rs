//! Risk Aggregator
//!
//! Ward risk lookups, manual risk updates with escalation alerts, historical
//! flood probability and optional threshold-driven reassessment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use flood_core::ledger::{FloodHistory, UserDirectory, WardRegistry};
use flood_core::{
    FloodError, FloodResult, RiskChange, RiskLevel, UserId, WardFloodStatistics, WardId,
    WardRecord, FLOOD_COUNT_SATURATION, HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD,
};

use super::notification_service::NotificationService;
use crate::store::FloodStore;

/// Probability cut-offs, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: HIGH_RISK_THRESHOLD,
            medium: MEDIUM_RISK_THRESHOLD,
        }
    }
}

impl RiskThresholds {
    /// High above `high`, Medium from `medium` up to `high` inclusive
    pub fn classify(&self, probability: f64) -> RiskLevel {
        if probability > self.high {
            RiskLevel::High
        } else if probability >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Lowest probability consistent with a level
    fn floor_for(&self, level: RiskLevel) -> f64 {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => 0.0,
        }
    }
}

/// How ward risk levels change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskPolicy {
    /// Only authorities change risk levels
    #[default]
    Manual,
    /// `reassess()` reclassifies wards from historical data
    Automatic,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Probability from the recorded flood count alone
fn count_probability(flood_count: usize) -> f64 {
    ((flood_count as f64 / FLOOD_COUNT_SATURATION) * 100.0).min(100.0)
}

/// Risk Aggregator
pub struct RiskService {
    store: Arc<FloodStore>,
    notifier: Arc<NotificationService>,
    thresholds: RiskThresholds,
    policy: RiskPolicy,
}

impl RiskService {
    pub fn new(store: Arc<FloodStore>, notifier: Arc<NotificationService>) -> Self {
        Self {
            store,
            notifier,
            thresholds: RiskThresholds::default(),
            policy: RiskPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RiskPolicy, thresholds: RiskThresholds) -> Self {
        self.policy = policy;
        self.thresholds = thresholds;
        self
    }

    pub fn policy(&self) -> RiskPolicy {
        self.policy
    }

    async fn ward(&self, ward_id: WardId) -> FloodResult<WardRecord> {
        self.store
            .get_ward(ward_id)
            .await?
            .ok_or_else(|| FloodError::not_found(format!("ward {}", ward_id)))
    }

    /// Stored risk level of a ward
    pub async fn current_risk(&self, ward_id: WardId) -> FloodResult<RiskLevel> {
        Ok(self.ward(ward_id).await?.current_risk_level)
    }

    /// Authority risk update
    pub async fn set_risk(
        &self,
        ward_id: WardId,
        level: RiskLevel,
        actor: &UserId,
    ) -> FloodResult<RiskChange> {
        let is_authority = self
            .store
            .get_user(actor)
            .await?
            .map(|u| u.is_active && u.is_authority())
            .unwrap_or(false);
        if !is_authority {
            return Err(FloodError::unauthorized(
                "only authorities can change ward risk levels",
            ));
        }

        let change = self.apply_risk_level(ward_id, level).await?;
        info!(
            ward_id = %ward_id,
            actor = %actor,
            previous = %change.previous,
            current = %change.current,
            "Ward risk level set"
        );
        Ok(change)
    }

    /// Store a risk level for a trusted caller. An escalation to High
    /// records an alert and notifies the ward's subscribers.
    pub async fn apply_risk_level(
        &self,
        ward_id: WardId,
        level: RiskLevel,
    ) -> FloodResult<RiskChange> {
        let change = self.store.set_risk_level(ward_id, level).await?;

        if change.escalated_to_high() {
            let ward = self.ward(ward_id).await?;
            let message = format!(
                "!! FLOOD ALERT !! High flood risk detected for {}. \
                 Please take necessary precautions and move to higher ground.",
                ward.name
            );
            let alert = self
                .store
                .record_alert(ward_id, RiskLevel::High, message)
                .await?;
            info!(ward_id = %ward_id, alert_id = alert.alert_id.0, "Risk escalated to High");
            self.notifier.risk_escalated(&ward, &alert).await;
        }

        Ok(change)
    }

    /// Per-ward historical statistics.
    ///
    /// Probability is the recorded flood count scaled to 10 floods = 100%,
    /// raised to the threshold of the ward's current level. Rainfall,
    /// vulnerability and risk score come from the most recent year on record.
    pub async fn historical_statistics(
        &self,
    ) -> FloodResult<BTreeMap<WardId, WardFloodStatistics>> {
        let mut out = BTreeMap::new();

        for ward in self.store.list_wards().await? {
            let flood_count = self.store.events(Some(ward.ward_id)).await?.len();
            let probability = count_probability(flood_count)
                .max(self.thresholds.floor_for(ward.current_risk_level));
            let latest = self.store.year_stats(ward.ward_id).await?.into_iter().next();

            out.insert(
                ward.ward_id,
                WardFloodStatistics {
                    ward_name: ward.name,
                    probability: round1(probability),
                    flood_count: flood_count as u64,
                    avg_rainfall: latest.as_ref().map_or(0.0, |s| round1(s.avg_rainfall_mm)),
                    vulnerability: latest
                        .as_ref()
                        .map_or(0.0, |s| round1(s.vulnerability_index)),
                    risk_score: latest.as_ref().map_or(0.0, |s| round1(s.flood_risk_score)),
                },
            );
        }

        Ok(out)
    }

    /// Reclassify every ward from its historical probability. Does nothing
    /// under the manual policy.
    pub async fn reassess(&self) -> FloodResult<Vec<RiskChange>> {
        if self.policy == RiskPolicy::Manual {
            debug!("Risk policy is manual, skipping reassessment");
            return Ok(Vec::new());
        }

        let mut changes = Vec::new();
        for ward in self.store.list_wards().await? {
            let flood_count = self.store.events(Some(ward.ward_id)).await?.len();
            let risk_score = self
                .store
                .year_stats(ward.ward_id)
                .await?
                .first()
                .map_or(0.0, |s| s.flood_risk_score);
            let probability = count_probability(flood_count).max(risk_score);
            let level = self.thresholds.classify(probability);

            if level != ward.current_risk_level {
                changes.push(self.apply_risk_level(ward.ward_id, level).await?);
            }
        }

        info!(changed = changes.len(), "Risk reassessment complete");
        Ok(changes)
    }
}
