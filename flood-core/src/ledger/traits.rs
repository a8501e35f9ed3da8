//! Ledger Traits
//!
//! Trait definitions for Flood Watch persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FloodResult;
use crate::types::{
    AlertRecord, EmailLogEntry, HistoricalFloodEvent, ReportAction, ReportDraft, ReportId,
    ReportRecord, ReportStatus, ReviewDecision, RiskChange, RiskLevel, Role, StatusCounts,
    UserId, UserRecord, Vote, VoteTally, WardId, WardRecord, WardYearStats,
};

/// Report Ledger - crowd reports and their review audit trail
#[async_trait]
pub trait ReportLedger: Send + Sync {
    /// Persist a validated submission as a new `Pending` report
    async fn insert_report(&self, draft: ReportDraft) -> FloodResult<ReportRecord>;

    /// Get report by ID
    async fn get_report(&self, report_id: ReportId) -> FloodResult<Option<ReportRecord>>;

    /// List reports, newest first, optionally filtered by status
    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        limit: usize,
    ) -> FloodResult<Vec<ReportRecord>>;

    /// Record a review and move the report to its terminal status.
    ///
    /// The status check, status update and action insert happen as one
    /// atomic step. Fails with `NotFound` for an unknown report and
    /// `InvalidStateTransition` when the report is no longer `Pending`.
    async fn record_review(
        &self,
        report_id: ReportId,
        admin_id: &UserId,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> FloodResult<(ReportRecord, ReportAction)>;

    /// Review actions recorded for a report (zero or one)
    async fn actions_for_report(&self, report_id: ReportId) -> FloodResult<Vec<ReportAction>>;

    /// Record `voter`'s vote, replacing any earlier vote by the same user,
    /// and return the recomputed counters
    async fn apply_vote(
        &self,
        report_id: ReportId,
        voter: &UserId,
        vote: Vote,
    ) -> FloodResult<VoteTally>;

    /// Count reports per status
    async fn status_counts(&self) -> FloodResult<StatusCounts>;
}

/// Ward Registry - ward geometry, risk levels and issued alerts
#[async_trait]
pub trait WardRegistry: Send + Sync {
    /// All wards ordered by ID
    async fn list_wards(&self) -> FloodResult<Vec<WardRecord>>;

    async fn get_ward(&self, ward_id: WardId) -> FloodResult<Option<WardRecord>>;

    /// Insert or replace a ward
    async fn upsert_ward(&self, ward: WardRecord) -> FloodResult<()>;

    /// Set a ward's risk level, returning the previous and new level
    async fn set_risk_level(&self, ward_id: WardId, level: RiskLevel) -> FloodResult<RiskChange>;

    /// Record a broadcast alert for a ward
    async fn record_alert(
        &self,
        ward_id: WardId,
        risk_level: RiskLevel,
        message: String,
    ) -> FloodResult<AlertRecord>;

    /// Alerts, newest first, optionally for a single ward
    async fn list_alerts(&self, ward_id: Option<WardId>, limit: usize)
        -> FloodResult<Vec<AlertRecord>>;
}

/// Flood History - immutable historical reference data
#[async_trait]
pub trait FloodHistory: Send + Sync {
    async fn add_event(&self, event: HistoricalFloodEvent) -> FloodResult<()>;

    /// Historical events, most recent first, optionally limited to a ward
    async fn events(&self, ward_id: Option<WardId>) -> FloodResult<Vec<HistoricalFloodEvent>>;

    async fn upsert_year_stats(&self, stats: WardYearStats) -> FloodResult<()>;

    /// Yearly statistics for a ward, most recent year first
    async fn year_stats(&self, ward_id: WardId) -> FloodResult<Vec<WardYearStats>>;
}

/// User Directory - users, roles and ward subscriptions
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, user_id: &UserId) -> FloodResult<Option<UserRecord>>;

    async fn upsert_user(&self, user: UserRecord) -> FloodResult<()>;

    async fn list_users(&self) -> FloodResult<Vec<UserRecord>>;

    /// Active users holding the authority role
    async fn active_authorities(&self) -> FloodResult<Vec<UserRecord>> {
        Ok(self
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.is_active && u.role == Role::Authority)
            .collect())
    }

    async fn active_users(&self) -> FloodResult<Vec<UserRecord>> {
        Ok(self
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.is_active)
            .collect())
    }

    /// Active users subscribed to a ward
    async fn ward_subscribers(&self, ward_id: WardId) -> FloodResult<Vec<UserRecord>> {
        Ok(self
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.is_active && u.subscribed_wards.contains(&ward_id))
            .collect())
    }
}

/// Email Log - record of every delivery attempt
#[async_trait]
pub trait EmailLog: Send + Sync {
    async fn record_email(&self, entry: EmailLogEntry) -> FloodResult<()>;

    /// Entries, newest first
    async fn list_emails(&self, limit: usize) -> FloodResult<Vec<EmailLogEntry>>;

    /// Drop entries sent before `cutoff`, returning how many were removed
    async fn prune_emails(&self, cutoff: DateTime<Utc>) -> FloodResult<u64>;
}
