//! Report Lifecycle Manager
//!
//! Submission, review and read access for crowd reports. A report starts
//! `Pending` and moves once to `Validated` or `Rejected`; the move and its
//! audit action are written together by the store.

use std::sync::Arc;
use tracing::{debug, info, warn};

use flood_core::geo::geometry_contains;
use flood_core::ledger::{ReportLedger, UserDirectory, WardRegistry};
use flood_core::validation::SubmissionRules;
use flood_core::{
    Coordinates, FloodError, FloodResult, NewReport, ReportAction, ReportDraft, ReportId,
    ReportRecord, ReportStatus, ReviewDecision, StatusCounts, UserId, UserRecord, Vote, VoteTally, WardId,
};

use super::notification_service::NotificationService;
use crate::store::FloodStore;

/// Report Lifecycle Manager
pub struct ReportLifecycleService {
    store: Arc<FloodStore>,
    notifier: Arc<NotificationService>,
    rules: SubmissionRules,
}

impl ReportLifecycleService {
    pub fn new(store: Arc<FloodStore>, notifier: Arc<NotificationService>) -> Self {
        Self {
            store,
            notifier,
            rules: SubmissionRules::default(),
        }
    }

    async fn active_user(&self, user_id: &UserId) -> FloodResult<Option<UserRecord>> {
        Ok(self
            .store
            .get_user(user_id)
            .await?
            .filter(|u| u.is_active))
    }

    async fn resolve_ward(&self, point: &Coordinates) -> FloodResult<Option<WardId>> {
        Ok(self
            .store
            .list_wards()
            .await?
            .into_iter()
            .find(|w| geometry_contains(&w.geometry, point))
            .map(|w| w.ward_id))
    }

    /// Submit a new report. Nothing is stored when validation fails.
    pub async fn submit(&self, submission: NewReport) -> FloodResult<ReportRecord> {
        let coordinates = self.rules.validate(&submission)?;

        let reporter = self
            .active_user(&submission.reporter_id)
            .await?
            .ok_or_else(|| FloodError::unauthorized("reporter is not an active user"))?;

        let ward_id = self.resolve_ward(&coordinates).await?;

        let record = self
            .store
            .insert_report(ReportDraft {
                reporter_id: submission.reporter_id,
                ward_id,
                location: submission.location.trim().to_string(),
                coordinates,
                description: submission.description.trim().to_string(),
                photo: submission.photo,
            })
            .await?;

        info!(
            report_id = %record.report_id,
            reporter = %record.reporter_id,
            ward_id = ?record.ward_id,
            has_photo = record.photo.is_some(),
            "Report submitted"
        );

        self.notifier
            .report_submitted(&record, Some(&reporter))
            .await;

        Ok(record)
    }

    /// Validate or reject a pending report
    pub async fn review(
        &self,
        report_id: ReportId,
        actor: &UserId,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> FloodResult<ReportAction> {
        let is_authority = self
            .active_user(actor)
            .await?
            .map(|u| u.is_authority())
            .unwrap_or(false);
        if !is_authority {
            warn!(report_id = %report_id, actor = %actor, "Review attempted without authority role");
            return Err(FloodError::unauthorized("only authorities can review reports"));
        }

        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let (record, action) = self
            .store
            .record_review(report_id, actor, decision, notes)
            .await?;

        info!(
            report_id = %report_id,
            action_id = %action.action_id,
            actor = %actor,
            status = %record.status,
            "Report reviewed"
        );

        let reporter = self.store.get_user(&record.reporter_id).await.unwrap_or_else(|e| {
            warn!(report_id = %report_id, error = %e, "Failed to load reporter for notification");
            None
        });
        self.notifier
            .report_reviewed(&record, &action, reporter.as_ref())
            .await;

        Ok(action)
    }

    /// A report as seen by `viewer`: its owner or any authority
    pub async fn get(&self, report_id: ReportId, viewer: &UserId) -> FloodResult<ReportRecord> {
        let report = self
            .store
            .get_report(report_id)
            .await?
            .ok_or_else(|| FloodError::not_found(format!("report {}", report_id)))?;

        let is_authority = self
            .active_user(viewer)
            .await?
            .map(|u| u.is_authority())
            .unwrap_or(false);

        if !report.visible_to(viewer, is_authority) {
            return Err(FloodError::unauthorized("report belongs to another user"));
        }
        Ok(report)
    }

    pub async fn list(
        &self,
        status: Option<ReportStatus>,
        limit: usize,
    ) -> FloodResult<Vec<ReportRecord>> {
        self.store.list_reports(status, limit).await
    }

    pub async fn actions(&self, report_id: ReportId) -> FloodResult<Vec<ReportAction>> {
        self.store.actions_for_report(report_id).await
    }

    pub async fn status_counts(&self) -> FloodResult<StatusCounts> {
        self.store.status_counts().await
    }

    /// Record `voter`'s vote on a report they can see. A later vote by the
    /// same user replaces the earlier one.
    pub async fn vote(
        &self,
        report_id: ReportId,
        voter: &UserId,
        vote: Vote,
    ) -> FloodResult<VoteTally> {
        self.get(report_id, voter).await?;
        let tally = self.store.apply_vote(report_id, voter, vote).await?;
        debug!(
            report_id = %report_id,
            voter = %voter,
            upvotes = tally.upvotes,
            downvotes = tally.downvotes,
            "Vote recorded"
        );
        Ok(tally)
    }
}
