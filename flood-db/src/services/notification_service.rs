//! Notification Dispatcher
//!
//! Maps lifecycle and alert events to email templates and recipient scopes
//! through a route table. Delivery is fire-and-forget: each attempt is
//! logged and written to the email log, and no failure propagates to the
//! caller.

use chrono::Utc;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use flood_core::ledger::{EmailLog, UserDirectory};
use flood_core::mailer::{EmailMessage, Mailer};
use flood_core::{
    AlertRecord, DailySummary, DeliveryStatus, EmailLogEntry, EventKind, RecipientKind,
    ReportAction, ReportId, ReportRecord, ReviewDecision, Role, UserRecord, WardId, WardRecord,
};

use super::templates::{self, Template};
use crate::store::FloodStore;

/// Who receives a routed notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipientScope {
    /// The submitter of the report in context
    Reporter,
    AllAuthorities,
    AllActiveUsers,
    /// Active users subscribed to the ward in context
    WardSubscribers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub template: Template,
    pub scope: RecipientScope,
}

impl Route {
    pub const fn new(template: Template, scope: RecipientScope) -> Self {
        Self { template, scope }
    }
}

/// Event kind → routes
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<EventKind, Vec<Route>>,
}

impl Default for RouteTable {
    fn default() -> Self {
        use RecipientScope::*;

        let mut routes = HashMap::new();
        routes.insert(
            EventKind::ReportSubmitted,
            vec![
                Route::new(Template::ReportConfirmation, Reporter),
                Route::new(Template::NewReportNotice, AllAuthorities),
            ],
        );
        routes.insert(
            EventKind::ReportValidated,
            vec![Route::new(Template::ReportValidated, Reporter)],
        );
        routes.insert(
            EventKind::ReportRejected,
            vec![Route::new(Template::ReportRejected, Reporter)],
        );
        routes.insert(
            EventKind::FloodAlert,
            vec![Route::new(Template::FloodAlert, AllActiveUsers)],
        );
        routes.insert(
            EventKind::DailySummary,
            vec![Route::new(Template::DailySummary, AllAuthorities)],
        );
        routes.insert(
            EventKind::RiskEscalated,
            vec![Route::new(Template::RiskEscalation, WardSubscribers)],
        );

        Self { routes }
    }
}

impl RouteTable {
    /// A table with no routes
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    pub fn routes(&self, event: EventKind) -> &[Route] {
        self.routes.get(&event).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn with_route(mut self, event: EventKind, route: Route) -> Self {
        self.routes.entry(event).or_default().push(route);
        self
    }
}

/// Data available to templates and recipient resolution
#[derive(Debug, Clone, Default)]
pub struct NotificationContext {
    pub report: Option<ReportRecord>,
    pub action: Option<ReportAction>,
    pub reporter: Option<UserRecord>,
    pub ward: Option<WardRecord>,
    pub alert: Option<AlertRecord>,
    pub summary: Option<DailySummary>,
}

impl NotificationContext {
    pub fn for_report(report: &ReportRecord, reporter: Option<&UserRecord>) -> Self {
        Self {
            report: Some(report.clone()),
            reporter: reporter.cloned(),
            ..Default::default()
        }
    }

    pub fn for_alert(ward: &WardRecord, alert: &AlertRecord) -> Self {
        Self {
            ward: Some(ward.clone()),
            alert: Some(alert.clone()),
            ..Default::default()
        }
    }

    fn ward_id(&self) -> Option<WardId> {
        self.ward
            .as_ref()
            .map(|w| w.ward_id)
            .or_else(|| self.alert.as_ref().map(|a| a.ward_id))
    }
}

/// Outcome counts of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub sent: u32,
    pub failed: u32,
    /// Recipients without an email address
    pub skipped: u32,
}

impl DispatchReport {
    pub fn merge(&mut self, other: DispatchReport) {
        self.sent += other.sent;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// Notification Dispatcher
pub struct NotificationService {
    store: Arc<FloodStore>,
    mailer: Arc<dyn Mailer>,
    routes: RouteTable,
    site_url: String,
}

impl NotificationService {
    pub fn new(store: Arc<FloodStore>, mailer: Arc<dyn Mailer>, site_url: impl Into<String>) -> Self {
        Self {
            store,
            mailer,
            routes: RouteTable::default(),
            site_url: site_url.into(),
        }
    }

    pub fn mailer_name(&self) -> &'static str {
        self.mailer.name()
    }

    /// Dispatch `event` to every route registered for it
    pub async fn send(&self, event: EventKind, ctx: &NotificationContext) -> DispatchReport {
        let mut outcome = DispatchReport::default();
        let related_report = ctx.report.as_ref().map(|r| r.report_id);

        for route in self.routes.routes(event) {
            for recipient in self.resolve(route.scope, ctx).await {
                let Some(address) = recipient.contact_email() else {
                    debug!(user_id = %recipient.user_id, event = %event, "Recipient has no email, skipping");
                    outcome.skipped += 1;
                    continue;
                };

                let Some(message) =
                    templates::render(route.template, ctx, &recipient, address, &self.site_url)
                else {
                    warn!(event = %event, template = ?route.template, "Notification context incomplete");
                    outcome.failed += 1;
                    continue;
                };

                let kind = match recipient.role {
                    Role::Authority => RecipientKind::Authority,
                    Role::Resident => RecipientKind::User,
                };

                if self.deliver(event, kind, message, related_report).await {
                    outcome.sent += 1;
                } else {
                    outcome.failed += 1;
                }
            }
        }

        info!(
            event = %event,
            sent = outcome.sent,
            failed = outcome.failed,
            skipped = outcome.skipped,
            "Notification dispatched"
        );
        outcome
    }

    pub async fn report_submitted(
        &self,
        report: &ReportRecord,
        reporter: Option<&UserRecord>,
    ) -> DispatchReport {
        self.send(
            EventKind::ReportSubmitted,
            &NotificationContext::for_report(report, reporter),
        )
        .await
    }

    pub async fn report_reviewed(
        &self,
        report: &ReportRecord,
        action: &ReportAction,
        reporter: Option<&UserRecord>,
    ) -> DispatchReport {
        let event = match action.decision {
            ReviewDecision::Validate => EventKind::ReportValidated,
            ReviewDecision::Reject => EventKind::ReportRejected,
        };
        let ctx = NotificationContext {
            action: Some(action.clone()),
            ..NotificationContext::for_report(report, reporter)
        };
        self.send(event, &ctx).await
    }

    pub async fn flood_alert(&self, ward: &WardRecord, alert: &AlertRecord) -> DispatchReport {
        self.send(EventKind::FloodAlert, &NotificationContext::for_alert(ward, alert))
            .await
    }

    pub async fn risk_escalated(&self, ward: &WardRecord, alert: &AlertRecord) -> DispatchReport {
        self.send(EventKind::RiskEscalated, &NotificationContext::for_alert(ward, alert))
            .await
    }

    pub async fn daily_summary(&self, summary: &DailySummary) -> DispatchReport {
        let ctx = NotificationContext {
            summary: Some(summary.clone()),
            ..Default::default()
        };
        self.send(EventKind::DailySummary, &ctx).await
    }

    async fn resolve(&self, scope: RecipientScope, ctx: &NotificationContext) -> Vec<UserRecord> {
        let result = match scope {
            RecipientScope::Reporter => return ctx.reporter.iter().cloned().collect(),
            RecipientScope::AllAuthorities => self.store.active_authorities().await,
            RecipientScope::AllActiveUsers => self.store.active_users().await,
            RecipientScope::WardSubscribers => match ctx.ward_id() {
                Some(ward_id) => self.store.ward_subscribers(ward_id).await,
                None => return Vec::new(),
            },
        };

        result.unwrap_or_else(|e| {
            warn!(scope = ?scope, error = %e, "Failed to resolve notification recipients");
            Vec::new()
        })
    }

    async fn deliver(
        &self,
        event: EventKind,
        recipient_kind: RecipientKind,
        message: EmailMessage,
        related_report: Option<ReportId>,
    ) -> bool {
        let (status, error_message) = match self.mailer.send(&message).await {
            Ok(message_id) => {
                debug!(to = %message.to, message_id = %message_id, "Email sent");
                (DeliveryStatus::Sent, String::new())
            }
            Err(e) => {
                warn!(
                    to = %message.to,
                    event = %event,
                    transport = self.mailer.name(),
                    error = %e,
                    "Email delivery failed"
                );
                (DeliveryStatus::Failed, e.to_string())
            }
        };

        let status_label = match status {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        };
        counter!("flood_emails_total", "event" => event.as_str(), "status" => status_label)
            .increment(1);

        let entry = EmailLogEntry {
            recipient_email: message.to,
            recipient_kind,
            subject: message.subject,
            event,
            related_report,
            sent_at: Utc::now(),
            status,
            error_message,
        };
        if let Err(e) = self.store.record_email(entry).await {
            warn!(error = %e, "Failed to record email log entry");
        }

        status == DeliveryStatus::Sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::MemoryMailer;
    use flood_core::ledger::WardRegistry;
    use flood_core::{Coordinates, ReportStatus, UserId, DEFAULT_RELIABILITY_SCORE};

    fn report() -> ReportRecord {
        ReportRecord {
            report_id: ReportId(3),
            reporter_id: UserId::new("res"),
            ward_id: None,
            location: "South B".to_string(),
            coordinates: Coordinates::new(-1.31, 36.84),
            description: "Ngong river overflowing".to_string(),
            photo: None,
            status: ReportStatus::Pending,
            created_at: Utc::now(),
            upvotes: 0,
            downvotes: 0,
            reliability_score: DEFAULT_RELIABILITY_SCORE,
        }
    }

    async fn setup(mailer: MemoryMailer) -> (Arc<FloodStore>, Arc<MemoryMailer>, NotificationService) {
        let store = Arc::new(FloodStore::in_memory().await.unwrap());
        let mailer = Arc::new(mailer);
        let service = NotificationService::new(store.clone(), mailer.clone(), "http://localhost:8000");
        (store, mailer, service)
    }

    #[test]
    fn test_default_routes() {
        let table = RouteTable::default();
        let submitted = table.routes(EventKind::ReportSubmitted);
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[1].scope, RecipientScope::AllAuthorities);
        assert!(RouteTable::empty().routes(EventKind::FloodAlert).is_empty());
    }

    #[tokio::test]
    async fn test_submission_reaches_reporter_and_authorities() {
        let (store, mailer, service) = setup(MemoryMailer::new()).await;
        let reporter =
            UserRecord::new(UserId::new("res"), "amina", Role::Resident).with_email("amina@example.com");
        store
            .upsert_user(
                UserRecord::new(UserId::new("auth"), "officer", Role::Authority)
                    .with_email("officer@example.com"),
            )
            .await
            .unwrap();
        // Authority without email
        store
            .upsert_user(UserRecord::new(UserId::new("auth2"), "night-shift", Role::Authority))
            .await
            .unwrap();

        let outcome = service.report_submitted(&report(), Some(&reporter)).await;
        assert_eq!(outcome, DispatchReport { sent: 2, failed: 0, skipped: 1 });

        let to_reporter = mailer.sent_to("amina@example.com").await;
        assert_eq!(to_reporter[0].subject, "Report Received: #3 - Flood Warning System");
        let to_authority = mailer.sent_to("officer@example.com").await;
        assert_eq!(to_authority[0].subject, "New Flood Report Submitted: #3");

        let log = store.list_emails(10).await.unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|e| e.related_report == Some(ReportId(3))));
    }

    #[tokio::test]
    async fn test_failures_are_logged_not_raised() {
        let (store, _mailer, service) =
            setup(MemoryMailer::new().failing_for("amina@example.com")).await;
        let reporter =
            UserRecord::new(UserId::new("res"), "amina", Role::Resident).with_email("amina@example.com");

        let outcome = service.report_submitted(&report(), Some(&reporter)).await;
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.sent, 0);

        let log = store.list_emails(10).await.unwrap();
        assert_eq!(log[0].status, DeliveryStatus::Failed);
        assert!(log[0].error_message.contains("unavailable"));
    }

    #[tokio::test]
    async fn test_escalation_targets_ward_subscribers() {
        let (store, mailer, service) = setup(MemoryMailer::new()).await;
        let ward = WardRecord::new(WardId(4), "Mukuru", serde_json::Value::Null);
        store.upsert_ward(ward.clone()).await.unwrap();
        store
            .upsert_user(
                UserRecord::new(UserId::new("sub"), "sub", Role::Resident)
                    .with_email("sub@example.com")
                    .subscribe(WardId(4)),
            )
            .await
            .unwrap();
        store
            .upsert_user(
                UserRecord::new(UserId::new("other"), "other", Role::Resident)
                    .with_email("other@example.com"),
            )
            .await
            .unwrap();

        let alert = store
            .record_alert(WardId(4), flood_core::RiskLevel::High, "move now".into())
            .await
            .unwrap();
        let outcome = service.risk_escalated(&ward, &alert).await;

        assert_eq!(outcome.sent, 1);
        let outbox = mailer.outbox().await;
        assert_eq!(outbox[0].to, "sub@example.com");
        assert_eq!(outbox[0].subject, "Flood Alert: High Risk in Mukuru");
    }
}
