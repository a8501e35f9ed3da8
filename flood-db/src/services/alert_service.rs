//! Batch alerting: ward flood alerts and the authority daily summary

use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use tracing::info;

use flood_core::ledger::{ReportLedger, WardRegistry};
use flood_core::{
    AlertRecord, DailySummary, FloodError, FloodResult, ReportStatus, RiskLevel, WardId,
};

use super::notification_service::{DispatchReport, NotificationService};
use crate::store::FloodStore;

pub struct AlertService {
    store: Arc<FloodStore>,
    notifier: Arc<NotificationService>,
}

impl AlertService {
    pub fn new(store: Arc<FloodStore>, notifier: Arc<NotificationService>) -> Self {
        Self { store, notifier }
    }

    /// Record a ward alert and broadcast it to every active user
    pub async fn send_alert(
        &self,
        ward_id: WardId,
        risk_level: RiskLevel,
        message: Option<String>,
    ) -> FloodResult<(AlertRecord, DispatchReport)> {
        let ward = self
            .store
            .get_ward(ward_id)
            .await?
            .ok_or_else(|| FloodError::not_found(format!("ward {}", ward_id)))?;

        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("Flood alert: {} risk reported in {}", risk_level, ward.name));

        let alert = self
            .store
            .record_alert(ward_id, risk_level, message)
            .await?;
        let outcome = self.notifier.flood_alert(&ward, &alert).await;

        info!(
            ward_id = %ward_id,
            risk_level = %risk_level,
            sent = outcome.sent,
            failed = outcome.failed,
            "Flood alert broadcast"
        );
        Ok((alert, outcome))
    }

    /// Alert every ward whose current risk is at or above `min_level`.
    /// Each alert carries the ward's own level. No matching ward is not an
    /// error; the result is empty.
    pub async fn send_risk_alerts(
        &self,
        min_level: RiskLevel,
        message: Option<String>,
    ) -> FloodResult<Vec<(AlertRecord, DispatchReport)>> {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        let wards: Vec<_> = self
            .store
            .list_wards()
            .await?
            .into_iter()
            .filter(|w| w.current_risk_level >= min_level)
            .collect();

        if wards.is_empty() {
            info!(min_level = %min_level, "No wards at alert risk level");
        }

        let mut sent = Vec::with_capacity(wards.len());
        for ward in wards {
            let level = ward.current_risk_level;
            let text = message.clone().unwrap_or_else(|| {
                format!(
                    "Flood risk is currently {} in {}. Please take necessary precautions.",
                    level, ward.name
                )
            });
            let alert = self.store.record_alert(ward.ward_id, level, text).await?;
            let outcome = self.notifier.flood_alert(&ward, &alert).await;

            info!(
                ward_id = %ward.ward_id,
                risk_level = %level,
                sent = outcome.sent,
                failed = outcome.failed,
                "Flood alert broadcast"
            );
            sent.push((alert, outcome));
        }
        Ok(sent)
    }

    /// Gather the summary for `today` without sending it
    pub async fn build_daily_summary(&self, today: NaiveDate) -> FloodResult<DailySummary> {
        let yesterday = today - Duration::days(1);

        let pending_reports = self.store.status_counts().await?.pending;
        let validated_yesterday = self
            .store
            .list_reports(Some(ReportStatus::Validated), usize::MAX)
            .await?
            .iter()
            .filter(|r| r.created_at.date_naive() == yesterday)
            .count() as u64;

        let mut summary = DailySummary {
            date: today,
            pending_reports,
            validated_yesterday,
            high_risk_wards: 0,
            medium_risk_wards: 0,
            low_risk_wards: 0,
        };
        for ward in self.store.list_wards().await? {
            match ward.current_risk_level {
                RiskLevel::High => summary.high_risk_wards += 1,
                RiskLevel::Medium => summary.medium_risk_wards += 1,
                RiskLevel::Low => summary.low_risk_wards += 1,
            }
        }

        Ok(summary)
    }

    /// Send the daily summary to all active authorities
    pub async fn daily_summary(
        &self,
        today: NaiveDate,
    ) -> FloodResult<(DailySummary, DispatchReport)> {
        let summary = self.build_daily_summary(today).await?;
        let outcome = self.notifier.daily_summary(&summary).await;

        info!(
            date = %summary.date,
            pending = summary.pending_reports,
            sent = outcome.sent,
            "Daily summary sent"
        );
        Ok((summary, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::MemoryMailer;
    use chrono::Utc;
    use flood_core::ledger::UserDirectory;
    use flood_core::{Role, UserId, UserRecord, WardRecord};

    async fn setup() -> (Arc<FloodStore>, Arc<MemoryMailer>, AlertService) {
        let store = Arc::new(FloodStore::in_memory().await.unwrap());
        let mailer = Arc::new(MemoryMailer::new());
        let notifier = Arc::new(NotificationService::new(
            store.clone(),
            mailer.clone(),
            "http://localhost:8000",
        ));
        store
            .upsert_ward(WardRecord::new(WardId(5), "Mathare", serde_json::Value::Null))
            .await
            .unwrap();
        store
            .upsert_user(
                UserRecord::new(UserId::new("a"), "officer", Role::Authority)
                    .with_email("officer@example.com"),
            )
            .await
            .unwrap();
        store
            .upsert_user(
                UserRecord::new(UserId::new("r"), "resident", Role::Resident)
                    .with_email("resident@example.com"),
            )
            .await
            .unwrap();
        let mut inactive = UserRecord::new(UserId::new("x"), "gone", Role::Resident)
            .with_email("gone@example.com");
        inactive.is_active = false;
        store.upsert_user(inactive).await.unwrap();

        (store.clone(), mailer, AlertService::new(store, notifier))
    }

    #[tokio::test]
    async fn test_send_alert_default_message() {
        let (store, mailer, service) = setup().await;

        let (alert, outcome) = service
            .send_alert(WardId(5), RiskLevel::High, None)
            .await
            .unwrap();

        assert_eq!(alert.message, "Flood alert: High risk reported in Mathare");
        assert_eq!(outcome.sent, 2);
        assert!(mailer.sent_to("gone@example.com").await.is_empty());
        assert_eq!(store.list_alerts(Some(WardId(5)), 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_alert_unknown_ward() {
        let (_store, _mailer, service) = setup().await;
        let err = service
            .send_alert(WardId(99), RiskLevel::Medium, Some("check drains".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, FloodError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_risk_alerts_cover_wards_at_or_above_level() {
        let (store, mailer, service) = setup().await;
        store
            .upsert_ward(WardRecord::new(WardId(6), "Kibera", serde_json::Value::Null))
            .await
            .unwrap();
        store
            .upsert_ward(WardRecord::new(WardId(7), "Kibra", serde_json::Value::Null))
            .await
            .unwrap();
        store.set_risk_level(WardId(6), RiskLevel::High).await.unwrap();
        store.set_risk_level(WardId(7), RiskLevel::Medium).await.unwrap();

        let high = service.send_risk_alerts(RiskLevel::High, None).await.unwrap();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].0.ward_id, WardId(6));
        assert_eq!(
            high[0].0.message,
            "Flood risk is currently High in Kibera. Please take necessary precautions."
        );
        assert_eq!(high[0].1.sent, 2);

        let medium = service
            .send_risk_alerts(RiskLevel::Medium, Some("Avoid the river paths".into()))
            .await
            .unwrap();
        let alerted: Vec<_> = medium.iter().map(|(a, _)| (a.ward_id, a.risk_level)).collect();
        assert_eq!(
            alerted,
            vec![(WardId(6), RiskLevel::High), (WardId(7), RiskLevel::Medium)]
        );
        assert!(medium.iter().all(|(a, _)| a.message == "Avoid the river paths"));

        assert!(store.list_alerts(Some(WardId(5)), 10).await.unwrap().is_empty());
        assert_eq!(mailer.sent_to("resident@example.com").await.len(), 3);
    }

    #[tokio::test]
    async fn test_risk_alerts_without_matching_wards() {
        let (store, mailer, service) = setup().await;
        let sent = service.send_risk_alerts(RiskLevel::High, None).await.unwrap();
        assert!(sent.is_empty());
        assert!(store.list_alerts(None, 10).await.unwrap().is_empty());
        assert!(mailer.outbox().await.is_empty());
    }

    #[tokio::test]
    async fn test_daily_summary_to_authorities() {
        let (_store, mailer, service) = setup().await;
        let today = Utc::now().date_naive();

        let (summary, outcome) = service.daily_summary(today).await.unwrap();
        assert_eq!(summary.low_risk_wards, 1);
        assert_eq!(summary.pending_reports, 0);
        assert_eq!(outcome.sent, 1);

        let outbox = mailer.outbox().await;
        assert_eq!(outbox[0].to, "officer@example.com");
        assert!(outbox[0].subject.starts_with("Daily Flood Summary"));
    }
}
