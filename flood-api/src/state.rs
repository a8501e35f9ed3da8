//! Application State
//!
//! Shared services for the Flood Watch API. Everything is behind `Arc`, so
//! cloning the state per request is cheap.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use flood_core::mailer::Mailer;
use flood_db::{
    AlertService, FloodStore, MailerConfig, MapService, NotificationService,
    ReportLifecycleService, RiskPolicy, RiskService, RiskThresholds,
};

use crate::middleware::{AuthState, JwtConfig, RbacConfig, RbacState};
use crate::ServerConfig;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FloodStore>,
    pub notifier: Arc<NotificationService>,
    pub lifecycle: Arc<ReportLifecycleService>,
    pub risk: Arc<RiskService>,
    pub map: Arc<MapService>,
    pub alerts: Arc<AlertService>,
    pub auth: AuthState,
    pub rbac: RbacState,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wire the services around an opened store
    pub fn with_store(
        store: Arc<FloodStore>,
        mailer: Arc<dyn Mailer>,
        site_url: &str,
        jwt: JwtConfig,
    ) -> Self {
        let notifier = Arc::new(NotificationService::new(store.clone(), mailer, site_url));

        Self {
            lifecycle: Arc::new(ReportLifecycleService::new(store.clone(), notifier.clone())),
            risk: Arc::new(RiskService::new(store.clone(), notifier.clone())),
            map: Arc::new(MapService::new(store.clone())),
            alerts: Arc::new(AlertService::new(store.clone(), notifier.clone())),
            auth: AuthState::new(jwt),
            rbac: RbacState::new(RbacConfig::default()),
            metrics: None,
            store,
            notifier,
        }
    }

    /// Open the store under `config.data_path` and read the mailer and JWT
    /// settings from the environment
    pub async fn from_config(
        config: &ServerConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let store = Arc::new(FloodStore::open(&config.data_path).await?);
        let mail = MailerConfig::from_env();
        let mailer = mail.build()?;
        let jwt = JwtConfig::try_from_env()?;

        tracing::info!(
            data_path = %config.data_path,
            mailer = mailer.name(),
            risk_policy = ?config.risk_policy,
            "Application state initialized"
        );

        Ok(Self::with_store(store, mailer, &mail.site_url, jwt)
            .with_risk_policy(config.risk_policy, RiskThresholds::default()))
    }

    pub fn with_risk_policy(mut self, policy: RiskPolicy, thresholds: RiskThresholds) -> Self {
        self.risk = Arc::new(
            RiskService::new(self.store.clone(), self.notifier.clone())
                .with_policy(policy, thresholds),
        );
        self
    }

    pub fn with_rbac(mut self, config: RbacConfig) -> Self {
        self.rbac = RbacState::new(config);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
