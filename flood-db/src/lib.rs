//! Flood Watch storage layer
//!
//! `FloodStore` implements the `flood-core` ledger traits on top of a SQLite
//! database shared by the API server and the batch CLI. The domain services
//! built on it are:
//!
//! - `ReportLifecycleService` - submission, review, visibility, votes
//! - `RiskService` - ward risk levels, escalation alerts, historical statistics
//! - `NotificationService` - routed, fire-and-forget email notifications
//! - `MapService` - GeoJSON ward feed
//! - `AlertService` - ward alert broadcast and daily summary
//!
//! # Usage
//!
//! ```ignore
//! use flood_db::{FloodStore, MailerConfig, NotificationService};
//! use std::sync::Arc;
//!
//! async fn example() {
//!     let store = Arc::new(FloodStore::open("./data").await.unwrap());
//!     let config = MailerConfig::from_env();
//!     let notifier = NotificationService::new(store, config.build().unwrap(), &config.site_url);
//! }
//! ```

pub mod error;
pub mod mailer;
pub mod schema;
pub mod services;
pub mod store;

pub use error::{DbError, DbResult};
pub use mailer::{ConsoleMailer, MailerConfig, MemoryMailer, ResendMailer};
pub use services::{
    AlertService, DispatchReport, MapService, NotificationContext, NotificationService,
    ReportLifecycleService, RiskPolicy, RiskService, RiskThresholds,
};
pub use store::FloodStore;
