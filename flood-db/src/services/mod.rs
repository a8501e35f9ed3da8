//! Flood Watch domain services
//!
//! Services own the business rules and sit on top of `FloodStore`.

pub mod alert_service;
pub mod lifecycle_service;
pub mod map_service;
pub mod notification_service;
pub mod risk_service;
pub mod templates;

pub use alert_service::AlertService;
pub use lifecycle_service::ReportLifecycleService;
pub use map_service::MapService;
pub use notification_service::{
    DispatchReport, NotificationContext, NotificationService, RecipientScope, Route, RouteTable,
};
pub use risk_service::{RiskPolicy, RiskService, RiskThresholds};
pub use templates::Template;
