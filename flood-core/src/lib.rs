//! Flood Watch Core
//!
//! Core types and interfaces for the crowdsourced flood reporting service.
//!
//! - Report lifecycle types (`Pending` → `Validated` | `Rejected`) and the
//!   immutable review audit trail
//! - Ward, risk level and historical flood reference data
//! - Ledger traits implemented by the storage layer
//! - Submission validation, ward geometry lookup and the GeoJSON map model
//! - The `Mailer` transport trait used by the notification dispatcher

pub mod constants;
pub mod error;
pub mod geo;
pub mod geojson;
pub mod ledger;
pub mod mailer;
pub mod types;
pub mod validation;

pub use constants::*;
pub use error::*;
pub use types::*;
