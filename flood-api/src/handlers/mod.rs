//! Flood Watch API Handlers

pub mod alerts;
pub mod health;
pub mod reports;
pub mod wards;

pub use alerts::*;
pub use health::*;
pub use reports::*;
pub use wards::*;
