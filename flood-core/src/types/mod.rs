//! Flood Watch domain types

pub mod alert;
pub mod common;
pub mod history;
pub mod notification;
pub mod report;
pub mod user;
pub mod ward;

pub use alert::*;
pub use common::*;
pub use history::*;
pub use notification::*;
pub use report::*;
pub use user::*;
pub use ward::*;
