//! Ledger interfaces
//!
//! Storage-facing traits. Implementations must make each mutating call
//! atomic with respect to concurrent callers.

pub mod traits;

pub use traits::*;
