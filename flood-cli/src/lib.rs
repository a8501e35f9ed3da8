//! Flood Watch CLI
//!
//! ```text
//! flood [OPTIONS] <COMMAND>
//!
//! Commands:
//!   serve           Start the API server
//!   send-alert      Record a ward alert and email it to every active user
//!   daily-summary   Email the daily digest to authorities
//!   set-risk        Set a ward's risk level
//!   reassess        Reclassify wards from historical data
//!   load-wards      Load wards from a GeoJSON FeatureCollection
//!   import-history  Import historical flood events and yearly statistics
//!   create-user     Create or update a user
//!   issue-token     Mint a bearer token
//! ```
//!
//! Configuration is read from the environment (and `.env`); flags override it.

pub mod commands;
pub mod error;
pub mod handler;

pub use commands::{Cli, Commands, OutputFormat};
pub use error::{CliError, CliResult};
