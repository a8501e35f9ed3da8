//! CLI command definitions

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use flood_core::{RiskLevel, Role};

/// Flood Watch command line
#[derive(Parser, Debug)]
#[command(name = "flood")]
#[command(version)]
#[command(about = "Flood Watch server, batch alerts and administration")]
pub struct Cli {
    /// Data directory holding the store database and media
    #[arg(short, long, env = "FLOOD_DATA_PATH", default_value = flood_api::DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "plain")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    /// Human-readable
    #[default]
    Plain,
}

/// Ward risk level argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RiskArg {
    High,
    Medium,
    Low,
}

impl From<RiskArg> for RiskLevel {
    fn from(arg: RiskArg) -> Self {
        match arg {
            RiskArg::High => RiskLevel::High,
            RiskArg::Medium => RiskLevel::Medium,
            RiskArg::Low => RiskLevel::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Resident,
    Authority,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Resident => Role::Resident,
            RoleArg::Authority => Role::Authority,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Manual,
    Automatic,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API server
    Serve {
        #[arg(short = 'H', long, env = "FLOOD_BIND_ADDR", default_value = "0.0.0.0")]
        host: String,
        #[arg(short, long, env = "FLOOD_PORT", default_value_t = flood_api::DEFAULT_PORT)]
        port: u16,
    },

    /// Record ward alerts and email them to every active user
    ///
    /// With `--ward`, alerts that ward at `--risk-level`. Without it, alerts
    /// every ward whose current risk is `--risk-level` or above.
    SendAlert {
        /// Ward ID
        #[arg(short, long)]
        ward: Option<u64>,
        /// Alert level for `--ward`, otherwise the minimum ward risk to alert
        #[arg(short, long, value_enum, default_value = "high")]
        risk_level: RiskArg,
        /// Custom message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Email the daily digest to authorities
    DailySummary {
        /// Summary date (default: today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Set a ward's risk level; escalation to High alerts subscribers
    SetRisk {
        #[arg(short, long)]
        ward: u64,
        #[arg(short, long, value_enum)]
        level: RiskArg,
    },

    /// Reclassify wards from historical data
    Reassess {
        #[arg(long, value_enum, env = "FLOOD_RISK_POLICY", default_value = "manual")]
        policy: PolicyArg,
    },

    /// Load wards from a GeoJSON FeatureCollection
    LoadWards {
        /// Path to the GeoJSON file
        file: PathBuf,
    },

    /// Import historical flood events and yearly ward statistics
    ImportHistory {
        /// JSON file with `events` and `year_stats` arrays
        file: PathBuf,
    },

    /// Create or update a user
    CreateUser {
        /// User ID; also the `sub` of issued tokens
        #[arg(long)]
        id: String,
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long, value_enum, default_value = "resident")]
        role: RoleArg,
        /// Ward IDs to subscribe to
        #[arg(long, value_delimiter = ',')]
        subscribe: Vec<u64>,
    },

    /// Delete email log entries older than the retention window
    PruneEmailLog {
        /// Days of history to keep
        #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,
    },

    /// Mint a bearer token signed with FLOOD_JWT_SECRET
    IssueToken {
        #[arg(long)]
        user: String,
        #[arg(short, long, value_enum, default_value = "resident")]
        role: RoleArg,
        /// Validity in hours
        #[arg(long, default_value_t = 24)]
        ttl_hours: u64,
    },
}
