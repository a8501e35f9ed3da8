//! Structured Logging
//!
//! JSON output for production, pretty output for development.
//!
//! # Configuration
//!
//! - `FLOOD_LOG_LEVEL`: trace | debug | info | warn | error (default: info)
//! - `FLOOD_LOG_FORMAT`: pretty | json | compact (default: pretty)
//! - `RUST_LOG`: full filter directive, overrides the level

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crates whose events are shown at the configured level
const FLOOD_TARGETS: [&str; 4] = ["flood_api", "flood_db", "flood_core", "tower_http"];

/// Log level
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Pretty-printed for development
    #[default]
    Pretty,
    /// JSON for production
    Json,
    /// Compact single-line
    Compact,
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Include source file/line
    pub include_source: bool,
    /// Environment filter string (e.g., "flood_db=debug,tower_http=warn")
    pub filter: Option<String>,
}

impl LogConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("FLOOD_LOG_LEVEL")
                .ok()
                .and_then(|v| LogLevel::parse(&v))
                .unwrap_or_default(),
            format: std::env::var("FLOOD_LOG_FORMAT")
                .ok()
                .and_then(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
            include_source: false,
            filter: std::env::var("RUST_LOG").ok().filter(|f| !f.trim().is_empty()),
        }
    }

    /// JSON output without source locations
    pub fn production() -> Self {
        Self {
            format: LogFormat::Json,
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    fn directives(&self) -> String {
        match &self.filter {
            Some(f) => f.clone(),
            None => FLOOD_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, self.level))
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Install the global subscriber
pub fn init_logging(config: &LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_new(config.directives())?;

    match config.format {
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .json()
                    .with_file(config.include_source)
                    .with_line_number(config.include_source),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .pretty()
                    .with_file(config.include_source)
                    .with_line_number(config.include_source),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .compact()
                    .with_file(config.include_source)
                    .with_line_number(config.include_source),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
