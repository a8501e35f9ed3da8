//! Domain constants

/// Maximum accepted photo attachment size (5 MiB)
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Reliability score assigned to a freshly submitted report
pub const DEFAULT_RELIABILITY_SCORE: f64 = 0.5;

/// Service area (Nairobi) latitude bounds, exclusive
pub const SERVICE_AREA_MIN_LAT: f64 = -1.5;
pub const SERVICE_AREA_MAX_LAT: f64 = -0.8;

/// Service area (Nairobi) longitude bounds, exclusive
pub const SERVICE_AREA_MIN_LON: f64 = 36.5;
pub const SERVICE_AREA_MAX_LON: f64 = 37.2;

/// Risk probability (percent) above which a ward is High risk
pub const HIGH_RISK_THRESHOLD: f64 = 70.0;

/// Risk probability (percent) at or above which a ward is Medium risk
pub const MEDIUM_RISK_THRESHOLD: f64 = 40.0;

/// Number of recorded floods at which the historical probability saturates
pub const FLOOD_COUNT_SATURATION: f64 = 10.0;

/// Maximum characters of report text quoted in authority notifications
pub const NOTIFICATION_EXCERPT_CHARS: usize = 100;
