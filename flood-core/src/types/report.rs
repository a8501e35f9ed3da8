//! Crowd report types
//!
//! A report starts `Pending` and moves exactly once to a terminal status
//! (`Validated` or `Rejected`). Each transition is backed by a single
//! immutable [`ReportAction`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{ActionId, ReportId, UserId, WardId};

/// Report status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    Validated,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Validated => "Validated",
            Self::Rejected => "Rejected",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "validated" => Some(Self::Validated),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Terminal statuses admit no further transition
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authority decision on a pending report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Validate,
    Reject,
}

impl ReviewDecision {
    /// Status the report moves to when this decision is recorded
    pub fn target_status(&self) -> ReportStatus {
        match self {
            Self::Validate => ReportStatus::Validated,
            Self::Reject => ReportStatus::Rejected,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "validate" | "validated" => Some(Self::Validate),
            "reject" | "rejected" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// WGS84 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Raw photo as uploaded by the resident
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Stored photo metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoAttachment {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    /// Path relative to the media root, when persisted to disk
    pub stored_path: Option<String>,
}

/// Report submission as received from a resident
#[derive(Debug, Clone)]
pub struct NewReport {
    pub reporter_id: UserId,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub description: String,
    pub photo: Option<PhotoUpload>,
}

/// Validated submission handed to the ledger for persistence
#[derive(Debug, Clone)]
pub struct ReportDraft {
    pub reporter_id: UserId,
    pub ward_id: Option<WardId>,
    pub location: String,
    pub coordinates: Coordinates,
    pub description: String,
    pub photo: Option<PhotoUpload>,
}

/// Persisted crowd report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub report_id: ReportId,
    pub reporter_id: UserId,
    pub ward_id: Option<WardId>,
    pub location: String,
    pub coordinates: Coordinates,
    pub description: String,
    pub photo: Option<PhotoAttachment>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub upvotes: u32,
    pub downvotes: u32,
    pub reliability_score: f64,
}

impl ReportRecord {
    pub fn is_pending(&self) -> bool {
        self.status == ReportStatus::Pending
    }

    /// Whether `user` may view this report (owner or authority)
    pub fn visible_to(&self, user: &UserId, is_authority: bool) -> bool {
        is_authority || &self.reporter_id == user
    }
}

/// Audit record of an authority review. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAction {
    pub action_id: ActionId,
    pub report_id: ReportId,
    pub admin_id: UserId,
    pub decision: ReviewDecision,
    /// Admin notes; for a rejection this is the reason given to the reporter
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Vote direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Up,
    Down,
}

/// Vote counters after a vote is recorded. Each user holds at most one
/// vote per report; voting again replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub report_id: ReportId,
    pub upvotes: u32,
    pub downvotes: u32,
    /// The caller's vote as now recorded
    pub vote: Vote,
}

/// Report counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub validated: u64,
    pub rejected: u64,
    pub total: u64,
}
