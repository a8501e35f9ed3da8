//! Data Transfer Objects for the Flood Watch API

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use flood_core::{
    AlertRecord, Coordinates, PhotoUpload, ReportAction, ReportRecord, ReportStatus,
    ReviewDecision, RiskChange, RiskLevel, StatusCounts, Vote, WardId,
};
use flood_db::DispatchReport;

use crate::error::{ApiError, ApiResult};

/// Photo attached to a report, base64-encoded in the JSON body
#[derive(Debug, Deserialize, Validate)]
pub struct PhotoPayload {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,

    #[validate(length(min = 1, max = 100))]
    pub content_type: String,

    /// Standard base64, no data-URL prefix
    pub data: String,
}

impl PhotoPayload {
    /// Decode into an upload. Only `image/*` content is accepted.
    pub fn decode(self) -> ApiResult<PhotoUpload> {
        if !self.content_type.to_lowercase().starts_with("image/") {
            return Err(ApiError::validation("Photo must be an image"));
        }
        let data = STANDARD
            .decode(self.data.trim())
            .map_err(|_| ApiError::validation("Photo data is not valid base64"))?;

        Ok(PhotoUpload {
            file_name: self.file_name,
            content_type: self.content_type,
            data,
        })
    }
}

/// Report submission.
///
/// Fields are optional on the wire so that a missing value surfaces as the
/// submission rule's message rather than a decode error.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReportRequest {
    #[serde(default)]
    #[validate(length(max = 255))]
    pub location: String,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,

    #[validate(nested)]
    pub photo: Option<PhotoPayload>,
}

impl SubmitReportRequest {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}

/// Authority review of a pending report
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,

    /// Admin notes; the rejection reason shown to the reporter
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub report: ReportRecord,
    pub action: ReportAction,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub vote: Vote,
}

/// Query for `GET /api/reports`
#[derive(Debug, Default, Deserialize)]
pub struct ListReportsQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
}

impl ListReportsQuery {
    pub fn status(&self) -> ApiResult<Option<ReportStatus>> {
        match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(raw) => ReportStatus::parse(raw)
                .map(Some)
                .ok_or_else(|| ApiError::bad_request(format!("Unknown report status: {}", raw))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportListResponse {
    pub reports: Vec<ReportRecord>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SetRiskRequest {
    pub risk_level: RiskLevel,
}

#[derive(Debug, Serialize)]
pub struct WardRiskResponse {
    pub ward_id: WardId,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Serialize)]
pub struct RiskChangeResponse {
    pub ward_id: WardId,
    pub previous: RiskLevel,
    pub current: RiskLevel,
    pub escalated: bool,
}

impl From<RiskChange> for RiskChangeResponse {
    fn from(change: RiskChange) -> Self {
        Self {
            ward_id: change.ward_id,
            previous: change.previous,
            current: change.current,
            escalated: change.escalated_to_high(),
        }
    }
}

fn default_alert_level() -> RiskLevel {
    RiskLevel::High
}

/// Ward alert broadcast. Without `ward_id`, every ward currently at
/// `risk_level` or above is alerted at its own level.
#[derive(Debug, Deserialize, Validate)]
pub struct SendAlertRequest {
    pub ward_id: Option<WardId>,

    #[serde(default = "default_alert_level")]
    pub risk_level: RiskLevel,

    #[validate(length(max = 2000))]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub alert: AlertRecord,
    pub delivery: DispatchReport,
}

#[derive(Debug, Serialize)]
pub struct AlertBatchResponse {
    pub count: usize,
    pub alerts: Vec<AlertResponse>,
}

impl From<Vec<(AlertRecord, DispatchReport)>> for AlertBatchResponse {
    fn from(sent: Vec<(AlertRecord, DispatchReport)>) -> Self {
        let alerts: Vec<_> = sent
            .into_iter()
            .map(|(alert, delivery)| AlertResponse { alert, delivery })
            .collect();
        Self {
            count: alerts.len(),
            alerts,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DailySummaryRequest {
    /// Summary date; defaults to today (UTC)
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub reports: StatusCounts,
    pub high_risk_wards: usize,
    pub recent_alerts: Vec<AlertRecord>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage_ready: bool,
    pub mailer: String,
    pub risk_policy: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(content_type: &str, data: &str) -> PhotoPayload {
        PhotoPayload {
            file_name: "flood.jpg".to_string(),
            content_type: content_type.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_photo_decode() {
        let upload = photo("image/jpeg", &STANDARD.encode(b"jpeg-bytes")).decode().unwrap();
        assert_eq!(upload.data, b"jpeg-bytes");
    }

    #[test]
    fn test_non_image_photo_rejected() {
        let err = photo("application/pdf", &STANDARD.encode(b"%PDF")).decode().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = photo("image/png", "not base64!").decode().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_partial_coordinates_are_missing() {
        let request: SubmitReportRequest = serde_json::from_value(serde_json::json!({
            "location": "Kibera",
            "latitude": -1.31,
            "description": "Water rising"
        }))
        .unwrap();
        assert!(request.coordinates().is_none());
    }

    #[test]
    fn test_list_query_status() {
        let query = ListReportsQuery {
            status: Some("validated".to_string()),
            limit: None,
        };
        assert_eq!(query.status().unwrap(), Some(ReportStatus::Validated));

        let query = ListReportsQuery {
            status: Some("archived".to_string()),
            limit: None,
        };
        assert!(query.status().is_err());
    }

    #[test]
    fn test_alert_defaults_to_high() {
        let request: SendAlertRequest =
            serde_json::from_value(serde_json::json!({ "ward_id": 3 })).unwrap();
        assert_eq!(request.risk_level, RiskLevel::High);
        assert_eq!(request.ward_id, Some(WardId(3)));

        let by_level: SendAlertRequest =
            serde_json::from_value(serde_json::json!({ "risk_level": "Medium" })).unwrap();
        assert_eq!(by_level.ward_id, None);
        assert_eq!(by_level.risk_level, RiskLevel::Medium);
    }
}
