//! Report submission validation
//!
//! Rules applied before anything is persisted. A submission that fails any
//! rule is rejected with `FloodError::Validation` and leaves no trace.

use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_PHOTO_BYTES, SERVICE_AREA_MAX_LAT, SERVICE_AREA_MAX_LON, SERVICE_AREA_MIN_LAT,
    SERVICE_AREA_MIN_LON,
};
use crate::error::{FloodError, FloodResult};
use crate::types::{Coordinates, NewReport};

/// Bounding box within which report coordinates are accepted (exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceArea {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for ServiceArea {
    fn default() -> Self {
        Self {
            min_lat: SERVICE_AREA_MIN_LAT,
            max_lat: SERVICE_AREA_MAX_LAT,
            min_lon: SERVICE_AREA_MIN_LON,
            max_lon: SERVICE_AREA_MAX_LON,
        }
    }
}

impl ServiceArea {
    pub fn contains(&self, point: &Coordinates) -> bool {
        self.min_lat < point.latitude
            && point.latitude < self.max_lat
            && self.min_lon < point.longitude
            && point.longitude < self.max_lon
    }
}

/// Submission rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRules {
    pub service_area: ServiceArea,
    pub max_photo_bytes: usize,
}

impl Default for SubmissionRules {
    fn default() -> Self {
        Self {
            service_area: ServiceArea::default(),
            max_photo_bytes: MAX_PHOTO_BYTES,
        }
    }
}

impl SubmissionRules {
    /// Validate a submission, returning its coordinates on success
    pub fn validate(&self, report: &NewReport) -> FloodResult<Coordinates> {
        if report.location.trim().is_empty() {
            return Err(FloodError::validation("Location description is required"));
        }
        if report.description.trim().is_empty() {
            return Err(FloodError::validation("Report description is required"));
        }

        let coordinates = report.coordinates.ok_or_else(|| {
            FloodError::validation("Location data is required. Please allow geolocation.")
        })?;

        if !coordinates.latitude.is_finite() || !coordinates.longitude.is_finite() {
            return Err(FloodError::validation("Invalid location data"));
        }

        if !self.service_area.contains(&coordinates) {
            return Err(FloodError::validation(
                "Location appears to be outside the service area. Please verify your location.",
            ));
        }

        if let Some(photo) = &report.photo {
            if photo.data.len() > self.max_photo_bytes {
                return Err(FloodError::validation(format!(
                    "File size exceeds {}MB limit",
                    self.max_photo_bytes / (1024 * 1024)
                )));
            }
        }

        Ok(coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PhotoUpload, UserId};

    fn submission(coords: Option<Coordinates>, description: &str) -> NewReport {
        NewReport {
            reporter_id: UserId::new("resident-1"),
            location: "Outering Road near Donholm".to_string(),
            coordinates: coords,
            description: description.to_string(),
            photo: None,
        }
    }

    #[test]
    fn test_valid_submission() {
        let rules = SubmissionRules::default();
        let coords = rules
            .validate(&submission(Some(Coordinates::new(-1.28, 36.81)), "Flooded road"))
            .unwrap();
        assert_eq!(coords, Coordinates::new(-1.28, 36.81));
    }

    #[test]
    fn test_missing_coordinates() {
        let rules = SubmissionRules::default();
        let err = rules.validate(&submission(None, "Flooded road")).unwrap_err();
        assert!(matches!(err, FloodError::Validation(_)));
    }

    #[test]
    fn test_blank_description() {
        let rules = SubmissionRules::default();
        let err = rules
            .validate(&submission(Some(Coordinates::new(-1.28, 36.81)), "   "))
            .unwrap_err();
        assert!(err.to_string().contains("description"));
    }

    #[test]
    fn test_outside_service_area() {
        let rules = SubmissionRules::default();
        // Mombasa
        let err = rules
            .validate(&submission(Some(Coordinates::new(-4.04, 39.67)), "Flooded road"))
            .unwrap_err();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn test_non_finite_coordinates() {
        let rules = SubmissionRules::default();
        let err = rules
            .validate(&submission(Some(Coordinates::new(f64::NAN, 36.81)), "Flooded road"))
            .unwrap_err();
        assert!(matches!(err, FloodError::Validation(_)));
    }

    #[test]
    fn test_oversized_photo() {
        let rules = SubmissionRules {
            max_photo_bytes: 16,
            ..Default::default()
        };
        let mut report = submission(Some(Coordinates::new(-1.28, 36.81)), "Flooded road");
        report.photo = Some(PhotoUpload {
            file_name: "river.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data: vec![0u8; 17],
        });
        assert!(rules.validate(&report).is_err());
    }
}
