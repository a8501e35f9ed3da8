//! GeoJSON map model for ward rendering

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{RiskLevel, WardId, WardRecord};
use crate::geo::is_valid_geometry;

/// Feature properties exposed to map clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardProperties {
    pub id: WardId,
    pub name: String,
    pub current_risk_level: RiskLevel,
    pub population: u64,
    pub critical_infrastructure: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    /// `null` when the stored ward boundary is not a valid geometry
    pub geometry: Option<Value>,
    pub properties: WardProperties,
}

impl Feature {
    pub fn from_ward(ward: &WardRecord) -> Self {
        let geometry = if is_valid_geometry(&ward.geometry) {
            Some(ward.geometry.clone())
        } else {
            None
        };

        Self {
            kind: "Feature".to_string(),
            geometry,
            properties: WardProperties {
                id: ward.ward_id,
                name: ward.name.clone(),
                current_risk_level: ward.current_risk_level,
                population: ward.population,
                critical_infrastructure: ward.critical_infrastructure,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}
