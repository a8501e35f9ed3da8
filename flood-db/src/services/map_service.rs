//! Map Data Provider

use std::sync::Arc;
use tracing::debug;

use flood_core::geojson::{Feature, FeatureCollection};
use flood_core::ledger::WardRegistry;
use flood_core::FloodResult;

use crate::store::FloodStore;

pub struct MapService {
    store: Arc<FloodStore>,
}

impl MapService {
    pub fn new(store: Arc<FloodStore>) -> Self {
        Self { store }
    }

    /// Every ward exactly once, in ward ID order
    pub async fn ward_geojson(&self) -> FloodResult<FeatureCollection> {
        let features: Vec<Feature> = self
            .store
            .list_wards()
            .await?
            .iter()
            .map(Feature::from_ward)
            .collect();

        let without_geometry = features.iter().filter(|f| f.geometry.is_none()).count();
        debug!(
            wards = features.len(),
            without_geometry, "Built ward feature collection"
        );

        Ok(FeatureCollection::new(features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flood_core::{RiskLevel, WardId, WardRecord};
    use serde_json::json;

    #[tokio::test]
    async fn test_every_ward_emitted_once() {
        let store = Arc::new(FloodStore::in_memory().await.unwrap());
        let mut kibera = WardRecord::new(
            WardId(2),
            "Kibera",
            json!({ "type": "Polygon", "coordinates": [[[36.77, -1.32], [36.80, -1.32], [36.80, -1.30], [36.77, -1.32]]] }),
        );
        kibera.current_risk_level = RiskLevel::High;
        kibera.population = 185_777;
        kibera.critical_infrastructure = true;
        store.upsert_ward(kibera).await.unwrap();
        store
            .upsert_ward(WardRecord::new(WardId(1), "Broken", json!("not geometry")))
            .await
            .unwrap();

        let collection = MapService::new(store).ward_geojson().await.unwrap();
        assert_eq!(collection.kind, "FeatureCollection");
        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.features[0].properties.id, WardId(1));
        assert!(collection.features[0].geometry.is_none());

        let value = serde_json::to_value(&collection.features[1]).unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["properties"]["current_risk_level"], "High");
        assert_eq!(value["properties"]["population"], 185_777);
        assert_eq!(value["properties"]["critical_infrastructure"], true);
    }
}
