//! Ward geometry helpers
//!
//! Point-in-polygon over GeoJSON `Polygon` / `MultiPolygon` geometries.
//! GeoJSON positions are `[longitude, latitude]`.

use serde_json::Value;

use crate::types::Coordinates;

const GEOMETRY_TYPES: [&str; 7] = [
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
    "GeometryCollection",
];

/// Structural check of a GeoJSON geometry object
pub fn is_valid_geometry(geometry: &Value) -> bool {
    let Some(kind) = geometry.get("type").and_then(Value::as_str) else {
        return false;
    };
    if !GEOMETRY_TYPES.contains(&kind) {
        return false;
    }
    if kind == "GeometryCollection" {
        return geometry
            .get("geometries")
            .and_then(Value::as_array)
            .map(|g| g.iter().all(is_valid_geometry))
            .unwrap_or(false);
    }
    geometry.get("coordinates").map(Value::is_array).unwrap_or(false)
}

/// Whether a geometry's area covers the point. Non-areal geometries never do.
pub fn geometry_contains(geometry: &Value, point: &Coordinates) -> bool {
    let coords = geometry.get("coordinates");
    match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => coords.map(|c| polygon_contains(c, point)).unwrap_or(false),
        Some("MultiPolygon") => coords
            .and_then(Value::as_array)
            .map(|polys| polys.iter().any(|p| polygon_contains(p, point)))
            .unwrap_or(false),
        Some("GeometryCollection") => geometry
            .get("geometries")
            .and_then(Value::as_array)
            .map(|g| g.iter().any(|g| geometry_contains(g, point)))
            .unwrap_or(false),
        _ => false,
    }
}

/// First ring is the exterior, remaining rings are holes
fn polygon_contains(rings: &Value, point: &Coordinates) -> bool {
    let Some(rings) = rings.as_array() else {
        return false;
    };
    let mut iter = rings.iter().filter_map(parse_ring);
    match iter.next() {
        Some(outer) if ring_contains(&outer, point) => !iter.any(|hole| ring_contains(&hole, point)),
        _ => false,
    }
}

fn parse_ring(ring: &Value) -> Option<Vec<(f64, f64)>> {
    ring.as_array()?
        .iter()
        .map(|pos| {
            let pos = pos.as_array()?;
            Some((pos.first()?.as_f64()?, pos.get(1)?.as_f64()?))
        })
        .collect()
}

// Even-odd ray casting
fn ring_contains(ring: &[(f64, f64)], point: &Coordinates) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let (x, y) = (point.longitude, point.latitude);
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(min_lon: f64, min_lat: f64, size: f64) -> Value {
        json!([
            [min_lon, min_lat],
            [min_lon + size, min_lat],
            [min_lon + size, min_lat + size],
            [min_lon, min_lat + size],
            [min_lon, min_lat]
        ])
    }

    #[test]
    fn test_polygon_contains_point() {
        let geom = json!({ "type": "Polygon", "coordinates": [square(36.8, -1.3, 0.05)] });
        assert!(geometry_contains(&geom, &Coordinates::new(-1.28, 36.81)));
        assert!(!geometry_contains(&geom, &Coordinates::new(-1.20, 36.81)));
    }

    #[test]
    fn test_polygon_hole_excluded() {
        let geom = json!({
            "type": "Polygon",
            "coordinates": [square(36.8, -1.3, 0.1), square(36.82, -1.28, 0.02)]
        });
        assert!(geometry_contains(&geom, &Coordinates::new(-1.29, 36.81)));
        assert!(!geometry_contains(&geom, &Coordinates::new(-1.27, 36.83)));
    }

    #[test]
    fn test_multipolygon() {
        let geom = json!({
            "type": "MultiPolygon",
            "coordinates": [[square(36.7, -1.4, 0.01)], [square(36.8, -1.3, 0.05)]]
        });
        assert!(geometry_contains(&geom, &Coordinates::new(-1.28, 36.81)));
    }

    #[test]
    fn test_geometry_validity() {
        assert!(is_valid_geometry(&json!({ "type": "Polygon", "coordinates": [] })));
        assert!(!is_valid_geometry(&json!({ "type": "Circle", "coordinates": [] })));
        assert!(!is_valid_geometry(&json!("not a geometry")));
        assert!(!is_valid_geometry(&json!({ "type": "Polygon" })));
    }
}
