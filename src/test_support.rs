// Shared fixtures for unit tests

use crate::join::JoinedRegion;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use std::io::Write;
use tempfile::NamedTempFile;

/// One-degree square with its south-west corner at (lon, lat)
pub fn square(lon: f64, lat: f64) -> MultiPolygon<f64> {
    let ring = LineString::new(vec![
        Coord { x: lon, y: lat },
        Coord { x: lon + 1.0, y: lat },
        Coord { x: lon + 1.0, y: lat + 1.0 },
        Coord { x: lon, y: lat + 1.0 },
        Coord { x: lon, y: lat },
    ]);
    MultiPolygon::new(vec![Polygon::new(ring, vec![])])
}

/// Joined regions laid out west to east, one per (name, count)
pub fn joined(rows: &[(&str, u32)]) -> Vec<JoinedRegion> {
    rows.iter()
        .enumerate()
        .map(|(i, (name, count))| JoinedRegion {
            name: name.to_string(),
            normalized_name: name.to_string(),
            count: *count,
            geometry: Some(square(-78.0 + i as f64, 2.0 + (i % 3) as f64)),
        })
        .collect()
}

/// GeoJSON FeatureCollection with one square per name, `DPTO_CNMBR` attribute
pub fn feature_collection(names: &[&str]) -> String {
    let features: Vec<serde_json::Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let lon = -78.0 + i as f64;
            serde_json::json!({
                "type": "Feature",
                "properties": { "DPTO_CNMBR": name },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [lon, 2.0], [lon + 1.0, 2.0], [lon + 1.0, 3.0], [lon, 3.0], [lon, 2.0]
                    ]]
                }
            })
        })
        .collect();

    serde_json::json!({ "type": "FeatureCollection", "features": features }).to_string()
}

/// Write `content` to a temp file that lives as long as the handle
pub fn temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
