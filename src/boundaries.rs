// 🗺️ Boundary Dataset - Department polygons + canonical names
//
// Reads a GeoJSON FeatureCollection. Polygon and MultiPolygon features are
// kept (a Polygon becomes a one-member MultiPolygon); other geometry types
// are skipped with a warning. Coordinates are [lon, lat, ...].

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::Value;

/// Name attribute in the national department boundary dataset
pub const DEFAULT_NAME_FIELD: &str = "DPTO_CNMBR";

/// One administrative region as published in the boundary dataset
#[derive(Debug, Clone, PartialEq)]
pub struct RegionBoundary {
    /// Name exactly as stored in the dataset (accents included)
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

// ============================================================================
// GEOJSON WIRE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<serde_json::Map<String, Value>>,
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

type Ring = Vec<Vec<f64>>;

fn to_line_string(ring: Ring) -> Result<LineString<f64>> {
    ring.into_iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(anyhow!("Position with fewer than two coordinates")),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

fn to_polygon(rings: Vec<Ring>) -> Result<Polygon<f64>> {
    let mut rings = rings.into_iter();
    let exterior = rings
        .next()
        .ok_or_else(|| anyhow!("Polygon without rings"))
        .and_then(to_line_string)?;
    let interiors = rings.map(to_line_string).collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(exterior, interiors))
}

impl RawGeometry {
    /// `Ok(None)` for geometry types a choropleth can't fill
    fn into_multi_polygon(self) -> Result<Option<MultiPolygon<f64>>> {
        match self.kind.as_str() {
            "Polygon" => {
                let rings: Vec<Ring> = serde_json::from_value(self.coordinates)
                    .context("Invalid Polygon coordinates")?;
                Ok(Some(MultiPolygon::new(vec![to_polygon(rings)?])))
            }
            "MultiPolygon" => {
                let polygons: Vec<Vec<Ring>> = serde_json::from_value(self.coordinates)
                    .context("Invalid MultiPolygon coordinates")?;
                let polygons = polygons
                    .into_iter()
                    .map(to_polygon)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Some(MultiPolygon::new(polygons)))
            }
            _ => Ok(None),
        }
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse a GeoJSON FeatureCollection into boundaries, in feature order
pub fn parse_boundaries(geojson: &str, name_field: &str) -> Result<Vec<RegionBoundary>> {
    let collection: FeatureCollection =
        serde_json::from_str(geojson).context("Invalid GeoJSON document")?;

    if collection.kind != "FeatureCollection" {
        bail!("Expected a FeatureCollection, found '{}'", collection.kind);
    }

    let mut boundaries = Vec::with_capacity(collection.features.len());

    for (i, feature) in collection.features.into_iter().enumerate() {
        let name = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(name_field))
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Feature {} has no '{}' attribute", i, name_field))?
            .to_string();

        let Some(raw) = feature.geometry else {
            tracing::warn!(feature = i, name = %name, "feature without geometry skipped");
            continue;
        };

        let kind = raw.kind.clone();
        match raw
            .into_multi_polygon()
            .with_context(|| format!("Feature {} ({})", i, name))?
        {
            Some(geometry) => boundaries.push(RegionBoundary { name, geometry }),
            None => {
                tracing::warn!(feature = i, name = %name, kind = %kind, "non-areal feature skipped");
            }
        }
    }

    Ok(boundaries)
}

// ============================================================================
// TESTS
// ============================================================================
