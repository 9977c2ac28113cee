use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Coord, GeoError, Geometry, Polygon};

/// GeoJSON geometry object as it appears on the wire.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum GeometryDoc {
    Point(Coord),
    Polygon(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
}

impl TryFrom<GeometryDoc> for Geometry {
    type Error = GeoError;

    fn try_from(doc: GeometryDoc) -> Result<Self, Self::Error> {
        Ok(match doc {
            GeometryDoc::Point(c) => Geometry::Point(c),
            GeometryDoc::Polygon(rings) => Geometry::Polygon(Polygon::from_rings(rings)?),
            GeometryDoc::MultiPolygon(parts) => Geometry::MultiPolygon(
                parts
                    .into_iter()
                    .map(Polygon::from_rings)
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

impl From<&Geometry> for GeometryDoc {
    fn from(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point(c) => GeometryDoc::Point(*c),
            Geometry::Polygon(p) => GeometryDoc::Polygon(p.rings().cloned().collect()),
            Geometry::MultiPolygon(parts) => GeometryDoc::MultiPolygon(
                parts.iter().map(|p| p.rings().cloned().collect()).collect(),
            ),
        }
    }
}

/// Decode a GeoJSON document. Accepts a bare geometry object, a `Feature`
/// (its `geometry` member is used) or a `FeatureCollection` (the first
/// feature carrying a geometry is used).
pub fn from_geojson_value(value: &Value) -> Result<Geometry, GeoError> {
    match value.get("type").and_then(Value::as_str) {
        Some("Feature") => match value.get("geometry") {
            Some(geometry) if !geometry.is_null() => parse_geometry(geometry),
            _ => Err(GeoError::EmptyFeature),
        },
        Some("FeatureCollection") => value
            .get("features")
            .and_then(Value::as_array)
            .and_then(|features| {
                features
                    .iter()
                    .filter_map(|f| f.get("geometry"))
                    .find(|g| !g.is_null())
            })
            .ok_or(GeoError::EmptyFeature)
            .and_then(parse_geometry),
        Some(_) => parse_geometry(value),
        None => Err(GeoError::MissingType),
    }
}

pub fn from_geojson_str(raw: &str) -> Result<Geometry, GeoError> {
    let value: Value = serde_json::from_str(raw)?;
    from_geojson_value(&value)
}

pub fn to_geojson_value(geometry: &Geometry) -> Value {
    serde_json::to_value(GeometryDoc::from(geometry)).unwrap_or(Value::Null)
}

/// Serialize as a GeoJSON geometry object.
pub fn to_geojson_string(geometry: &Geometry) -> String {
    serde_json::to_string(&GeometryDoc::from(geometry)).unwrap_or_else(|_| "null".into())
}

fn parse_geometry(value: &Value) -> Result<Geometry, GeoError> {
    let doc = GeometryDoc::deserialize(value)?;
    Geometry::try_from(doc)
}
