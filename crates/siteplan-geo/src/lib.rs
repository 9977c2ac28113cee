//! Planar geometry consumed by the site planner.
//!
//! Coordinates live on a fixed WGS84-equivalent plane and are treated as
//! Cartesian: area, bounding envelope and containment are computed without
//! any projection. GeoJSON geometry objects are the interchange format.

mod envelope;
mod geojson;
mod geometry;

pub use envelope::Envelope;
pub use geojson::{from_geojson_str, from_geojson_value, to_geojson_string, to_geojson_value};
pub use geometry::{Coord, Geometry, Polygon};

/// Errors raised while building or decoding geometries.
#[derive(thiserror::Error, Debug)]
pub enum GeoError {
    #[error("geometry document has no `type` member")]
    MissingType,
    #[error("feature carries no geometry")]
    EmptyFeature,
    #[error("position needs at least two finite ordinates, got {0:?}")]
    InvalidPosition(Vec<f64>),
    #[error("linear ring needs at least 4 positions, got {0}")]
    ShortRing(usize),
    #[error("linear ring is not closed")]
    UnclosedRing,
    #[error("polygon has no exterior ring")]
    MissingExterior,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
