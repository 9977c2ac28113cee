use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use siteplan_geo::{GeoError, Geometry};

/// Payload member holding the corridor geometry on `corridor_parameters` shards.
pub const CORRIDOR_GEOMETRY_KEY: &str = "geometry";
/// Optional payload member holding a baseline footprint on `eco_impact_kernel` shards.
pub const BASELINE_GEOMETRY_KEY: &str = "baselineGeometry";

/// Shard types the planner understands. The wire vocabulary is open; other
/// types pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardKind {
    CorridorParameters,
    EcoImpactKernel,
    RiskOfHarmMetadata,
}

impl ShardKind {
    /// Types every admissible request must carry, in canonical order.
    pub const REQUIRED: [ShardKind; 3] = [
        ShardKind::CorridorParameters,
        ShardKind::EcoImpactKernel,
        ShardKind::RiskOfHarmMetadata,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ShardKind::CorridorParameters => "corridor_parameters",
            ShardKind::EcoImpactKernel => "eco_impact_kernel",
            ShardKind::RiskOfHarmMetadata => "risk_of_harm_metadata",
        }
    }
}

impl fmt::Display for ShardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShardKind::REQUIRED
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown shard type `{s}`"))
    }
}

/// Governance-aware wrapper for an incoming data shard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardEnvelope {
    /// Globally unique shard identifier.
    pub shard_id: String,
    /// Shard type, e.g. `corridor_parameters`.
    #[serde(rename = "type")]
    pub shard_type: String,
    /// Identifier of the schema this shard is validated against.
    #[serde(rename = "schemaDid", alias = "schemaRef", default)]
    pub schema_ref: String,
    /// Grammar version the shard was authored under.
    pub grammar_version_id: String,
    #[serde(default)]
    pub payload: ShardPayload,
}

impl ShardEnvelope {
    pub fn kind(&self) -> Option<ShardKind> {
        self.shard_type.parse().ok()
    }

    pub fn is_kind(&self, kind: ShardKind) -> bool {
        self.shard_type == kind.as_str()
    }
}

/// Errors raised by typed payload accessors.
#[derive(thiserror::Error, Debug)]
pub enum PayloadError {
    #[error("payload has no `{0}` member")]
    MissingField(&'static str),
    #[error("payload member `{field}` is not a valid geometry: {source}")]
    Geometry {
        field: &'static str,
        #[source]
        source: GeoError,
    },
}

/// Structured shard payload. Members are read through typed accessors that
/// validate at the point of use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShardPayload(Map<String, Value>);

impl ShardPayload {
    pub fn new(members: Map<String, Value>) -> Self {
        Self(members)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn geometry(&self, field: &'static str) -> Result<Geometry, PayloadError> {
        let raw = self.get(field).ok_or(PayloadError::MissingField(field))?;
        siteplan_geo::from_geojson_value(raw).map_err(|source| PayloadError::Geometry { field, source })
    }

    pub fn corridor_geometry(&self) -> Result<Geometry, PayloadError> {
        self.geometry(CORRIDOR_GEOMETRY_KEY)
    }

    /// `None` when the payload carries no baseline at all.
    pub fn baseline_geometry(&self) -> Option<Result<Geometry, PayloadError>> {
        self.get(BASELINE_GEOMETRY_KEY)?;
        Some(self.geometry(BASELINE_GEOMETRY_KEY))
    }
}

impl From<Map<String, Value>> for ShardPayload {
    fn from(members: Map<String, Value>) -> Self {
        Self(members)
    }
}
