use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use serde_with::skip_serializing_none;

use crate::{ContractError, ShardEnvelope, Validate};

/// Prefix of the planning-layer shard id derived for every emitted option.
pub const SITE_OPTION_SHARD_PREFIX: &str = "flowvac_site_option";

pub const METRIC_ECO_IMPACT_SCORE: &str = "ecoImpactScore";
pub const METRIC_SPRAWL_REDUCTION_PERCENT: &str = "sprawlReductionPercent";
pub const METRIC_CANDIDATE_AREA: &str = "candidateArea";
pub const METRIC_BASELINE_AREA: &str = "baselineArea";

/// Shards plus the grammar version they must agree on.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningRequest {
    pub grammar_version_id: String,
    #[serde(default)]
    pub shards: Vec<ShardEnvelope>,
    /// Caller scenario id, echoed back in the result.
    #[serde(default)]
    pub scenario_id: Option<String>,
    /// Caller label recorded for audit trails.
    #[serde(default)]
    pub planner_label: Option<String>,
}

impl PlanningRequest {
    pub fn new(grammar_version_id: impl Into<String>) -> Self {
        Self {
            grammar_version_id: grammar_version_id.into(),
            shards: Vec::new(),
            scenario_id: None,
            planner_label: None,
        }
    }
}

/// Stable failure codes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningErrorCode {
    ShardValidationFailed,
    NoCorridors,
}

impl PlanningErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            PlanningErrorCode::ShardValidationFailed => "shard_validation_failed",
            PlanningErrorCode::NoCorridors => "no_corridors",
        }
    }
}

impl fmt::Display for PlanningErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate site that cleared the feasibility gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningOption {
    pub id: String,
    pub feasible: bool,
    pub eco_impact_score: f64,
    pub sprawl_reduction_percent: f64,
    pub planning_shard_id: String,
    pub source_shard_id: String,
    /// Candidate geometry as a GeoJSON geometry object.
    pub geometry_geo_json: String,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

impl PlanningOption {
    pub fn planning_shard_id_for(id: &str) -> String {
        format!("{SITE_OPTION_SHARD_PREFIX}:{id}")
    }

    /// Planning-layer shard written back for downstream consumers.
    pub fn to_site_option_shard(&self, grammar_version_id: &str) -> SiteOptionShard {
        let geometry = serde_json::from_str::<Value>(&self.geometry_geo_json)
            .unwrap_or_else(|_| Value::String(self.geometry_geo_json.clone()));
        let mut payload = Map::new();
        payload.insert("optionId".into(), json!(self.id));
        payload.insert("feasible".into(), json!(self.feasible));
        payload.insert(METRIC_ECO_IMPACT_SCORE.into(), json!(self.eco_impact_score));
        payload.insert(
            METRIC_SPRAWL_REDUCTION_PERCENT.into(),
            json!(self.sprawl_reduction_percent),
        );
        payload.insert("geometry".into(), geometry);
        payload.insert("metrics".into(), json!(self.metrics));
        SiteOptionShard {
            shard_id: self.planning_shard_id.clone(),
            source_shard_id: self.source_shard_id.clone(),
            grammar_version_id: grammar_version_id.to_string(),
            payload,
        }
    }
}

impl Validate for PlanningOption {
    fn validate(&self) -> Result<(), ContractError> {
        if !(0.0..=1.0).contains(&self.eco_impact_score) {
            return Err(ContractError::AssertionFailed(
                "ecoImpactScore must be within [0, 1]",
            ));
        }
        if self.planning_shard_id != Self::planning_shard_id_for(&self.id) {
            return Err(ContractError::AssertionFailed(
                "planningShardId must derive from the option id",
            ));
        }
        if !self.metrics.contains_key(METRIC_ECO_IMPACT_SCORE)
            || !self.metrics.contains_key(METRIC_SPRAWL_REDUCTION_PERCENT)
        {
            return Err(ContractError::AssertionFailed(
                "metrics must include ecoImpactScore and sprawlReductionPercent",
            ));
        }
        Ok(())
    }
}

/// Terminal outcome of one planning request.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningResult {
    pub success: bool,
    #[serde(default)]
    pub error_code: Option<PlanningErrorCode>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub grammar_version_id: String,
    #[serde(default)]
    pub scenario_id: Option<String>,
    #[serde(default)]
    pub options: Vec<PlanningOption>,
}

impl PlanningResult {
    pub fn succeeded(
        grammar_version_id: impl Into<String>,
        scenario_id: Option<String>,
        options: Vec<PlanningOption>,
    ) -> Self {
        Self {
            success: true,
            error_code: None,
            error_message: None,
            grammar_version_id: grammar_version_id.into(),
            scenario_id,
            options,
        }
    }

    pub fn failed(
        grammar_version_id: impl Into<String>,
        scenario_id: Option<String>,
        code: PlanningErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error_code: Some(code),
            error_message: Some(message.into()),
            grammar_version_id: grammar_version_id.into(),
            scenario_id,
            options: Vec::new(),
        }
    }
}

/// Planning output shard, keyed by the option's planning shard id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteOptionShard {
    pub shard_id: String,
    pub source_shard_id: String,
    pub grammar_version_id: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
}
