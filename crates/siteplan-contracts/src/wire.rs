use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{PlanningOption, PlanningResult};

/// Successful planning response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePlanningResponse {
    pub grammar_version_id: String,
    /// Empty when the request carried no scenario id.
    pub scenario_id: String,
    pub options: Vec<SiteOptionDto>,
}

impl SitePlanningResponse {
    pub fn from_result(result: &PlanningResult) -> Self {
        Self {
            grammar_version_id: result.grammar_version_id.clone(),
            scenario_id: result.scenario_id.clone().unwrap_or_default(),
            options: result
                .options
                .iter()
                .map(|o| SiteOptionDto::from_option(o, &result.grammar_version_id))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteOptionDto {
    pub id: String,
    pub feasible: bool,
    /// Eco-impact score in [0, 1].
    pub eco_impact_score: f64,
    /// Sprawl reduction relative to the baseline footprint.
    pub sprawl_reduction_percent: f64,
    pub planning_shard_id: String,
    pub source_shard_id: String,
    pub grammar_version_id: String,
    pub geometry_geo_json: String,
    pub metrics: BTreeMap<String, f64>,
}

impl SiteOptionDto {
    fn from_option(option: &PlanningOption, grammar_version_id: &str) -> Self {
        Self {
            id: option.id.clone(),
            feasible: option.feasible,
            eco_impact_score: option.eco_impact_score,
            sprawl_reduction_percent: option.sprawl_reduction_percent,
            planning_shard_id: option.planning_shard_id.clone(),
            source_shard_id: option.source_shard_id.clone(),
            grammar_version_id: grammar_version_id.to_string(),
            geometry_geo_json: option.geometry_geo_json.clone(),
            metrics: option.metrics.clone(),
        }
    }
}

/// Failure body: `{ "error": <code>, "message": <text> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningErrorBody {
    pub error: String,
    pub message: String,
}

impl PlanningErrorBody {
    /// `None` for successful results.
    pub fn from_result(result: &PlanningResult) -> Option<Self> {
        if result.success {
            return None;
        }
        Some(Self {
            error: result
                .error_code
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
            message: result.error_message.clone().unwrap_or_default(),
        })
    }
}

/// RFC7807-style error payload used at service edges.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: Option<String>,
    pub instance: Option<String>,
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlanningErrorCode;

    #[test]
    fn response_carries_grammar_on_every_option() {
        let option = PlanningOption {
            id: "a".into(),
            feasible: true,
            eco_impact_score: 0.95,
            sprawl_reduction_percent: 14.0,
            planning_shard_id: "flowvac_site_option:a".into(),
            source_shard_id: "corridor:1".into(),
            geometry_geo_json: "{}".into(),
            metrics: BTreeMap::new(),
        };
        let result = PlanningResult::succeeded("g1", None, vec![option]);
        let response = SitePlanningResponse::from_result(&result);
        assert_eq!(response.scenario_id, "");
        assert_eq!(response.options[0].grammar_version_id, "g1");

        let wire = serde_json::to_value(&response).expect("serialize");
        assert_eq!(wire["options"][0]["geometryGeoJson"], "{}");
        assert_eq!(wire["options"][0]["planningShardId"], "flowvac_site_option:a");
        assert!(PlanningErrorBody::from_result(&result).is_none());
    }

    #[test]
    fn error_body_uses_stable_code() {
        let result = PlanningResult::failed(
            "g1",
            Some("s".into()),
            PlanningErrorCode::ShardValidationFailed,
            "No shards supplied; governance requires corridor + eco-impact + risk shards.",
        );
        let body = PlanningErrorBody::from_result(&result).expect("failure body");
        assert_eq!(body.error, "shard_validation_failed");
        assert!(body.message.starts_with("No shards supplied"));
    }
}
