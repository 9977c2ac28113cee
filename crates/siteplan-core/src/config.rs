use anyhow::{anyhow, Context, Result};
use jsonschema::{validator_for, Validator};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use siteplan_contracts::{ContractError, Validate};

use crate::candidates::{DEFAULT_FOOTPRINT_AREA_RATIO, DEFAULT_OFFSET_DELTA};

pub const DEFAULT_MIN_ECO_IMPACT_SCORE: f64 = 0.88;
pub const DEFAULT_MIN_SPRAWL_REDUCTION_PERCENT: f64 = 12.0;

/// Planner configuration. Immutable once handed to [`crate::SitePlanner`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct PlannerConfig {
    #[serde(default)]
    pub planning: PlanningConfig,
    #[serde(default)]
    pub candidates: CandidateConfig,
    #[serde(default)]
    pub baseline: BaselineConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct PlanningConfig {
    /// Eco-impact score a candidate must reach to be emitted.
    #[serde(default = "default_min_eco_impact_score")]
    pub min_eco_impact_score: f64,
    /// Sprawl reduction (percent) a candidate must reach to be emitted.
    #[serde(default = "default_min_sprawl_reduction_percent")]
    pub min_sprawl_reduction_percent: f64,
    /// Require candidates to lie within every extracted corridor.
    #[serde(default)]
    pub enforce_corridor_containment: bool,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            min_eco_impact_score: DEFAULT_MIN_ECO_IMPACT_SCORE,
            min_sprawl_reduction_percent: DEFAULT_MIN_SPRAWL_REDUCTION_PERCENT,
            enforce_corridor_containment: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStrategy {
    /// Rectangular footprints inside the corridor envelope.
    #[default]
    EnvelopeFootprint,
    /// Bare points at the envelope centroid.
    CentroidPoints,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct CandidateConfig {
    #[serde(default)]
    pub strategy: CandidateStrategy,
    /// Offset applied to the second candidate on both axes.
    #[serde(default = "default_offset_delta")]
    pub offset_delta: f64,
    /// Footprint area as a fraction of the corridor envelope area.
    #[serde(default = "default_footprint_area_ratio")]
    pub footprint_area_ratio: f64,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            strategy: CandidateStrategy::default(),
            offset_delta: DEFAULT_OFFSET_DELTA,
            footprint_area_ratio: DEFAULT_FOOTPRINT_AREA_RATIO,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
    /// The corridor's bounding envelope.
    #[default]
    CorridorEnvelope,
    /// No baseline; the scorer applies its synthetic stand-in.
    Synthetic,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct BaselineConfig {
    /// Used when no eco-impact kernel shard carries a baseline geometry.
    #[serde(default)]
    pub source: BaselineSource,
}

fn default_min_eco_impact_score() -> f64 {
    DEFAULT_MIN_ECO_IMPACT_SCORE
}

fn default_min_sprawl_reduction_percent() -> f64 {
    DEFAULT_MIN_SPRAWL_REDUCTION_PERCENT
}

fn default_offset_delta() -> f64 {
    DEFAULT_OFFSET_DELTA
}

fn default_footprint_area_ratio() -> f64 {
    DEFAULT_FOOTPRINT_AREA_RATIO
}

impl Validate for PlannerConfig {
    fn validate(&self) -> Result<(), ContractError> {
        let planning = &self.planning;
        if !(0.0..=1.0).contains(&planning.min_eco_impact_score) {
            return Err(ContractError::AssertionFailed(
                "min_eco_impact_score must be between 0 and 1",
            ));
        }
        if !planning.min_sprawl_reduction_percent.is_finite()
            || planning.min_sprawl_reduction_percent > 100.0
        {
            return Err(ContractError::AssertionFailed(
                "min_sprawl_reduction_percent must be a finite value no greater than 100",
            ));
        }
        let candidates = &self.candidates;
        if !(candidates.footprint_area_ratio > 0.0 && candidates.footprint_area_ratio <= 1.0) {
            return Err(ContractError::AssertionFailed(
                "footprint_area_ratio must be in (0, 1]",
            ));
        }
        if !candidates.offset_delta.is_finite() || candidates.offset_delta < 0.0 {
            return Err(ContractError::AssertionFailed(
                "offset_delta must be a finite, non-negative value",
            ));
        }
        Ok(())
    }
}

static CONFIG_SCHEMA: Lazy<Validator> = Lazy::new(|| {
    let schema_value = config_schema_json();
    validator_for(&schema_value).expect("valid schema")
});

/// Returns the JSON schema describing the configuration structure.
///
/// # Panics
///
/// Panics if schema generation fails; this indicates a programming error.
pub fn config_schema_json() -> serde_json::Value {
    let schema = schemars::schema_for!(PlannerConfig);
    serde_json::to_value(&schema).expect("schema json")
}

pub fn write_schema_file(path: &str) -> std::io::Result<()> {
    let schema_json = config_schema_json();
    std::fs::write(path, serde_json::to_string_pretty(&schema_json)?)
}

pub fn load_config(path: &str) -> Result<PlannerConfig> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
    let raw: toml::Value = toml::from_str(&content)?;
    let json_value = serde_json::to_value(&raw)?;
    let validation_errors: Vec<_> = CONFIG_SCHEMA
        .iter_errors(&json_value)
        .map(|e| e.to_string())
        .collect();
    if !validation_errors.is_empty() {
        return Err(anyhow!(validation_errors.join(", ")));
    }
    let cfg: PlannerConfig = toml::from_str(&content)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `SITEPLAN_CONFIG` (if set), then apply `SITEPLAN_*` overrides.
pub fn load_from_env() -> Result<PlannerConfig> {
    let base = match std::env::var("SITEPLAN_CONFIG") {
        Ok(path) if !path.trim().is_empty() => load_config(&path)?,
        _ => PlannerConfig::default(),
    };
    apply_env_overrides(base, |key| std::env::var(key).ok())
}

/// Apply threshold overrides read through `lookup` and re-validate.
pub fn apply_env_overrides<F>(mut cfg: PlannerConfig, lookup: F) -> Result<PlannerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup("SITEPLAN_MIN_ECO_IMPACT_SCORE") {
        cfg.planning.min_eco_impact_score = raw
            .trim()
            .parse()
            .with_context(|| format!("SITEPLAN_MIN_ECO_IMPACT_SCORE={raw}"))?;
    }
    if let Some(raw) = lookup("SITEPLAN_MIN_SPRAWL_REDUCTION_PERCENT") {
        cfg.planning.min_sprawl_reduction_percent = raw
            .trim()
            .parse()
            .with_context(|| format!("SITEPLAN_MIN_SPRAWL_REDUCTION_PERCENT={raw}"))?;
    }
    if let Some(raw) = lookup("SITEPLAN_ENFORCE_CONTAINMENT") {
        cfg.planning.enforce_corridor_containment =
            matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }
    cfg.validate()?;
    Ok(cfg)
}
