use std::collections::BTreeMap;

use siteplan_contracts::{
    PlanningErrorCode, PlanningOption, PlanningRequest, PlanningResult, ShardEnvelope, ShardKind,
    Validate, METRIC_BASELINE_AREA, METRIC_CANDIDATE_AREA, METRIC_ECO_IMPACT_SCORE,
    METRIC_SPRAWL_REDUCTION_PERCENT,
};
use siteplan_geo::Geometry;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::cancel::{CancelSignal, PlanningAborted};
use crate::candidates::{generator_for, CandidateGenerator};
use crate::config::{BaselineSource, PlannerConfig};
use crate::corridor::{extract_corridors, ContainmentPolicy, Corridor};
use crate::scoring::{ImpactScore, ImpactScorer, SprawlReductionScorer};
use crate::validation::ShardValidator;

pub const NO_CORRIDORS_MESSAGE: &str = "No corridor geometries available; cannot propose sites.";

/// Minimums a candidate must meet on both axes to be reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeasibilityThresholds {
    pub min_eco_impact_score: f64,
    pub min_sprawl_reduction_percent: f64,
}

impl FeasibilityThresholds {
    pub fn admits(&self, score: &ImpactScore) -> bool {
        score.eco_impact_score >= self.min_eco_impact_score
            && score.sprawl_reduction_percent >= self.min_sprawl_reduction_percent
    }
}

impl From<&PlannerConfig> for FeasibilityThresholds {
    fn from(cfg: &PlannerConfig) -> Self {
        Self {
            min_eco_impact_score: cfg.planning.min_eco_impact_score,
            min_sprawl_reduction_percent: cfg.planning.min_sprawl_reduction_percent,
        }
    }
}

/// Sequences validation, corridor extraction, candidate generation, scoring
/// and the feasibility gate for one request at a time. Immutable after
/// construction and safe to share across threads.
pub struct SitePlanner {
    thresholds: FeasibilityThresholds,
    containment: ContainmentPolicy,
    baseline_source: BaselineSource,
    validator: ShardValidator,
    generator: Box<dyn CandidateGenerator>,
    scorer: Box<dyn ImpactScorer>,
}

impl Default for SitePlanner {
    fn default() -> Self {
        Self::new(&PlannerConfig::default())
    }
}

impl std::fmt::Debug for SitePlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SitePlanner")
            .field("thresholds", &self.thresholds)
            .field("containment", &self.containment)
            .field("baseline_source", &self.baseline_source)
            .field("generator", &self.generator.name())
            .finish_non_exhaustive()
    }
}

impl SitePlanner {
    pub fn new(cfg: &PlannerConfig) -> Self {
        Self {
            thresholds: FeasibilityThresholds::from(cfg),
            containment: ContainmentPolicy::from_flag(cfg.planning.enforce_corridor_containment),
            baseline_source: cfg.baseline.source,
            validator: ShardValidator::new(),
            generator: generator_for(&cfg.candidates),
            scorer: Box::new(SprawlReductionScorer),
        }
    }

    pub fn with_generator(mut self, generator: Box<dyn CandidateGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_scorer(mut self, scorer: Box<dyn ImpactScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_validator(mut self, validator: ShardValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn thresholds(&self) -> FeasibilityThresholds {
        self.thresholds
    }

    pub fn containment(&self) -> ContainmentPolicy {
        self.containment
    }

    /// Run the pipeline. Admissibility and corridor failures come back as a
    /// failed [`PlanningResult`]; `Err` means the caller raised `cancel`.
    pub fn plan(
        &self,
        request: &PlanningRequest,
        cancel: &dyn CancelSignal,
    ) -> Result<PlanningResult, PlanningAborted> {
        let span = info_span!(
            target: "siteplan::planning",
            "plan",
            grammar = %request.grammar_version_id,
            scenario = request.scenario_id.as_deref().unwrap_or(""),
            planner_label = request.planner_label.as_deref().unwrap_or("")
        );
        let _enter = span.enter();

        let fail = |code: PlanningErrorCode, message: String| {
            info!(target: "siteplan::planning", code = %code, %message, "planning rejected");
            PlanningResult::failed(
                request.grammar_version_id.clone(),
                request.scenario_id.clone(),
                code,
                message,
            )
        };

        // A request without any corridor shard cannot produce sites whatever
        // else is wrong with it.
        if !request
            .shards
            .iter()
            .any(|s| s.is_kind(ShardKind::CorridorParameters))
        {
            return Ok(fail(PlanningErrorCode::NoCorridors, NO_CORRIDORS_MESSAGE.into()));
        }

        if let Err(err) = self
            .validator
            .validate(&request.shards, &request.grammar_version_id)
        {
            return Ok(fail(PlanningErrorCode::ShardValidationFailed, err.to_string()));
        }

        let corridors = extract_corridors(&request.shards);
        if corridors.is_empty() {
            return Ok(fail(PlanningErrorCode::NoCorridors, NO_CORRIDORS_MESSAGE.into()));
        }

        let kernel_baseline = kernel_baseline(&request.shards);
        let mut evaluated = 0usize;
        let mut options = Vec::new();

        for corridor in &corridors {
            let baseline = self.baseline_for(corridor, kernel_baseline.as_ref());
            for candidate in self.generator.generate(&corridor.geometry) {
                if cancel.is_cancelled() {
                    warn!(target: "siteplan::planning", evaluated, "planning cancelled");
                    return Err(PlanningAborted { evaluated });
                }
                evaluated += 1;

                let score = self.scorer.score(&candidate, baseline.as_ref());
                if !self.thresholds.admits(&score) {
                    debug!(
                        target: "siteplan::planning",
                        corridor = %corridor.source_shard_id,
                        eco = score.eco_impact_score,
                        sprawl = score.sprawl_reduction_percent,
                        "candidate below feasibility thresholds"
                    );
                    continue;
                }
                if !self.containment.admits(&candidate, &corridors) {
                    debug!(
                        target: "siteplan::planning",
                        corridor = %corridor.source_shard_id,
                        "candidate outside corridor set"
                    );
                    continue;
                }
                options.push(materialize(corridor, &candidate, &score));
            }
        }

        info!(
            target: "siteplan::planning",
            corridors = corridors.len(),
            evaluated,
            options = options.len(),
            generator = self.generator.name(),
            "planning complete"
        );
        Ok(PlanningResult::succeeded(
            request.grammar_version_id.clone(),
            request.scenario_id.clone(),
            options,
        ))
    }

    fn baseline_for(&self, corridor: &Corridor, kernel: Option<&Geometry>) -> Option<Geometry> {
        if let Some(geometry) = kernel {
            return Some(geometry.clone());
        }
        match self.baseline_source {
            BaselineSource::CorridorEnvelope => corridor
                .geometry
                .envelope()
                .map(|env| Geometry::Polygon(env.to_polygon())),
            BaselineSource::Synthetic => None,
        }
    }
}

/// First parseable `baselineGeometry` on an eco-impact kernel shard.
fn kernel_baseline(shards: &[ShardEnvelope]) -> Option<Geometry> {
    shards
        .iter()
        .filter(|s| s.is_kind(ShardKind::EcoImpactKernel))
        .find_map(|shard| match shard.payload.baseline_geometry()? {
            Ok(geometry) => Some(geometry),
            Err(err) => {
                warn!(
                    target: "siteplan::planning",
                    shard_id = %shard.shard_id,
                    error = %err,
                    "ignoring kernel baseline"
                );
                None
            }
        })
}

fn materialize(corridor: &Corridor, candidate: &Geometry, score: &ImpactScore) -> PlanningOption {
    let id = Uuid::new_v4().simple().to_string();
    let metrics = BTreeMap::from([
        (METRIC_ECO_IMPACT_SCORE.to_string(), score.eco_impact_score),
        (
            METRIC_SPRAWL_REDUCTION_PERCENT.to_string(),
            score.sprawl_reduction_percent,
        ),
        (METRIC_CANDIDATE_AREA.to_string(), score.candidate_area),
        (METRIC_BASELINE_AREA.to_string(), score.baseline_area),
    ]);
    let option = PlanningOption {
        planning_shard_id: PlanningOption::planning_shard_id_for(&id),
        id,
        feasible: true,
        eco_impact_score: score.eco_impact_score,
        sprawl_reduction_percent: score.sprawl_reduction_percent,
        source_shard_id: corridor.source_shard_id.clone(),
        geometry_geo_json: siteplan_geo::to_geojson_string(candidate),
        metrics,
    };
    debug_assert!(option.validate().is_ok());
    option
}
