//! Governance-gated site planning: admissibility checks over incoming shards,
//! corridor extraction, candidate generation, eco-impact scoring and the
//! feasibility gate, sequenced by [`SitePlanner`].

pub mod cancel;
pub mod candidates;
mod config;
pub mod corridor;
pub mod planner;
pub mod scoring;
pub mod validation;

pub use cancel::{CancelSignal, CancellationFlag, PlanningAborted};
pub use candidates::{CandidateGenerator, CentroidPointGenerator, EnvelopeFootprintGenerator};
pub use config::{
    apply_env_overrides, config_schema_json, load_config, load_from_env, write_schema_file,
    BaselineConfig, BaselineSource, CandidateConfig, CandidateStrategy, PlannerConfig,
    PlanningConfig,
};
pub use corridor::{extract_corridors, is_within_all_corridors, ContainmentPolicy, Corridor};
pub use planner::{FeasibilityThresholds, SitePlanner};
pub use scoring::{ImpactScore, ImpactScorer, SprawlReductionScorer};
pub use validation::{PresenceOnlyRegistry, SchemaRegistry, ShardValidationError, ShardValidator};
