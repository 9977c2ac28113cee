//! Admissibility gate over an incoming shard set.
//!
//! Checks run in a fixed order and the first failure wins, so callers always
//! see one deterministic diagnostic.

use std::sync::Arc;

use siteplan_contracts::{ShardEnvelope, ShardKind};
use tracing::debug;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShardValidationError {
    #[error("No shards supplied; governance requires corridor + eco-impact + risk shards.")]
    NoShards,
    #[error("Shard grammarVersionId mismatch; all shards must match request grammarVersionId.")]
    GrammarMismatch { shard_id: String, found: String },
    #[error("Missing required shard types: {}.", join_kinds(.missing))]
    MissingTypes { missing: Vec<ShardKind> },
    #[error("All shards must specify schemaDid for DID-signed validation.")]
    MissingSchemaRef { shard_id: String },
}

fn join_kinds(kinds: &[ShardKind]) -> String {
    kinds
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Decides whether a shard's schema reference is acceptable. Signature and
/// schema verification plug in here.
pub trait SchemaRegistry: Send + Sync {
    fn admits(&self, shard: &ShardEnvelope) -> bool;
}

/// Accepts any non-blank schema reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceOnlyRegistry;

impl SchemaRegistry for PresenceOnlyRegistry {
    fn admits(&self, shard: &ShardEnvelope) -> bool {
        !shard.schema_ref.trim().is_empty()
    }
}

struct ValidationInput<'a> {
    shards: &'a [ShardEnvelope],
    grammar_version_id: &'a str,
    registry: &'a dyn SchemaRegistry,
}

type Check = fn(&ValidationInput<'_>) -> Result<(), ShardValidationError>;

const CHECKS: [Check; 4] = [
    shards_present,
    grammar_versions_match,
    required_types_present,
    schema_refs_admitted,
];

fn shards_present(input: &ValidationInput<'_>) -> Result<(), ShardValidationError> {
    if input.shards.is_empty() {
        return Err(ShardValidationError::NoShards);
    }
    Ok(())
}

fn grammar_versions_match(input: &ValidationInput<'_>) -> Result<(), ShardValidationError> {
    match input
        .shards
        .iter()
        .find(|s| s.grammar_version_id != input.grammar_version_id)
    {
        Some(shard) => Err(ShardValidationError::GrammarMismatch {
            shard_id: shard.shard_id.clone(),
            found: shard.grammar_version_id.clone(),
        }),
        None => Ok(()),
    }
}

fn required_types_present(input: &ValidationInput<'_>) -> Result<(), ShardValidationError> {
    let missing: Vec<ShardKind> = ShardKind::REQUIRED
        .into_iter()
        .filter(|kind| !input.shards.iter().any(|s| s.is_kind(*kind)))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ShardValidationError::MissingTypes { missing })
    }
}

fn schema_refs_admitted(input: &ValidationInput<'_>) -> Result<(), ShardValidationError> {
    match input.shards.iter().find(|s| !input.registry.admits(s)) {
        Some(shard) => Err(ShardValidationError::MissingSchemaRef {
            shard_id: shard.shard_id.clone(),
        }),
        None => Ok(()),
    }
}

#[derive(Clone)]
pub struct ShardValidator {
    registry: Arc<dyn SchemaRegistry>,
}

impl Default for ShardValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShardValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardValidator").finish_non_exhaustive()
    }
}

impl ShardValidator {
    pub fn new() -> Self {
        Self::with_registry(Arc::new(PresenceOnlyRegistry))
    }

    pub fn with_registry(registry: Arc<dyn SchemaRegistry>) -> Self {
        Self { registry }
    }

    pub fn validate(
        &self,
        shards: &[ShardEnvelope],
        required_grammar_version_id: &str,
    ) -> Result<(), ShardValidationError> {
        let input = ValidationInput {
            shards,
            grammar_version_id: required_grammar_version_id,
            registry: self.registry.as_ref(),
        };
        CHECKS.iter().try_for_each(|check| check(&input))?;
        debug!(
            target: "siteplan::validation",
            shards = shards.len(),
            grammar = required_grammar_version_id,
            "shard set admitted"
        );
        Ok(())
    }
}
