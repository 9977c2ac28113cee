use serde_json::json;
use siteplan_contracts::ShardEnvelope;
use siteplan_core::{ShardValidationError, ShardValidator};

const GRAMMAR: &str = "ecosafety-grammar-v1";

fn shards(value: serde_json::Value) -> Vec<ShardEnvelope> {
    serde_json::from_value(value).expect("shard list")
}

#[test]
fn wire_shards_with_schema_did_are_admitted() {
    let set = shards(json!([
        { "shardId": "c", "type": "corridor_parameters", "schemaDid": "did:x:c", "grammarVersionId": GRAMMAR },
        { "shardId": "k", "type": "eco_impact_kernel", "schemaDid": "did:x:k", "grammarVersionId": GRAMMAR },
        { "shardId": "r", "type": "risk_of_harm_metadata", "schemaDid": "did:x:r", "grammarVersionId": GRAMMAR },
        { "shardId": "t", "type": "traffic_counts", "schemaDid": "did:x:t", "grammarVersionId": GRAMMAR }
    ]));
    ShardValidator::new()
        .validate(&set, GRAMMAR)
        .expect("admissible");
}

#[test]
fn absent_schema_did_is_rejected() {
    let set = shards(json!([
        { "shardId": "c", "type": "corridor_parameters", "schemaDid": "did:x:c", "grammarVersionId": GRAMMAR },
        { "shardId": "k", "type": "eco_impact_kernel", "grammarVersionId": GRAMMAR },
        { "shardId": "r", "type": "risk_of_harm_metadata", "schemaDid": "did:x:r", "grammarVersionId": GRAMMAR }
    ]));
    let err = ShardValidator::new()
        .validate(&set, GRAMMAR)
        .expect_err("schema missing");
    assert_eq!(
        err,
        ShardValidationError::MissingSchemaRef {
            shard_id: "k".into()
        }
    );
    assert_eq!(
        err.to_string(),
        "All shards must specify schemaDid for DID-signed validation."
    );
}

#[test]
fn missing_types_are_checked_before_schema_refs() {
    let set = shards(json!([
        { "shardId": "c", "type": "corridor_parameters", "grammarVersionId": GRAMMAR }
    ]));
    let err = ShardValidator::new()
        .validate(&set, GRAMMAR)
        .expect_err("missing types");
    assert_eq!(
        err.to_string(),
        "Missing required shard types: eco_impact_kernel,risk_of_harm_metadata."
    );
}

#[test]
fn grammar_is_compared_exactly() {
    let set = shards(json!([
        { "shardId": "c", "type": "corridor_parameters", "schemaDid": "did:x:c", "grammarVersionId": "ECOSAFETY-GRAMMAR-V1" },
        { "shardId": "k", "type": "eco_impact_kernel", "schemaDid": "did:x:k", "grammarVersionId": GRAMMAR },
        { "shardId": "r", "type": "risk_of_harm_metadata", "schemaDid": "did:x:r", "grammarVersionId": GRAMMAR }
    ]));
    let err = ShardValidator::new()
        .validate(&set, GRAMMAR)
        .expect_err("case differs");
    assert!(matches!(
        err,
        ShardValidationError::GrammarMismatch { ref shard_id, .. } if shard_id == "c"
    ));
}
