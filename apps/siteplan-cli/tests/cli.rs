use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn bin() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("siteplan").expect("binary");
    for key in [
        "SITEPLAN_CONFIG",
        "SITEPLAN_MIN_ECO_IMPACT_SCORE",
        "SITEPLAN_MIN_SPRAWL_REDUCTION_PERCENT",
        "SITEPLAN_ENFORCE_CONTAINMENT",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../crates/siteplan-core/tests/data")
        .join(name)
}

#[test]
fn plan_prints_feasible_options() {
    let output = bin()
        .arg("plan")
        .arg("--request")
        .arg(fixture("sample_request_inside_corridors.json"))
        .output()
        .expect("run plan");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(body["grammarVersionId"], "ecosafety-grammar-v1");
    assert_eq!(body["scenarioId"], "phoenix-west-demo");
    assert_eq!(body["options"].as_array().map(Vec::len), Some(2));
}

#[test]
fn strict_threshold_flag_yields_no_options() {
    bin()
        .arg("plan")
        .arg("--request")
        .arg(fixture("sample_request_inside_corridors.json"))
        .arg("--min-sprawl")
        .arg("50")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""options":[]"#));
}

#[test]
fn config_file_thresholds_apply() {
    bin()
        .arg("plan")
        .arg("--request")
        .arg(fixture("sample_request_inside_corridors.json"))
        .arg("--config")
        .arg(fixture("planner_strict.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""options":[]"#));
}

#[test]
fn emit_shards_prints_site_option_shards() {
    let output = bin()
        .arg("plan")
        .arg("--request")
        .arg(fixture("sample_request_inside_corridors.json"))
        .arg("--emit-shards")
        .output()
        .expect("run plan");
    assert!(output.status.success());
    let shards: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    let shards = shards.as_array().expect("array");
    assert_eq!(shards.len(), 2);
    for shard in shards {
        assert!(shard["shardId"]
            .as_str()
            .expect("shard id")
            .starts_with("flowvac_site_option:"));
        assert_eq!(shard["payload"]["geometry"]["type"], "Polygon");
    }
}

#[test]
fn rejected_request_exits_with_error_body() {
    let tmp = tempdir().expect("tmpdir");
    let request = tmp.path().join("no-corridor.json");
    fs::write(
        &request,
        r#"{"grammarVersionId":"ecosafety-grammar-v1","shards":[]}"#,
    )
    .expect("write request");

    bin()
        .arg("plan")
        .arg("--request")
        .arg(&request)
        .assert()
        .code(2)
        .stdout(predicate::str::contains(r#""error":"no_corridors""#));
}

#[test]
fn validate_reports_missing_types() {
    let tmp = tempdir().expect("tmpdir");
    let request = tmp.path().join("partial.json");
    fs::write(
        &request,
        r#"{
  "grammarVersionId": "ecosafety-grammar-v1",
  "shards": [
    { "shardId": "c", "type": "corridor_parameters", "schemaDid": "did:x:c", "grammarVersionId": "ecosafety-grammar-v1" }
  ]
}"#,
    )
    .expect("write request");

    bin()
        .arg("validate")
        .arg("--request")
        .arg(&request)
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "Missing required shard types: eco_impact_kernel,risk_of_harm_metadata.",
        ));
}

#[test]
fn validate_admits_fixture() {
    bin()
        .arg("validate")
        .arg("--request")
        .arg(fixture("sample_request_inside_corridors.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("admissible: 3 shard(s)"));
}

#[test]
fn config_schema_writes_file() {
    let tmp = tempdir().expect("tmpdir");
    let out = tmp.path().join("planner.schema.json");
    bin()
        .arg("config-schema")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));
    let text = fs::read_to_string(&out).expect("read schema");
    assert!(text.contains("min_eco_impact_score"));
}

#[test]
fn missing_request_file_fails() {
    bin()
        .arg("plan")
        .arg("--request")
        .arg("/nonexistent/request.json")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("reading request"));
}
