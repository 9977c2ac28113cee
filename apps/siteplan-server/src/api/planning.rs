use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use siteplan_contracts::{PlanningErrorBody, PlanningRequest, PlanningResult, SitePlanningResponse};
use siteplan_core::{PlannerConfig, PlanningAborted, SitePlanner};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{responses, AppState};

pub(crate) async fn plan_sites(
    State(state): State<AppState>,
    payload: Result<Json<PlanningRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(&rejection),
    };
    run_plan(state.planner(), request, CancellationToken::new()).await
}

/// Runs the planner on the blocking pool. If the client goes away the
/// handler future is dropped, and the armed guard cancels `token`.
async fn run_plan(
    planner: Arc<SitePlanner>,
    request: PlanningRequest,
    token: CancellationToken,
) -> Response {
    let guard = token.clone().drop_guard();
    let outcome =
        tokio::task::spawn_blocking(move || planner.plan(&request, &|| token.is_cancelled()))
            .await;
    guard.disarm();

    match outcome {
        Ok(Ok(result)) => planning_response(&result),
        Ok(Err(aborted)) => aborted_response(&aborted),
        Err(err) => {
            error!(
                target: "siteplan::planning",
                error = %err,
                "planning task failed"
            );
            responses::problem_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Planning Failed",
                Some("planning task did not complete"),
            )
        }
    }
}

pub(crate) async fn planning_config(State(state): State<AppState>) -> Json<PlannerConfig> {
    Json(state.config().clone())
}

fn planning_response(result: &PlanningResult) -> Response {
    match PlanningErrorBody::from_result(result) {
        None => {
            info!(
                target: "siteplan::planning",
                options = result.options.len(),
                "site planning request served"
            );
            Json(SitePlanningResponse::from_result(result)).into_response()
        }
        Some(body) => {
            info!(
                target: "siteplan::planning",
                code = %body.error,
                "site planning request rejected"
            );
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}

fn rejection_response(rejection: &JsonRejection) -> Response {
    info!(
        target: "siteplan::planning",
        status = rejection.status().as_u16(),
        "site planning request body rejected"
    );
    let detail = rejection.body_text();
    responses::problem_response(
        StatusCode::BAD_REQUEST,
        "Invalid Planning Request",
        Some(detail.as_str()),
    )
}

fn aborted_response(aborted: &PlanningAborted) -> Response {
    warn!(
        target: "siteplan::planning",
        evaluated = aborted.evaluated,
        "site planning aborted"
    );
    let detail = aborted.to_string();
    responses::problem_response(
        StatusCode::SERVICE_UNAVAILABLE,
        "Planning Aborted",
        Some(detail.as_str()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const GRAMMAR: &str = "ecosafety-grammar-v1";

    fn shard(id: &str, kind: &str, payload: Value) -> Value {
        json!({
            "shardId": id,
            "type": kind,
            "schemaDid": format!("did:example:schema:{kind}:v1"),
            "grammarVersionId": GRAMMAR,
            "payload": payload
        })
    }

    fn sample_request() -> Value {
        json!({
            "grammarVersionId": GRAMMAR,
            "scenarioId": "scn-1",
            "shards": [
                shard("corridor:1", "corridor_parameters", json!({
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[-122.45, 37.70], [-122.35, 37.70], [-122.35, 37.80], [-122.45, 37.80], [-122.45, 37.70]]]
                    }
                })),
                shard("kernel:1", "eco_impact_kernel", json!({})),
                shard("risk:1", "risk_of_harm_metadata", json!({}))
            ]
        })
    }

    fn router(config: PlannerConfig) -> Router {
        crate::router::build_router(AppState::new(config))
    }

    async fn post_sites(router: Router, body: &Value) -> (StatusCode, Value) {
        let request = Request::post("/api/planning/sites")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).expect("serialize request")))
            .expect("request build");
        let response = router.oneshot(request).await.expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn feasible_request_returns_options() {
        let (status, body) = post_sites(router(PlannerConfig::default()), &sample_request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["grammarVersionId"], GRAMMAR);
        assert_eq!(body["scenarioId"], "scn-1");
        let options = body["options"].as_array().expect("options");
        assert_eq!(options.len(), 2);
        for option in options {
            assert_eq!(option["grammarVersionId"], GRAMMAR);
            assert_eq!(option["sourceShardId"], "corridor:1");
            assert!(option["planningShardId"]
                .as_str()
                .expect("shard id")
                .starts_with("flowvac_site_option:"));
            assert!(option["metrics"]["ecoImpactScore"].is_number());
        }
    }

    #[tokio::test]
    async fn strict_thresholds_return_empty_success() {
        let mut config = PlannerConfig::default();
        config.planning.min_sprawl_reduction_percent = 50.0;
        let (status, body) = post_sites(router(config), &sample_request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["options"], json!([]));
    }

    #[tokio::test]
    async fn missing_corridor_maps_to_bad_request() {
        let mut request = sample_request();
        request["shards"]
            .as_array_mut()
            .expect("shards")
            .remove(0);
        let (status, body) = post_sites(router(PlannerConfig::default()), &request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no_corridors");
        assert_eq!(
            body["message"],
            "No corridor geometries available; cannot propose sites."
        );
    }

    #[tokio::test]
    async fn validation_failure_maps_to_bad_request() {
        let mut request = sample_request();
        request["shards"][1]["schemaDid"] = json!("");
        let (status, body) = post_sites(router(PlannerConfig::default()), &request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "shard_validation_failed");
        assert_eq!(
            body["message"],
            "All shards must specify schemaDid for DID-signed validation."
        );
    }

    async fn problem_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("problem json")
    }

    #[tokio::test]
    async fn cancelled_token_aborts_planning() {
        let request: PlanningRequest =
            serde_json::from_value(sample_request()).expect("planning request");
        let token = CancellationToken::new();
        token.cancel();
        let response = run_plan(
            Arc::new(SitePlanner::new(&PlannerConfig::default())),
            request,
            token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let problem = problem_body(response).await;
        assert_eq!(problem["title"], "Planning Aborted");
        assert!(problem["detail"]
            .as_str()
            .expect("detail")
            .contains("0 candidate"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_problem_document() {
        let request = Request::post("/api/planning/sites")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"grammarVersionId\": "))
            .expect("request build");
        let response = router(PlannerConfig::default())
            .oneshot(request)
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let problem = problem_body(response).await;
        assert_eq!(problem["status"], 400);
        assert_eq!(problem["title"], "Invalid Planning Request");
        assert!(problem["detail"].is_string());
    }

    #[tokio::test]
    async fn wrongly_typed_body_is_a_problem_document() {
        let (status, body) =
            post_sites(router(PlannerConfig::default()), &json!({ "shards": "none" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["title"], "Invalid Planning Request");
    }

    #[tokio::test]
    async fn aborted_plan_is_service_unavailable() {
        let response = aborted_response(&PlanningAborted { evaluated: 3 });
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body bytes");
        let problem: Value = serde_json::from_slice(&bytes).expect("problem json");
        assert_eq!(problem["status"], 503);
        assert_eq!(problem["title"], "Planning Aborted");
        assert!(problem["detail"]
            .as_str()
            .expect("detail")
            .contains("3 candidate"));
    }

    #[tokio::test]
    async fn config_endpoint_reports_effective_thresholds() {
        let request = Request::get("/api/planning/config")
            .body(Body::empty())
            .expect("request build");
        let response = router(PlannerConfig::default())
            .oneshot(request)
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body bytes");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["planning"]["min_eco_impact_score"], 0.88);
        assert_eq!(body["candidates"]["strategy"], "envelope_footprint");
    }
}
