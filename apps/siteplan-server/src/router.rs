use axum::{
    routing::{get, post},
    Router,
};

use crate::{api, AppState};

pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/planning/sites", post(api::planning::plan_sites))
        .route("/api/planning/config", get(api::planning::planning_config))
        .route("/api/health", get(api::health::health))
        .route("/healthz", get(api::health::healthz))
        .with_state(state)
}
