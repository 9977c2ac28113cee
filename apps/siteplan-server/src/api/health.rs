use axum::Json;
use serde_json::{json, Value};

use crate::app_state::SERVICE_NAME;

pub(crate) async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "timeUtc": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    }))
}

pub(crate) async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true }))
}
