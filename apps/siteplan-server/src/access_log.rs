use std::time::Instant;

use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use once_cell::sync::Lazy;
use siteplan_otel::ACCESS_TARGET;

static ENABLED: Lazy<bool> = Lazy::new(|| {
    ["SITEPLAN_ACCESS_LOG", "SITEPLAN_ACCESS_LOG_ROLL"]
        .iter()
        .any(|key| std::env::var(key).ok().as_deref() == Some("1"))
});

/// One `http.access` event per request, keyed by the matched route.
pub(crate) async fn access_log_mw(req: Request<axum::body::Body>, next: Next) -> Response {
    if !*ENABLED {
        return next.run(req).await;
    }
    let started = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let res = next.run(req).await;
    tracing::info!(
        target: ACCESS_TARGET,
        ts = %chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        method = %method,
        path = %path,
        status = res.status().as_u16(),
        dur_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    res
}
