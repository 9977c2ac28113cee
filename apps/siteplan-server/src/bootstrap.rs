use std::net::SocketAddr;

use axum::Router;

pub(crate) const DEFAULT_BIND: &str = "127.0.0.1:8095";
const DEFAULT_MAX_CONCURRENCY: usize = 256;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum HttpConfigError {
    #[error("invalid SITEPLAN_BIND: {0}")]
    InvalidBind(String),
    #[error("invalid SITEPLAN_HTTP_MAX_CONC: {0}")]
    InvalidConcurrency(String),
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct HttpConfig {
    pub addr: SocketAddr,
    pub concurrency_limit: usize,
}

pub(crate) fn http_config_from_env() -> Result<HttpConfig, HttpConfigError> {
    http_config_from_lookup(|key| std::env::var(key).ok())
}

fn http_config_from_lookup<F>(lookup: F) -> Result<HttpConfig, HttpConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let bind = lookup("SITEPLAN_BIND").unwrap_or_else(|| DEFAULT_BIND.into());
    let addr = bind
        .trim()
        .parse()
        .map_err(|_| HttpConfigError::InvalidBind(bind.clone()))?;
    let concurrency_limit = lookup("SITEPLAN_HTTP_MAX_CONC")
        .map(|raw| match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(HttpConfigError::InvalidConcurrency(raw)),
        })
        .transpose()?
        .unwrap_or(DEFAULT_MAX_CONCURRENCY);
    Ok(HttpConfig {
        addr,
        concurrency_limit,
    })
}

pub(crate) fn attach_http_layers(router: Router, concurrency_limit: usize) -> Router {
    use tower::limit::ConcurrencyLimitLayer;
    use tower_http::trace::TraceLayer;

    router
        .layer(axum::middleware::from_fn(crate::access_log::access_log_mw))
        .layer(TraceLayer::new_for_http())
        .layer(ConcurrencyLimitLayer::new(concurrency_limit))
}
