use anyhow::Context;
use tracing::{info, warn};

mod access_log;
mod api;
mod app_state;
mod bootstrap;
mod responses;
mod router;

pub(crate) use app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    siteplan_otel::init();

    let config = siteplan_core::load_from_env().context("loading planner configuration")?;
    let http_cfg = bootstrap::http_config_from_env()?;
    info!(
        min_eco_impact_score = config.planning.min_eco_impact_score,
        min_sprawl_reduction_percent = config.planning.min_sprawl_reduction_percent,
        enforce_containment = config.planning.enforce_corridor_containment,
        "planner configured"
    );

    let state = AppState::new(config);
    let app = bootstrap::attach_http_layers(router::build_router(state), http_cfg.concurrency_limit);

    let listener = tokio::net::TcpListener::bind(http_cfg.addr)
        .await
        .with_context(|| format!("binding {}", http_cfg.addr))?;
    info!(addr = %http_cfg.addr, "siteplan-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server exited with error")?;
    info!("siteplan-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(%err, "SIGTERM handler unavailable; waiting for ctrl-c only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutdown signal received");
}
