use std::sync::Arc;

use siteplan_core::{PlannerConfig, SitePlanner};

pub(crate) const SERVICE_NAME: &str = "siteplan-server";

#[derive(Clone)]
pub(crate) struct AppState {
    planner: Arc<SitePlanner>,
    config: Arc<PlannerConfig>,
}

impl AppState {
    pub(crate) fn new(config: PlannerConfig) -> Self {
        Self {
            planner: Arc::new(SitePlanner::new(&config)),
            config: Arc::new(config),
        }
    }

    pub(crate) fn planner(&self) -> Arc<SitePlanner> {
        self.planner.clone()
    }

    pub(crate) fn config(&self) -> &PlannerConfig {
        &self.config
    }
}
