//! Application state shared by the handlers

use std::sync::Arc;

use crate::config::AppConfig;
use crate::infrastructure::services::HierarchyService;

#[derive(Clone)]
pub struct AppState {
    pub hierarchy: Arc<HierarchyService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(hierarchy: Arc<HierarchyService>, config: AppConfig) -> Self {
        Self {
            hierarchy,
            config: Arc::new(config),
        }
    }
}
