use std::sync::Arc;
use trackercache_core::{CacheStore, Config, IndexerInfo, LiveSettings, ResultsService, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    settings: Arc<LiveSettings>,
    service: Arc<ResultsService>,
}

impl AppState {
    pub fn new(config: Config, settings: Arc<LiveSettings>, service: Arc<ResultsService>) -> Self {
        Self {
            config,
            settings,
            service,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn settings(&self) -> &LiveSettings {
        self.settings.as_ref()
    }

    pub fn service(&self) -> &ResultsService {
        self.service.as_ref()
    }

    pub fn cache(&self) -> &CacheStore {
        self.service.cache().as_ref()
    }

    pub fn indexers(&self) -> Vec<IndexerInfo> {
        self.service.indexers()
    }
}
