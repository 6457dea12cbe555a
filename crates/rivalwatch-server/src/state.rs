use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use rivalwatch_ai::TextGenerator;
use rivalwatch_enrich::CompanyDataProvider;
use rivalwatch_storage::IntelStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<IntelStore>,
    /// `None` when no enrichment API key is configured.
    pub enricher: Option<Arc<dyn CompanyDataProvider>>,
    /// `None` when no AI API key is configured.
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub start_time: DateTime<Utc>,
    pub jwt_secret: Arc<String>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<IntelStore>,
        config: ServerConfig,
        jwt_secret: String,
        enricher: Option<Arc<dyn CompanyDataProvider>>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            store,
            enricher,
            generator,
            start_time: Utc::now(),
            jwt_secret: Arc::new(jwt_secret),
            config: Arc::new(config),
        }
    }

    pub fn enricher(&self) -> Option<&dyn CompanyDataProvider> {
        self.enricher.as_deref()
    }

    pub fn generator(&self) -> Option<&dyn TextGenerator> {
        self.generator.as_deref()
    }
}
