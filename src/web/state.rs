use std::sync::Arc;

use crate::config::{AppConfig, IngestConfig};
use crate::session::{FileSessionStore, SessionStore};

#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    ingest: Arc<IngestConfig>,
    sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let sessions: Arc<dyn SessionStore> =
            Arc::new(FileSessionStore::new(config.session_file.clone()));
        let ingest = Arc::new(config.ingest());
        Self {
            config: Arc::new(config),
            ingest,
            sessions,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn ingest_config(&self) -> &IngestConfig {
        &self.ingest
    }

    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }
}
