use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::ClinicStore;

/// Shared router state: configuration plus the store handles every cell queries.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: ClinicStore,
}

impl AppState {
    pub fn new(config: AppConfig, store: ClinicStore) -> Self {
        Self { config, store }
    }

    pub fn from_config(config: AppConfig) -> Self {
        let store = ClinicStore::from_config(&config);
        Self { config, store }
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
