use std::sync::Arc;

use crate::config::HubConfig;
use crate::provider::{HistoryProvider, ProviderError, YahooProvider};

/// Shared application state, passed to all route handlers via `axum::extract::State`.
pub struct AppState {
    pub config: HubConfig,
    pub provider: Arc<dyn HistoryProvider>,
}

impl AppState {
    pub fn new(config: HubConfig) -> Result<Arc<Self>, ProviderError> {
        let provider = Arc::new(YahooProvider::new(&config)?);
        Ok(Arc::new(Self { config, provider }))
    }

    /// Build state around an arbitrary provider, so tests can substitute
    /// a stub for the real client.
    #[cfg(test)]
    pub fn with_provider(config: HubConfig, provider: Arc<dyn HistoryProvider>) -> Arc<Self> {
        Arc::new(Self { config, provider })
    }
}
