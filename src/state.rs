use std::sync::Arc;

use crate::config::Config;
use crate::preview::PreviewClient;

/// Shared application state passed to all handlers.
/// Holds only process-wide configuration and the pooled upstream client;
/// nothing request-specific lives here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub preview: PreviewClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let preview = PreviewClient::new(&config)?;
        Ok(AppState {
            config: Arc::new(config),
            preview,
        })
    }
}
