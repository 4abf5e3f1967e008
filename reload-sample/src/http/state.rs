use std::sync::Arc;

use crate::config::AppConfig;
use crate::token::{KeyProvider, StaticKey, TokenIssuer};

/// Read-only settings shared by every handler. Nothing here changes after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service_name: Arc<str>,
    pub reload_marker: Arc<str>,
    pub hash_cost: u32,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let keys: Arc<dyn KeyProvider> = match config.token_signing_key.as_deref() {
            Some(secret) => Arc::new(StaticKey::new(secret)),
            None => Arc::new(StaticKey::demo()),
        };

        Self {
            service_name: Arc::from(config.service_name.as_str()),
            reload_marker: Arc::from(config.reload_marker.as_str()),
            hash_cost: config.hash_cost,
            tokens: TokenIssuer::new(keys),
        }
    }
}
