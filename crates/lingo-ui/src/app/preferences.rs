//! Persistence and environment helpers for the app shell.

use gloo::console;
use gloo::storage::{LocalStorage, Storage};

use crate::core::config::ClientConfig;
use crate::core::token::TokenStore;
use crate::services::browser::LocalStorageCredentials;

pub(crate) const API_BASE_URL_KEY: &str = "lingo.api_base_url";

/// Client configuration with an optional persisted base URL override.
pub(crate) fn load_config() -> ClientConfig {
    let mut config = ClientConfig::default();
    if let Ok(value) = LocalStorage::get::<String>(API_BASE_URL_KEY) {
        if !value.trim().is_empty() {
            config.api_base_url = value.trim().to_string();
        }
    }
    match config.validate() {
        Ok(()) => config,
        Err(err) => {
            console::error!(format!("ignoring stored configuration: {err}"));
            ClientConfig::default()
        }
    }
}

/// Token store persisted under the configured storage key.
pub(crate) fn credential_store(config: &ClientConfig) -> TokenStore {
    TokenStore::new(LocalStorageCredentials::new(config.token_storage_key.clone()))
}
