//! Client configuration.
//!
//! # Design
//! - Every field has a default so a partial JSON document is a valid config.
//! - Validation runs once at boot; downstream code trusts the values.

use lingo_api_models::{DEFAULT_MAX_LENGTH, MAX_LENGTH_RANGE};
use serde::Deserialize;
use thiserror::Error;

/// Default API prefix, resolved relative to the page origin in the browser.
pub const DEFAULT_API_BASE_URL: &str = "/api/v1";

/// Default durable-storage key for the bearer credential.
pub const DEFAULT_TOKEN_STORAGE_KEY: &str = "access_token";

/// Errors raised while loading or validating client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid client configuration field")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// The configuration document could not be parsed.
    #[error("malformed client configuration")]
    Malformed {
        /// Parser error detail.
        detail: String,
    },
}

/// Runtime configuration for the web client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL (or path prefix) prepended to every API call.
    pub api_base_url: String,
    /// Storage key under which the bearer credential is persisted.
    pub token_storage_key: String,
    /// Output length sent with translate calls unless overridden.
    pub default_max_length: u32,
    /// Whether translate calls request a visualization by default.
    pub default_viz: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_storage_key: DEFAULT_TOKEN_STORAGE_KEY.to_string(),
            default_max_length: DEFAULT_MAX_LENGTH,
            default_viz: false,
        }
    }
}

impl ClientConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] when the document is not valid JSON
    /// for this shape, or any error produced by [`ClientConfig::validate`].
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|err| ConfigError::Malformed {
            detail: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check field values against the API contract.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] for an empty base URL, an empty
    /// storage key, or a default output length outside the accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "api_base_url",
                value: None,
                reason: "must not be empty",
            });
        }
        if self.token_storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "token_storage_key",
                value: None,
                reason: "must not be empty",
            });
        }
        if !MAX_LENGTH_RANGE.contains(&self.default_max_length) {
            return Err(ConfigError::InvalidField {
                field: "default_max_length",
                value: Some(self.default_max_length.to_string()),
                reason: "must be between 128 and 1024",
            });
        }
        Ok(())
    }
}
