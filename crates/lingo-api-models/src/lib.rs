#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Lingo translation API.
//!
//! These types describe the wire contract consumed by the web client: the
//! authentication endpoints (`/auth/login`, `/auth/register`), the session
//! read (`/users/me`), and the translation endpoints (`/translate`,
//! `/translate/batch`). Field bounds mirror the server-side validation so the
//! client can reject out-of-range requests before they reach the network.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default decoder output length requested when the caller does not specify one.
pub const DEFAULT_MAX_LENGTH: u32 = 512;

/// Accepted range for the `max_length` request field.
pub const MAX_LENGTH_RANGE: RangeInclusive<u32> = 128..=1024;

/// Maximum number of characters accepted for a single-translate `text` field.
pub const MAX_TEXT_CHARS: usize = 512;

/// Credentials submitted to the login endpoint as form fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginForm {
    /// Account identifier (the server accepts the email address here).
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

/// Fields submitted to the registration endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterForm {
    /// Display username for the new account.
    pub username: String,
    /// Email address used to sign in.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Authenticated user identity returned by `/users/me`.
///
/// The server never returns password material for this read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Numeric account identifier.
    pub id: i64,
    /// Display username.
    pub username: String,
    /// Account email address.
    pub email: String,
}

/// Bearer credential returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessToken {
    /// Opaque bearer token.
    pub access_token: String,
    /// Token scheme reported by the server (normally `bearer`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Single-text translation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslateRequest {
    /// Source text to translate.
    pub text: String,
    /// Maximum decoder output length.
    pub max_length: u32,
    /// Whether the server should render an attention visualization.
    pub viz: bool,
}

impl TranslateRequest {
    /// Build a request using the default output length and no visualization.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_length: DEFAULT_MAX_LENGTH,
            viz: false,
        }
    }
}

/// Multi-text translation request; translations come back in request order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchTranslateRequest {
    /// Source texts to translate, in display order.
    pub texts: Vec<String>,
    /// Maximum decoder output length.
    pub max_length: u32,
    /// Whether the server should render an attention visualization.
    pub viz: bool,
}

impl BatchTranslateRequest {
    /// Build a request using the default output length and no visualization.
    #[must_use]
    pub const fn new(texts: Vec<String>) -> Self {
        Self {
            texts,
            max_length: DEFAULT_MAX_LENGTH,
            viz: false,
        }
    }
}

/// Response for a single-text translation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslateResponse {
    /// Echo of the submitted text.
    pub original: String,
    /// Translated text.
    pub translation: String,
    /// Outcome marker (`success`).
    #[serde(default = "success_status")]
    pub status: String,
    /// Relative URL of the rendered visualization, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viz_url: Option<String>,
}

/// Response for a batch translation; `translation[i]` answers `texts[i]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchTranslateResponse {
    /// Echo of the submitted texts.
    pub original: Vec<String>,
    /// Translated texts in request order.
    pub translation: Vec<String>,
    /// Outcome marker (`success`).
    #[serde(default = "success_status")]
    pub status: String,
    /// Relative URL of the rendered visualization, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viz_url: Option<String>,
}

fn success_status() -> String {
    "success".to_string()
}

/// Error document returned by the API on non-2xx responses.
///
/// `detail` is either a plain message or a list of validation entries, each
/// carrying a `msg` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    /// Raw detail payload.
    #[serde(default)]
    pub detail: Value,
}

impl ErrorBody {
    /// Human-readable message extracted from the detail payload.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Value::Array(entries) => {
                let messages: Vec<&str> = entries
                    .iter()
                    .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }
}

/// Whether `max_length` falls inside [`MAX_LENGTH_RANGE`].
#[must_use]
pub fn max_length_in_range(max_length: u32) -> bool {
    MAX_LENGTH_RANGE.contains(&max_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn translate_request_defaults_match_server() {
        let request = TranslateRequest::new("hello");
        let value = serde_json::to_value(&request).expect("serialize request");
        assert_eq!(value, json!({"text": "hello", "max_length": 512, "viz": false}));
    }

    #[test]
    fn translate_response_tolerates_null_viz_url() {
        let response: TranslateResponse = serde_json::from_value(json!({
            "original": "hello",
            "translation": "안녕",
            "status": "success",
            "viz_url": null
        }))
        .expect("decode response");
        assert_eq!(response.translation, "안녕");
        assert!(response.viz_url.is_none());
    }

    #[test]
    fn batch_response_defaults_status_when_missing() {
        let response: BatchTranslateResponse = serde_json::from_value(json!({
            "original": ["hello", "world"],
            "translation": ["안녕", "세계"]
        }))
        .expect("decode response");
        assert_eq!(response.status, "success");
        assert_eq!(response.translation, vec!["안녕", "세계"]);
    }

    #[test]
    fn user_ignores_unknown_fields() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "username": "alice",
            "email": "alice@example.com",
            "created_at": "2024-01-01"
        }))
        .expect("decode user");
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn error_body_reads_plain_detail() {
        let body: ErrorBody =
            serde_json::from_value(json!({"detail": "bad credentials"})).expect("decode body");
        assert_eq!(body.message().as_deref(), Some("bad credentials"));
    }

    #[test]
    fn error_body_joins_validation_messages() {
        let body: ErrorBody = serde_json::from_value(json!({
            "detail": [
                {"loc": ["body", "text"], "msg": "field required"},
                {"loc": ["body", "max_length"], "msg": "too small"}
            ]
        }))
        .expect("decode body");
        assert_eq!(body.message().as_deref(), Some("field required; too small"));
    }

    #[test]
    fn error_body_without_detail_has_no_message() {
        let body: ErrorBody = serde_json::from_value(json!({})).expect("decode body");
        assert!(body.message().is_none());
    }

    #[test]
    fn max_length_bounds_are_inclusive() {
        assert!(max_length_in_range(128));
        assert!(max_length_in_range(1024));
        assert!(!max_length_in_range(127));
        assert!(!max_length_in_range(1025));
    }
}
