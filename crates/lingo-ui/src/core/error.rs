//! Error taxonomy for outbound calls.
//!
//! # Design
//! - `ApiError` covers transport failures (network, non-2xx, decode).
//! - `RequestError` is what operations record in their `Failed` status; it
//!   adds failures synthesized locally that never reach the network.

use lingo_api_models::ErrorBody;
use thiserror::Error;

/// Transport-level failure for a single call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not be delivered or no response arrived.
    #[error("network request failed")]
    Network {
        /// Underlying client error detail.
        detail: String,
    },
    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided error message, when one could be extracted.
        detail: Option<String>,
    },
    /// The response body did not match the expected shape.
    #[error("failed to decode response body")]
    Decode {
        /// Decoder error detail.
        detail: String,
    },
    /// The request body could not be encoded for the chosen content type.
    #[error("failed to encode request body")]
    Encode {
        /// Encoder error detail.
        detail: String,
    },
}

impl ApiError {
    /// Build a status error from a non-2xx response body.
    ///
    /// The body is parsed as an [`ErrorBody`] first; otherwise its trimmed
    /// text is used as the detail when non-empty.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.message())
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
            });
        Self::Status { status, detail }
    }

    /// HTTP status associated with the failure, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network { .. } | Self::Decode { .. } | Self::Encode { .. } => None,
        }
    }

    /// Server-provided detail message, if any.
    #[must_use]
    pub fn server_detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            Self::Network { .. } | Self::Decode { .. } | Self::Encode { .. } => None,
        }
    }
}

/// Failure captured into an operation's `Failed` status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The call reached the transport and failed there.
    #[error(transparent)]
    Transport(#[from] ApiError),
    /// The call requires a credential and none is held.
    #[error("no credential available")]
    MissingCredential,
    /// A request field failed local validation.
    #[error("invalid request field `{field}`")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

impl RequestError {
    /// Message suitable for display: the server detail when present, else `fallback`.
    #[must_use]
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            Self::Transport(err) => err
                .server_detail()
                .map_or_else(|| fallback.to_string(), str::to_string),
            Self::Invalid { reason, .. } => reason.clone(),
            Self::MissingCredential => fallback.to_string(),
        }
    }
}
