//! Browser backends: `gloo-net` transport and `localStorage` credentials.
//!
//! # Design
//! - The credential is stored as a raw string (not JSON-encoded) so other
//!   scripts reading the same key see the bare token.
//! - Storage failures are logged to the console and treated as absence.

use async_trait::async_trait;
use gloo::console;
use gloo::storage::{LocalStorage, Storage};
use gloo_net::http::Request;

use crate::core::error::ApiError;
use crate::core::token::CredentialStorage;
use crate::core::transport::{ApiRequest, Method, RequestBody, Transport, encode_form, join_url};

/// [`Transport`] over the browser `fetch` API.
#[derive(Clone, Debug)]
pub struct BrowserTransport {
    base_url: String,
}

impl BrowserTransport {
    /// Transport rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

fn network(err: &gloo_net::Error) -> ApiError {
    ApiError::Network {
        detail: err.to_string(),
    }
}

#[async_trait(?Send)]
impl Transport for BrowserTransport {
    async fn send(&self, request: ApiRequest) -> Result<String, ApiError> {
        let url = join_url(&self.base_url, &request.path);
        let mut builder = match request.method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
        };
        if let Some(value) = request.authorization() {
            builder = builder.header("Authorization", &value);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value).map_err(|err| ApiError::Encode {
                detail: err.to_string(),
            })?,
            RequestBody::Form(fields) => builder
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(encode_form(fields)),
        };

        let response = builder.send().await.map_err(|err| network(&err))?;
        let status = response.status();
        let body = response.text().await.map_err(|err| ApiError::Decode {
            detail: err.to_string(),
        })?;
        if !response.ok() {
            return Err(ApiError::from_response(status, &body));
        }
        Ok(body)
    }
}

/// [`CredentialStorage`] persisted in `window.localStorage`.
#[derive(Clone, Debug)]
pub struct LocalStorageCredentials {
    key: String,
}

impl LocalStorageCredentials {
    /// Credentials stored under `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl CredentialStorage for LocalStorageCredentials {
    fn load(&self) -> Option<String> {
        match LocalStorage::raw().get_item(&self.key) {
            Ok(value) => value,
            Err(err) => {
                console::error!(format!("failed to read credential: {err:?}"));
                None
            }
        }
    }

    fn store(&self, token: &str) {
        if let Err(err) = LocalStorage::raw().set_item(&self.key, token) {
            console::error!(format!("failed to persist credential: {err:?}"));
        }
    }

    fn remove(&self) {
        if let Err(err) = LocalStorage::raw().remove_item(&self.key) {
            console::error!(format!("failed to remove credential: {err:?}"));
        }
    }
}
