//! Transport seam and the two API client configurations.
//!
//! # Design
//! - `Transport` performs one HTTP exchange and maps non-2xx to `ApiError`.
//! - `ApiClient` owns body encoding and reads the credential at send time,
//!   so a token change is visible to the very next call.
//! - Two named clients share one transport: JSON bodies for ordinary calls
//!   and form fields for the login endpoint.

use std::rc::Rc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::error::ApiError;
use crate::core::token::TokenStore;

/// HTTP method used by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

/// Content encoding applied to request bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyEncoding {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`
    Form,
}

/// Encoded request body.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON document.
    Json(Value),
    /// Ordered form fields.
    Form(Vec<(String, String)>),
}

/// One outbound call, fully resolved apart from the base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API base, or an absolute URL.
    pub path: String,
    /// Encoded body.
    pub body: RequestBody,
    /// Credential read from the token store when the request was built.
    pub bearer: Option<String>,
}

impl ApiRequest {
    /// `Authorization` header value, present iff a credential was held.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(|token| format!("Bearer {token}"))
    }
}

/// Performs HTTP exchanges for [`ApiClient`].
#[async_trait(?Send)]
pub trait Transport {
    /// Send the request and return the raw response body for 2xx statuses.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] when no response arrives,
    /// [`ApiError::Status`] for non-2xx responses, and [`ApiError::Decode`]
    /// when the body cannot be read.
    async fn send(&self, request: ApiRequest) -> Result<String, ApiError>;
}

/// Join a base URL and a request path.
///
/// Absolute URLs pass through untouched, and paths that already carry the
/// base URL's path prefix (as server-issued links do) are joined to its
/// origin only.
#[must_use]
pub fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base_url.trim_end_matches('/');
    let (origin, prefix) = split_origin(base);
    if !prefix.is_empty()
        && path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
    {
        return format!("{origin}{path}");
    }
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

fn split_origin(base: &str) -> (&str, &str) {
    let Some(scheme_end) = base.find("://").map(|idx| idx + 3) else {
        return ("", base);
    };
    match base[scheme_end..].find('/') {
        Some(slash) => base.split_at(scheme_end + slash),
        None => (base, ""),
    }
}

/// Serialize form fields as `application/x-www-form-urlencoded`.
#[must_use]
pub fn encode_form(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// API client bound to one body encoding.
#[derive(Clone)]
pub struct ApiClient {
    transport: Rc<dyn Transport>,
    tokens: Rc<TokenStore>,
    encoding: BodyEncoding,
}

impl ApiClient {
    /// Client that encodes bodies as JSON.
    #[must_use]
    pub fn json(transport: Rc<dyn Transport>, tokens: Rc<TokenStore>) -> Self {
        Self {
            transport,
            tokens,
            encoding: BodyEncoding::Json,
        }
    }

    /// Client that encodes bodies as form fields.
    #[must_use]
    pub fn form(transport: Rc<dyn Transport>, tokens: Rc<TokenStore>) -> Self {
        Self {
            transport,
            tokens,
            encoding: BodyEncoding::Form,
        }
    }

    /// Encoding applied to request bodies.
    #[must_use]
    pub const fn encoding(&self) -> BodyEncoding {
        self.encoding
    }

    /// `GET` a JSON document.
    ///
    /// # Errors
    ///
    /// Propagates transport failures and returns [`ApiError::Decode`] when
    /// the body does not match `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.get_text(path).await?;
        decode(&body)
    }

    /// `GET` a raw text body.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let request = self.request(Method::Get, path, RequestBody::Empty);
        self.dispatch(request).await
    }

    /// `POST` a body encoded with this client's encoding and decode the reply.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] when the body cannot be expressed in this
    /// client's encoding, propagates transport failures, and returns
    /// [`ApiError::Decode`] when the reply does not match `T`.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.encode(body)?;
        let request = self.request(Method::Post, path, body);
        let reply = self.dispatch(request).await?;
        decode(&reply)
    }

    /// `POST` a body and discard whatever the server replies with.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] when the body cannot be expressed in this
    /// client's encoding and propagates transport failures.
    pub async fn post_discarding<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = self.encode(body)?;
        let request = self.request(Method::Post, path, body);
        self.dispatch(request).await.map(drop)
    }

    fn request(&self, method: Method, path: &str, body: RequestBody) -> ApiRequest {
        ApiRequest {
            method,
            path: path.to_string(),
            body,
            bearer: self.tokens.get(),
        }
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<String, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        tracing::debug!(?method, %path, authorized = request.bearer.is_some(), "dispatching api request");
        let outcome = self.transport.send(request).await;
        if let Err(err) = &outcome {
            tracing::warn!(?method, %path, status = err.status(), error = %err, "api request failed");
        }
        outcome
    }

    fn encode<B: Serialize + ?Sized>(&self, body: &B) -> Result<RequestBody, ApiError> {
        let value = serde_json::to_value(body).map_err(|err| ApiError::Encode {
            detail: err.to_string(),
        })?;
        match self.encoding {
            BodyEncoding::Json => Ok(RequestBody::Json(value)),
            BodyEncoding::Form => form_fields(value).map(RequestBody::Form),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ApiClient")
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::Decode {
        detail: err.to_string(),
    })
}

fn form_fields(value: Value) -> Result<Vec<(String, String)>, ApiError> {
    let Value::Object(map) = value else {
        return Err(ApiError::Encode {
            detail: "form bodies must be flat objects".to_string(),
        });
    };
    let mut fields = Vec::with_capacity(map.len());
    for (key, value) in map {
        let text = match value {
            Value::Null => continue,
            Value::String(text) => text,
            Value::Bool(flag) => flag.to_string(),
            Value::Number(number) => number.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(ApiError::Encode {
                    detail: format!("form field `{key}` is not a scalar"),
                });
            }
        };
        fields.push((key, text));
    }
    Ok(fields)
}
