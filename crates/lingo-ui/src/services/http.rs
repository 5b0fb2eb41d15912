//! Native HTTP transport backed by `reqwest`.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;

use crate::core::config::ClientConfig;
use crate::core::error::ApiError;
use crate::core::transport::{ApiRequest, Method, RequestBody, Transport, join_url};

/// [`Transport`] that performs requests with a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Transport with a default client rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Transport reusing an already configured client.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Transport rooted at the configured API base URL.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_base_url.clone())
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<String, ApiError> {
        let url = join_url(&self.base_url, &request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if let Some(value) = request.authorization() {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(fields) => builder.form(fields),
        };

        let response = builder.send().await.map_err(|err| ApiError::Network {
            detail: err.to_string(),
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|err| ApiError::Decode {
            detail: err.to_string(),
        })?;
        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body));
        }
        Ok(body)
    }
}
