//! HTTP client for the backend menu endpoint

use async_trait::async_trait;
use chai_core::config::ApiConfig;
use chai_router::{MenuService, RouterError, RouterResult};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Envelope code for success
const CODE_OK: i64 = 200;
/// Envelope code for a rejected session
const CODE_UNAUTHORIZED: i64 = 401;

/// Response envelope wrapping every backend payload
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    /// Business status code
    pub code: i64,
    /// Human readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Payload
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl ApiEnvelope {
    /// Unwrap the payload according to the envelope code
    ///
    /// A successful envelope without `data` yields JSON `null`, which the menu
    /// store rejects as malformed.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for code 401 and `FetchFailure` for any other
    /// non-success code.
    pub fn into_data(self) -> RouterResult<serde_json::Value> {
        let message = self.message.unwrap_or_default();
        match self.code {
            CODE_OK => Ok(self.data.unwrap_or(serde_json::Value::Null)),
            CODE_UNAUTHORIZED => Err(RouterError::unauthorized(message)),
            code => Err(RouterError::fetch_failure(format!(
                "backend returned code {code}: {message}"
            ))),
        }
    }
}

/// Menu service backed by the console API
#[derive(Debug, Clone)]
pub struct HttpMenuService {
    client: Client,
    url: String,
    token: Option<String>,
}

impl HttpMenuService {
    /// Create a service for `endpoint` under `base_url`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(base_url: &str, endpoint: &str, timeout: Duration) -> RouterResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            RouterError::Configuration {
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;

        Ok(Self {
            client,
            url: join_url(base_url, endpoint),
            token: None,
        })
    }

    /// Create a service from the API section of the console configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn from_config(api: &ApiConfig) -> RouterResult<Self> {
        let service = Self::new(
            &api.base_url,
            &api.menu_endpoint,
            Duration::from_secs(api.timeout_secs),
        )?;
        Ok(match &api.token {
            Some(token) => service.with_token(token.clone()),
            None => service,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Full endpoint URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MenuService for HttpMenuService {
    async fn fetch_menu(&self) -> RouterResult<serde_json::Value> {
        let mut request = self.client.get(&self.url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(url = %self.url, "fetching menu");
        let response = request
            .send()
            .await
            .map_err(|e| RouterError::fetch_failure(format!("request to {} failed: {e}", self.url)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(RouterError::unauthorized(format!(
                "{} returned {status}",
                self.url
            )));
        }
        if !status.is_success() {
            return Err(RouterError::fetch_failure(format!(
                "{} returned {status}",
                self.url
            )));
        }

        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|e| RouterError::malformed(format!("invalid response envelope: {e}")))?;
        envelope.into_data()
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn join_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
