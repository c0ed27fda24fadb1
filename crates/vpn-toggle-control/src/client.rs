//! HTTP client for the VPN control API.
//!
//! This module provides the `ControlClient` trait and its HTTP implementation.
//! Two operations are supported:
//!
//! - `POST {base}/vpn` with `{"action": "start" | "stop"}`
//! - `GET {base}/vpn/status`
//!
//! Both authenticate with an `x-api-key` header and expect a JSON object with
//! a string `message` field on any 2xx response.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use vpn_toggle_core::{Action, Credentials};

use crate::error::{ControlError, Result};
use crate::types::{ClientConfig, ControlRequest, ControlResponse};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Trait for control API communication.
///
/// This trait abstracts the control client interface, allowing for
/// scripted implementations in tests.
#[async_trait]
pub trait ControlClient: Send + Sync {
    /// Ask the server to start or stop the instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers outside the
    /// 2xx range, or the body is not the expected JSON shape.
    async fn control(&self, action: Action) -> Result<ControlResponse>;

    /// Query the current state of the instance.
    ///
    /// # Errors
    ///
    /// Same conditions as [`control`](ControlClient::control).
    async fn status(&self) -> Result<ControlResponse>;

    /// Build a client for the same endpoint with new credentials.
    ///
    /// The returned client replaces this one; the old credentials are never
    /// used again by callers that switch to it.
    ///
    /// # Errors
    ///
    /// Returns an error if a client cannot be built from the configuration.
    fn reconfigure(&self, credentials: Credentials) -> Result<Arc<dyn ControlClient>>;
}

/// HTTP client for the control API.
#[derive(Debug, Clone)]
pub struct HttpControlClient {
    client: reqwest::Client,
    config: ClientConfig,
    credentials: Credentials,
    control_url: Url,
    status_url: Url,
}

impl HttpControlClient {
    /// Create a new control client.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidEndpoint` if the base URL is not an
    /// absolute `http`/`https` URL, or `ControlError::TransportFailure` if the
    /// underlying HTTP client cannot be created.
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(ControlError::transport)?;

        Self::with_client(client, config, credentials)
    }

    /// Create a new control client with a custom reqwest client.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidEndpoint` if the base URL is invalid.
    pub fn with_client(
        client: reqwest::Client,
        config: ClientConfig,
        credentials: Credentials,
    ) -> Result<Self> {
        let control_url = endpoint(&config.base_url, "vpn")?;
        let status_url = endpoint(&config.base_url, "vpn/status")?;

        Ok(Self {
            client,
            config,
            credentials,
            control_url,
            status_url,
        })
    }

    /// Get the base URL of the control API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the URL used for control requests.
    #[must_use]
    pub fn control_url(&self) -> &Url {
        &self.control_url
    }

    /// Get the URL used for status requests.
    #[must_use]
    pub fn status_url(&self) -> &Url {
        &self.status_url
    }

    /// Check the status code and decode the body.
    async fn handle_response(response: reqwest::Response) -> Result<ControlResponse> {
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, url = %response.url(), "Control API returned an error status");
            return Err(ControlError::UnexpectedStatusCode(status.as_u16()));
        }

        let body = response.bytes().await.map_err(ControlError::transport)?;
        serde_json::from_slice(&body).map_err(|e| ControlError::MalformedResponse(e.to_string()))
    }
}

/// Join `path` onto the configured base URL.
///
/// The base is treated as a prefix, so `https://host/prod` yields
/// `https://host/prod/vpn` rather than replacing the last segment.
fn endpoint(base_url: &str, path: &str) -> Result<Url> {
    let base = base_url.trim().trim_end_matches('/');
    let url = Url::parse(&format!("{base}/{path}"))
        .map_err(|e| ControlError::InvalidEndpoint(format!("{base_url:?}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ControlError::InvalidEndpoint(format!(
            "{base_url:?}: unsupported scheme {scheme:?}"
        ))),
    }
}

#[async_trait]
impl ControlClient for HttpControlClient {
    async fn control(&self, action: Action) -> Result<ControlResponse> {
        tracing::debug!(action = %action, url = %self.control_url, "Sending control request");

        let response = self
            .client
            .post(self.control_url.clone())
            .header(API_KEY_HEADER, self.credentials.api_key())
            .json(&ControlRequest { action })
            .send()
            .await
            .map_err(ControlError::transport)?;

        Self::handle_response(response).await
    }

    async fn status(&self) -> Result<ControlResponse> {
        tracing::debug!(url = %self.status_url, "Sending status request");

        let response = self
            .client
            .get(self.status_url.clone())
            .header(API_KEY_HEADER, self.credentials.api_key())
            .send()
            .await
            .map_err(ControlError::transport)?;

        Self::handle_response(response).await
    }

    fn reconfigure(&self, credentials: Credentials) -> Result<Arc<dyn ControlClient>> {
        let client = Self::with_client(self.client.clone(), self.config.clone(), credentials)?;
        Ok(Arc::new(client))
    }
}
