// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP implementation of the remote API.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::device::Device;
use crate::error::ApiError;
use crate::protocol::{
    FanStatus, FanWrite, RemoteApi, RoomPriorityStatus, RoomPriorityWrite, ThermostatStatus,
    ThermostatWrite, TokenProvider,
};

// ============================================================================
// HttpConfig
// ============================================================================

/// Configuration for the HTTP remote API.
///
/// # Examples
///
/// ```
/// use thermsync::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new()
///     .with_api_key("consumer-key")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "https://api.honeywell.com");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpConfig {
    /// Default API root.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.honeywell.com";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the public API root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the API root (trailing slashes are dropped).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the consumer key sent as the `apikey` query parameter.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the API root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the consumer key, if set.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an [`HttpApi`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_api(self, tokens: Arc<dyn TokenProvider>) -> Result<HttpApi, ApiError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(HttpApi {
            base_url: self.base_url,
            api_key: self.api_key,
            client,
            tokens,
        })
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// HttpApi
// ============================================================================

/// REST client for the thermostat cloud API.
///
/// Routes:
///
/// - `GET|POST /v2/devices/thermostats/{deviceId}`
/// - `GET|POST /v2/devices/thermostats/{deviceId}/fan`
/// - `GET|PUT /v2/devices/thermostats/{deviceId}/priority`
///
/// Every request carries `locationId` (and `apikey` when configured) as
/// query parameters and the bearer token from the [`TokenProvider`].
#[derive(Clone)]
pub struct HttpApi {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    tokens: Arc<dyn TokenProvider>,
}

impl fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpApi")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl HttpApi {
    /// Returns the API root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL of a thermostat resource.
    fn build_url(&self, device: &Device, resource: &str) -> String {
        let mut url = format!(
            "{}/v2/devices/thermostats/{}{}?locationId={}",
            self.base_url,
            urlencoding::encode(device.id().as_str()),
            resource,
            device.location()
        );
        if let Some(key) = &self.api_key {
            url.push_str("&apikey=");
            url.push_str(&urlencoding::encode(key));
        }
        url
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match self.tokens.access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        tracing::debug!(url = %url, "Sending HTTP GET");

        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        tracing::debug!(body = %body, "Received HTTP response");

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        tracing::debug!(%method, url = %url, "Sending HTTP write");

        let response = self
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::from_status(status.as_u16()))
        }
    }
}

impl RemoteApi for HttpApi {
    async fn thermostat_status(&self, device: &Device) -> Result<ThermostatStatus, ApiError> {
        self.get_json(&self.build_url(device, "")).await
    }

    async fn fan_status(&self, device: &Device) -> Result<Option<FanStatus>, ApiError> {
        if !device.capabilities().supports_fan() {
            return Ok(None);
        }
        self.get_json(&self.build_url(device, "/fan")).await.map(Some)
    }

    async fn room_priority(
        &self,
        device: &Device,
    ) -> Result<Option<RoomPriorityStatus>, ApiError> {
        if !device.capabilities().supports_room_priority() {
            return Ok(None);
        }
        self.get_json(&self.build_url(device, "/priority"))
            .await
            .map(Some)
    }

    async fn write_thermostat(
        &self,
        device: &Device,
        payload: &ThermostatWrite,
    ) -> Result<(), ApiError> {
        self.send_json(Method::POST, &self.build_url(device, ""), payload)
            .await
    }

    async fn write_fan(&self, device: &Device, payload: &FanWrite) -> Result<(), ApiError> {
        self.send_json(Method::POST, &self.build_url(device, "/fan"), payload)
            .await
    }

    async fn write_room_priority(
        &self,
        device: &Device,
        payload: &RoomPriorityWrite,
    ) -> Result<(), ApiError> {
        self.send_json(Method::PUT, &self.build_url(device, "/priority"), payload)
            .await
    }
}
