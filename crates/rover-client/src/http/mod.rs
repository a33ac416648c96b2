// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP transport layer for the rover device API.
//!
//! [`DeviceClient`] wraps every endpoint the firmware exposes. No retry or
//! deadline policy lives here — the polling loop decides what to do with a
//! failed request, and the transport default timeout applies.

use log::debug;

use crate::protocol::{parse_network_list, DeviceConfig, ParseError, StatusRecord};

/// Errors returned by device API calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] ParseError),
}

/// Async client for one rover device.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    base_url: String,
    http: reqwest::Client,
}

impl DeviceClient {
    /// Create a client for the device at `base_url`, e.g. `http://192.168.4.1`.
    ///
    /// A trailing slash on the base URL is accepted and ignored.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// The device base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch one telemetry sample from `GET /status`.
    pub async fn status(&self) -> Result<StatusRecord, ClientError> {
        let body = self
            .http
            .get(self.url("/status"))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(StatusRecord::from_json(&body)?)
    }

    /// Fetch the ordered Wi-Fi network list from `GET /scan`.
    ///
    /// The scan blocks on the device side, so this can take a few seconds.
    pub async fn scan_networks(&self) -> Result<Vec<String>, ClientError> {
        let body = self
            .http
            .get(self.url("/scan"))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_network_list(&body)?)
    }

    /// Fetch the stored device configuration from `GET /config`.
    pub async fn config(&self) -> Result<DeviceConfig, ClientError> {
        let body = self
            .http
            .get(self.url("/config"))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(DeviceConfig::from_json(&body)?)
    }

    /// Store a new device configuration via `POST /save` (url-encoded form).
    pub async fn save_config(&self, config: &DeviceConfig) -> Result<(), ClientError> {
        self.http
            .post(self.url("/save"))
            .form(config)
            .send()
            .await?
            .error_for_status()?;
        debug!("device config saved");
        Ok(())
    }

    /// Ask the device to retry its network connection. Fire-and-forget.
    pub async fn retry_network(&self) -> Result<(), ClientError> {
        self.http
            .get(self.url("/wifi/retry"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Reboot the device.
    pub async fn reboot(&self) -> Result<(), ClientError> {
        self.http
            .post(self.url("/reboot"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Factory-reset the device. The device reboots on its own afterwards.
    pub async fn factory_reset(&self) -> Result<(), ClientError> {
        self.http
            .post(self.url("/reset"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = DeviceClient::new("http://192.168.4.1/");
        assert_eq!(client.base_url(), "http://192.168.4.1");
        assert_eq!(client.url("/status"), "http://192.168.4.1/status");
    }

    #[test]
    fn test_base_url_kept_verbatim_otherwise() {
        let client = DeviceClient::new("http://rover.local:8080");
        assert_eq!(client.url("/scan"), "http://rover.local:8080/scan");
    }
}
