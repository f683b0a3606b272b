//! Gateway manager HTTP client implementation

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use gwm_core::models::{Device, DeviceDraft, Gateway, GatewayDraft, GatewayPatch};

use crate::error::{ClientError, Result};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error envelope sent by the server
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    message: String,
}

/// Gateway manager REST API client
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the server (e.g., "http://localhost:3000")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a new client with custom timeouts
    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get a reference to the underlying HTTP client.
    ///
    /// Useful for making custom requests while reusing the connection pool.
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Build an endpoint URL; each segment is percent-encoded on its own so a
    /// serial number containing `/` stays one path segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // =========================================================================
    // Health Check
    // =========================================================================

    /// Check server liveness
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<String> {
        let url = self.endpoint(&["health"])?;
        let response = self.client.get(url).send().await?;

        if response.status().is_success() {
            Ok(response.text().await?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    // =========================================================================
    // Gateway Operations
    // =========================================================================

    /// List all gateways
    #[instrument(skip(self))]
    pub async fn list_gateways(&self) -> Result<Vec<Gateway>> {
        let url = self.endpoint(&["gateways"])?;
        debug!("Listing gateways from {}", url);

        let response = self.client.get(url).send().await?;
        self.handle_response(response).await
    }

    /// Get a gateway by serial number
    #[instrument(skip(self))]
    pub async fn get_gateway(&self, serial: &str) -> Result<Gateway> {
        let url = self.endpoint(&["gateways", serial])?;

        let response = self.client.get(url).send().await?;
        self.handle_response(response).await
    }

    /// Create a gateway
    #[instrument(skip(self, draft))]
    pub async fn create_gateway(&self, draft: &GatewayDraft) -> Result<Gateway> {
        let url = self.endpoint(&["gateways"])?;

        let response = self.client.post(url).json(draft).send().await?;
        self.handle_response(response).await
    }

    /// Partially update a gateway
    #[instrument(skip(self, patch))]
    pub async fn update_gateway(&self, serial: &str, patch: &GatewayPatch) -> Result<Gateway> {
        let url = self.endpoint(&["gateways", serial])?;

        let response = self.client.patch(url).json(patch).send().await?;
        self.handle_response(response).await
    }

    /// Delete a gateway, returning the removed record
    #[instrument(skip(self))]
    pub async fn delete_gateway(&self, serial: &str) -> Result<Gateway> {
        let url = self.endpoint(&["gateways", serial])?;

        let response = self.client.delete(url).send().await?;
        self.handle_response(response).await
    }

    // =========================================================================
    // Device Operations
    // =========================================================================

    /// Attach a device to a gateway
    #[instrument(skip(self, draft))]
    pub async fn add_device(&self, serial: &str, draft: &DeviceDraft) -> Result<Device> {
        let url = self.endpoint(&["gateways", serial, "devices"])?;

        let response = self.client.post(url).json(draft).send().await?;
        self.handle_response(response).await
    }

    /// Detach a device from a gateway, returning the removed device
    #[instrument(skip(self))]
    pub async fn remove_device(&self, serial: &str, uid: i64) -> Result<Device> {
        let uid = uid.to_string();
        let url = self.endpoint(&["gateways", serial, "devices", &uid])?;

        let response = self.client.delete(url).send().await?;
        self.handle_response(response).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    async fn extract_error(&self, response: reqwest::Response) -> ClientError {
        let status = response.status();

        // Try to parse error response body
        let (kind, message) = match response.json::<ErrorBody>().await {
            Ok(body) => (body.error, body.message),
            Err(_) => (String::new(), format!("HTTP {}", status)),
        };
        debug!(status = status.as_u16(), error = %kind, %message, "Server returned error");

        match status {
            StatusCode::BAD_REQUEST => ClientError::BadRequest(message),
            StatusCode::NOT_FOUND => {
                if message.starts_with("Device") {
                    ClientError::DeviceNotFound(message)
                } else if message.starts_with("Gateway") {
                    ClientError::GatewayNotFound(message)
                } else {
                    ClientError::server_error(status.as_u16(), message)
                }
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ClientError::Timeout,
            _ => ClientError::server_error(status.as_u16(), message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GatewayClient::new("http://localhost:3000");
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let client = GatewayClient::new("not a url");
        assert!(matches!(client, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = GatewayClient::new("http://localhost:3000").unwrap();
        let url = client.endpoint(&["gateways", "A/B 1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/gateways/A%2FB%201");
    }

    #[test]
    fn test_endpoint_with_base_path() {
        let client = GatewayClient::new("http://localhost:3000/prefix/").unwrap();
        let url = client.endpoint(&["gateways"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/prefix/gateways");
    }
}
