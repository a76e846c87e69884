//! Wi-Fi HTTP transport
//!
//! Short-lived requests straight at the device's web server. Status is
//! HTTP-only; the BLE profile has no status read.

use crate::error::ControllerError;
use crate::transport::traits::CommandTransport;
use async_trait::async_trait;
use giza_shared::{Command, DeviceStatus, COMMAND_PATH, STATUS_PATH};
use std::time::Duration;
use tracing::debug;

/// Per-request deadline; the device either answers quickly or not at all
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client bound to one device IP
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    device_ip: String,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, device_ip: String) -> Self {
        Self { client, device_ip }
    }

    /// Build a client with the transport's request timeout applied
    pub fn build_client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("default reqwest client")
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.device_ip, path)
    }

    /// Fetch and leniently decode the status document
    pub async fn fetch_status(&self) -> Result<DeviceStatus, ControllerError> {
        let url = self.url(STATUS_PATH);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ControllerError::BadHttpStatus(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        Ok(DeviceStatus::from_json(&body)?)
    }
}

#[async_trait]
impl CommandTransport for HttpTransport {
    async fn send_command(&self, command: Command) -> Result<(), ControllerError> {
        let url = self.url(COMMAND_PATH);
        debug!("POST {} body={}", url, command);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(command.as_str())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ControllerError::BadHttpStatus(response.status().as_u16()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Wi-Fi"
    }
}
