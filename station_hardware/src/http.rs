//! JSON-over-HTTP link to the ingestion service.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;
use station_traits::{BoxError, Uploader};

use crate::error::{HwError, Result};

/// Identity used when neither config nor host provide one.
pub const FALLBACK_DEVICE_ID: &str = "station-sim";

/// Node identity derived from the host name.
pub fn host_device_id() -> String {
    std::fs::read_to_string("/etc/hostname")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_DEVICE_ID.to_string())
}

fn classify(e: reqwest::Error) -> HwError {
    if e.is_timeout() {
        HwError::Timeout("ingestion service")
    } else {
        HwError::Http(e.to_string())
    }
}

/// POSTs each payload as JSON. Any 2xx status is a successful delivery.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: Client,
    endpoint: String,
    device_id: String,
}

impl HttpUploader {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        device_id: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HwError::Http(e.to_string()))?;
        let device_id = device_id.unwrap_or_else(host_device_id);
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            device_id,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl<P: Serialize + ?Sized> Uploader<P> for HttpUploader {
    fn device_id(&self) -> String {
        self.device_id.clone()
    }

    fn send(&mut self, payload: &P) -> std::result::Result<(), BoxError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .map_err(classify)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(HwError::Status(status.as_u16()).into());
        }
        tracing::debug!(status = status.as_u16(), endpoint = %self.endpoint, "report accepted");
        Ok(())
    }
}
