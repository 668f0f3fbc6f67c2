//! reqwest-backed transport used against real registry instances.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::traits::{HttpReply, Method, ProbeError, RegistryTransport};

pub struct HttpTransport {
    /// Base URL (e.g., "http://localhost:8080")
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport whose every request is bounded by `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl RegistryTransport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<HttpReply, ProbeError> {
        let mut req = self.client.request(method.into(), self.url(path));

        // json() also sets Content-Type: application/json
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await?;
        let status = res.status().as_u16();
        let body = res.text().await?;

        Ok(HttpReply { status, body })
    }
}
