use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure to obtain a usable reply from the registry
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Connection refused, DNS failure, timeout
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Reply arrived but could not be interpreted
    #[error("protocol error: {0}")]
    Protocol(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// Raw HTTP reply: status code and body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<Value, ProbeError> {
        serde_json::from_str(&self.body)
            .map_err(|e| ProbeError::Protocol(format!("invalid JSON body: {}", e)))
    }
}

/// Request layer for one registry instance.
///
/// Every request either yields a reply (whatever its status) or a
/// `ProbeError`; nothing else escapes.
#[async_trait]
pub trait RegistryTransport: Send + Sync {
    /// Base URL of the instance (no trailing slash)
    fn base_url(&self) -> &str;

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<HttpReply, ProbeError>;

    async fn get(&self, path: &str) -> Result<HttpReply, ProbeError> {
        self.send(Method::Get, path, None).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<HttpReply, ProbeError> {
        self.send(Method::Post, path, Some(body)).await
    }
}
