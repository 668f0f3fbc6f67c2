//! Request bodies sent to the registry.

use serde_json::{json, Value};

/// Admin credential accepted by the registry (at least 32 characters)
pub const ADMIN_TOKEN: &str = "test-admin-token-with-32-characters-minimum-length";

/// Admin credential below the registry's minimum length
pub const SHORT_ADMIN_TOKEN: &str = "short";

pub const MIN_ADMIN_TOKEN_LEN: usize = 32;

/// Body of `POST /api/services/register`
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRegistration {
    pub name: String,
    pub service_type: String,
    pub version: String,
    pub url: String,
    pub health_check_url: String,
    pub role: String,
    pub priority: i64,
    pub metadata: String,
    pub admin_token: String,
}

impl ServiceRegistration {
    fn primary(name: String, service_type: &str, url: String, priority: i64, token: &str) -> Self {
        Self {
            name,
            service_type: service_type.to_string(),
            version: "1.0.0".to_string(),
            health_check_url: format!("{}/health", url),
            url,
            role: "primary".to_string(),
            priority,
            metadata: "{}".to_string(),
            admin_token: token.to_string(),
        }
    }

    /// Well-formed registration with a valid admin token
    pub fn valid(label: &str) -> Self {
        Self::primary(
            format!("Test Service {}", label),
            "authentication",
            "http://test-service:8099".to_string(),
            10,
            ADMIN_TOKEN,
        )
    }

    /// Otherwise valid registration whose admin token is too short
    pub fn with_short_token() -> Self {
        Self::primary(
            "Malicious Service".to_string(),
            "authentication",
            "http://malicious:9999".to_string(),
            10,
            SHORT_ADMIN_TOKEN,
        )
    }

    /// Registration for concurrent worker `index`; name, URL and priority
    /// are distinct per index
    pub fn concurrent(index: usize, label: &str) -> Self {
        Self::primary(
            format!("Concurrent Service {} {}", index, label),
            "extension",
            format!("http://concurrent-{}:8100", index),
            index as i64,
            ADMIN_TOKEN,
        )
    }

    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "type": self.service_type,
            "version": self.version,
            "url": self.url,
            "health_check_url": self.health_check_url,
            "role": self.role,
            "priority": self.priority,
            "metadata": self.metadata,
            "admin_token": self.admin_token,
        })
    }
}

/// Body of `POST /api/services/discover`
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryQuery {
    pub service_type: String,
    pub only_healthy: bool,
}

impl DiscoveryQuery {
    pub fn all_of_type(service_type: &str) -> Self {
        Self {
            service_type: service_type.to_string(),
            only_healthy: false,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": self.service_type,
            "only_healthy": self.only_healthy,
        })
    }
}
