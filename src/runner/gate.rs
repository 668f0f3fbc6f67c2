use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::client::{RegistryTransport, HEALTH_PATH};

/// Polls a target's liveness endpoint until it answers 200 or time runs out
pub struct ReadinessGate {
    transport: Arc<dyn RegistryTransport>,
    timeout: Duration,
    interval: Duration,
}

impl ReadinessGate {
    /// `transport` should carry the per-poll timeout
    pub fn new(transport: Arc<dyn RegistryTransport>, timeout: Duration, interval: Duration) -> Self {
        Self {
            transport,
            timeout,
            interval,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns true once a poll answers 200; false if the deadline passes
    /// first. Only the status code matters here, not the body.
    pub async fn wait(&self) -> bool {
        let url = self.transport.base_url().to_string();
        info!("Waiting for service at {}", url);

        let started = Instant::now();
        let mut attempt = 0u32;

        while started.elapsed() < self.timeout {
            attempt += 1;
            match self.transport.get(HEALTH_PATH).await {
                Ok(reply) if reply.status == 200 => {
                    info!("Service at {} is healthy (attempt {})", url, attempt);
                    return true;
                }
                Ok(reply) => debug!("{} attempt {}: HTTP {}", url, attempt, reply.status),
                Err(e) => debug!("{} attempt {}: {}", url, attempt, e),
            }

            tokio::time::sleep(self.interval).await;
        }

        error!(
            "Service at {} did not become healthy within {}s",
            url,
            self.timeout.as_secs()
        );
        false
    }
}
