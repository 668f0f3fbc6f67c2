//! Parallel registrations against one target.

use serde_json::Value;
use std::sync::Arc;

use super::payload::ServiceRegistration;
use super::ProbeKind;
use crate::client::{RegistryTransport, REGISTER_PATH};
use crate::runner::state::ProbeRecord;

/// Number of simultaneous registrations (and workers)
pub const CONCURRENT_WORKERS: usize = 5;

/// Registers `CONCURRENT_WORKERS` distinct services at once and passes only
/// if every registration is answered with 201.
pub struct ConcurrentRegistrations {
    payloads: Vec<Value>,
}

impl ConcurrentRegistrations {
    pub fn for_label(label: &str) -> Self {
        Self {
            payloads: (1..=CONCURRENT_WORKERS)
                .map(|index| ServiceRegistration::concurrent(index, label).to_json())
                .collect(),
        }
    }

    pub fn workers(&self) -> usize {
        self.payloads.len()
    }

    pub async fn run(&self, transport: Arc<dyn RegistryTransport>, label: &str) -> ProbeRecord {
        let mut state = ProbeKind::ConcurrentRegistrations.start(label);
        let workers = self.workers();

        // One task per payload; workers only report success, the caller counts
        let handles: Vec<_> = self
            .payloads
            .iter()
            .cloned()
            .map(|payload| {
                let transport = Arc::clone(&transport);
                tokio::spawn(async move {
                    matches!(
                        transport.post_json(REGISTER_PATH, &payload).await,
                        Ok(reply) if reply.status == 201
                    )
                })
            })
            .collect();

        // Barrier: every worker has returned, errored or panicked past here
        let results = futures::future::join_all(handles).await;
        let secs = state.stop_clock();

        let succeeded = results
            .iter()
            .filter(|result| matches!(result, Ok(true)))
            .count();

        if succeeded == workers {
            state.pass(format!(
                "All {} concurrent registrations succeeded in {:.2}s",
                workers, secs
            ))
        } else {
            log::debug!(
                "{}: {} of {} concurrent registrations failed",
                state.name(),
                workers - succeeded,
                workers
            );
            state.fail(format!(
                "Only {}/{} registrations succeeded",
                succeeded, workers
            ))
        }
    }
}
