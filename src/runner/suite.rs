use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use super::events::{EventEmitter, HarnessEvent};
use super::gate::ReadinessGate;
use super::state::SessionResults;
use crate::client::{HttpTransport, RegistryTransport};
use crate::probe::{battery, ProbeKind};
use crate::utils::config::{HarnessConfig, Target, UnreachablePolicy};

/// Lifecycle of one target's suite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuitePhase {
    NotStarted,
    Gating,
    Ready,
    RunningProbes,
    Done,
    NotReady,
    SkippedAll,
}

/// What one suite run produced
#[derive(Debug, Clone)]
pub struct SuiteOutcome {
    pub label: String,
    pub base_url: String,
    pub ready: bool,
    pub results: SessionResults,
}

/// Gates on readiness, then runs the battery against a single target
pub struct SuiteRunner {
    target: Target,
    transport: Arc<dyn RegistryTransport>,
    gate: ReadinessGate,
    policy: UnreachablePolicy,
    phase: SuitePhase,
}

impl SuiteRunner {
    pub fn new(
        target: Target,
        transport: Arc<dyn RegistryTransport>,
        gate: ReadinessGate,
        policy: UnreachablePolicy,
    ) -> Self {
        Self {
            target,
            transport,
            gate,
            policy,
            phase: SuitePhase::NotStarted,
        }
    }

    /// HTTP-backed runner: probes use the request timeout, gate polls use
    /// the poll timeout
    pub fn for_target(target: &Target, config: &HarnessConfig) -> Result<Self> {
        let transport: Arc<dyn RegistryTransport> =
            Arc::new(HttpTransport::new(&target.base_url, config.request_timeout)?);
        let poll_transport: Arc<dyn RegistryTransport> =
            Arc::new(HttpTransport::new(&target.base_url, config.poll_timeout)?);
        let gate = ReadinessGate::new(poll_transport, config.ready_timeout, config.poll_interval);

        Ok(Self::new(target.clone(), transport, gate, config.unreachable))
    }

    pub fn phase(&self) -> SuitePhase {
        self.phase
    }

    pub async fn run(&mut self, emitter: &EventEmitter) -> SuiteOutcome {
        let label = self.target.label.clone();
        let mut results = SessionResults::new();

        emitter.emit(HarnessEvent::TargetStarted {
            label: label.clone(),
            base_url: self.target.base_url.clone(),
        });

        self.phase = SuitePhase::Gating;
        let ready = self.gate.wait().await;

        if ready {
            self.phase = SuitePhase::Ready;
            self.run_probes(&label, &mut results, emitter).await;
            self.phase = SuitePhase::Done;
        } else {
            self.phase = SuitePhase::NotReady;
            self.skip_all(&label, &mut results, emitter);
            self.phase = SuitePhase::SkippedAll;
        }

        emitter.emit(HarnessEvent::TargetFinished {
            label: label.clone(),
            passed: results.passed(),
            failed: results.failed(),
            skipped: results.skipped(),
        });

        SuiteOutcome {
            label,
            base_url: self.target.base_url.clone(),
            ready,
            results,
        }
    }

    /// Probes run strictly one after another
    async fn run_probes(
        &mut self,
        label: &str,
        results: &mut SessionResults,
        emitter: &EventEmitter,
    ) {
        self.phase = SuitePhase::RunningProbes;

        for plan in battery(label) {
            let kind = plan.kind();
            emitter.emit(HarnessEvent::ProbeStarted {
                name: kind.record_name(label),
                description: kind.description(label),
            });

            let record = plan.run(&self.transport, label).await;

            emitter.emit(HarnessEvent::ProbeFinished {
                record: record.clone(),
            });
            results.record(record);
        }
    }

    fn skip_all(&self, label: &str, results: &mut SessionResults, emitter: &EventEmitter) {
        let timeout_secs = self.gate.timeout().as_secs();
        emitter.emit(HarnessEvent::TargetNotReady {
            label: label.to_string(),
            timeout_secs,
        });

        match self.policy {
            UnreachablePolicy::Omit => {
                warn!("Service not ready, omitting tests for {}", label);
            }
            UnreachablePolicy::Skip => {
                info!("Service not ready, skipping tests for {}", label);
                let reason = format!("Service not ready within {}s", timeout_secs);
                for kind in ProbeKind::ALL {
                    let record = kind.skipped(label, &reason);
                    emitter.emit(HarnessEvent::ProbeFinished {
                        record: record.clone(),
                    });
                    results.record(record);
                }
            }
        }
    }
}
