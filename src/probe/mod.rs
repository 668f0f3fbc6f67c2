//! Probes: one request, one decision rule, exactly one verdict.

pub mod battery;
pub mod concurrent;
pub mod payload;

use serde_json::Value;
use std::sync::Arc;

use crate::client::{HttpReply, Method, ProbeError, RegistryTransport};
use crate::runner::state::{ProbeRecord, ProbeState};

pub use battery::battery;
pub use concurrent::ConcurrentRegistrations;

/// The probes of the battery, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    HealthCheck,
    ServiceRegistration,
    ServiceDiscovery,
    ServiceList,
    InvalidRegistration,
    ConcurrentRegistrations,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 6] = [
        ProbeKind::HealthCheck,
        ProbeKind::ServiceRegistration,
        ProbeKind::ServiceDiscovery,
        ProbeKind::ServiceList,
        ProbeKind::InvalidRegistration,
        ProbeKind::ConcurrentRegistrations,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ProbeKind::HealthCheck => "health_check",
            ProbeKind::ServiceRegistration => "service_registration",
            ProbeKind::ServiceDiscovery => "service_discovery",
            ProbeKind::ServiceList => "service_list",
            ProbeKind::InvalidRegistration => "invalid_registration",
            ProbeKind::ConcurrentRegistrations => "concurrent_registrations",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ProbeKind::HealthCheck => "Health check endpoint",
            ProbeKind::ServiceRegistration => "Service registration",
            ProbeKind::ServiceDiscovery => "Service discovery",
            ProbeKind::ServiceList => "List all services",
            ProbeKind::InvalidRegistration => "Invalid service registration rejection",
            ProbeKind::ConcurrentRegistrations => "Concurrent service registrations",
        }
    }

    /// Session-unique record name: the target label disambiguates the
    /// same probe run against different targets
    pub fn record_name(&self, label: &str) -> String {
        format!("{}_{}", self.slug(), label)
    }

    pub fn description(&self, label: &str) -> String {
        format!("{} ({})", self.title(), label)
    }

    pub fn start(&self, label: &str) -> ProbeState {
        ProbeState::start(&self.record_name(label), &self.description(label), label)
    }

    /// Record for a probe that was not invoked
    pub fn skipped(&self, label: &str, reason: &str) -> ProbeRecord {
        ProbeRecord::skipped(
            &self.record_name(label),
            &self.description(label),
            label,
            reason,
        )
    }
}

/// Outcome of a decision rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Pass(String),
    Fail(String),
}

/// Maps a reply and the measured seconds to a decision. Body parsing
/// failures surface as `ProbeError::Protocol`.
pub type DecisionRule = fn(&HttpReply, f64) -> Result<Decision, ProbeError>;

#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub path: &'static str,
    pub body: Option<Value>,
}

/// A single-request probe: what to send and how to judge the reply
#[derive(Clone)]
pub struct ProbeSpec {
    pub kind: ProbeKind,
    pub request: RequestSpec,
    pub decide: DecisionRule,
}

/// An entry of the battery
pub enum ProbePlan {
    Request(ProbeSpec),
    Concurrent(ConcurrentRegistrations),
}

impl ProbePlan {
    pub fn kind(&self) -> ProbeKind {
        match self {
            ProbePlan::Request(spec) => spec.kind,
            ProbePlan::Concurrent(_) => ProbeKind::ConcurrentRegistrations,
        }
    }

    pub async fn run(&self, transport: &Arc<dyn RegistryTransport>, label: &str) -> ProbeRecord {
        match self {
            ProbePlan::Request(spec) => run_probe(&**transport, spec, label).await,
            ProbePlan::Concurrent(probe) => probe.run(Arc::clone(transport), label).await,
        }
    }
}

/// Run one request probe. Transport and protocol failures become a
/// `failed` verdict; nothing propagates past this call.
pub async fn run_probe(
    transport: &dyn RegistryTransport,
    spec: &ProbeSpec,
    label: &str,
) -> ProbeRecord {
    let mut state = spec.kind.start(label);

    let reply = transport
        .send(spec.request.method, spec.request.path, spec.request.body.as_ref())
        .await;
    let secs = state.stop_clock();

    match reply.and_then(|reply| (spec.decide)(&reply, secs)) {
        Ok(Decision::Pass(message)) => state.pass(message),
        Ok(Decision::Fail(message)) => state.fail(message),
        Err(e) => state.fail(format!("Exception: {}", e)),
    }
}

/// Render a JSON value for a message: strings without quotes, absent as `None`
pub(crate) fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
