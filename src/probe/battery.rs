//! The fixed probe battery and its decision rules.

use serde_json::Value;

use super::payload::{DiscoveryQuery, ServiceRegistration};
use super::{
    display_value, ConcurrentRegistrations, Decision, ProbeKind, ProbePlan, ProbeSpec,
    RequestSpec,
};
use crate::client::{
    HttpReply, Method, ProbeError, DISCOVER_PATH, HEALTH_PATH, LIST_PATH, REGISTER_PATH,
};

/// Probes run against one target, in execution order
pub fn battery(label: &str) -> Vec<ProbePlan> {
    vec![
        ProbePlan::Request(ProbeSpec {
            kind: ProbeKind::HealthCheck,
            request: RequestSpec {
                method: Method::Get,
                path: HEALTH_PATH,
                body: None,
            },
            decide: decide_health,
        }),
        ProbePlan::Request(ProbeSpec {
            kind: ProbeKind::ServiceRegistration,
            request: RequestSpec {
                method: Method::Post,
                path: REGISTER_PATH,
                body: Some(ServiceRegistration::valid(label).to_json()),
            },
            decide: decide_registration,
        }),
        ProbePlan::Request(ProbeSpec {
            kind: ProbeKind::ServiceDiscovery,
            request: RequestSpec {
                method: Method::Post,
                path: DISCOVER_PATH,
                body: Some(DiscoveryQuery::all_of_type("authentication").to_json()),
            },
            decide: decide_discovery,
        }),
        ProbePlan::Request(ProbeSpec {
            kind: ProbeKind::ServiceList,
            request: RequestSpec {
                method: Method::Get,
                path: LIST_PATH,
                body: None,
            },
            decide: decide_list,
        }),
        ProbePlan::Request(ProbeSpec {
            kind: ProbeKind::InvalidRegistration,
            request: RequestSpec {
                method: Method::Post,
                path: REGISTER_PATH,
                body: Some(ServiceRegistration::with_short_token().to_json()),
            },
            decide: decide_rejection,
        }),
        ProbePlan::Concurrent(ConcurrentRegistrations::for_label(label)),
    ]
}

pub fn decide_health(reply: &HttpReply, secs: f64) -> Result<Decision, ProbeError> {
    if reply.status != 200 {
        return Ok(Decision::Fail(format!("HTTP {}", reply.status)));
    }

    let body = reply.json()?;
    let status = body.get("status");
    Ok(match status.and_then(Value::as_str) {
        Some("healthy") => Decision::Pass(format!("Health check passed in {:.2}s", secs)),
        _ => Decision::Fail(format!("Unexpected status: {}", display_value(status))),
    })
}

pub fn decide_registration(reply: &HttpReply, secs: f64) -> Result<Decision, ProbeError> {
    if reply.status != 201 {
        return Ok(Decision::Fail(format!("HTTP {}: {}", reply.status, reply.body)));
    }

    let body = reply.json()?;
    // -1 and -1.0 both mark success
    Ok(match body.get("errorCode").and_then(Value::as_f64) {
        Some(code) if code == -1.0 => {
            Decision::Pass(format!("Service registered successfully in {:.2}s", secs))
        }
        _ => Decision::Fail(format!(
            "Error: {}",
            display_value(body.get("errorMessage"))
        )),
    })
}

pub fn decide_discovery(reply: &HttpReply, secs: f64) -> Result<Decision, ProbeError> {
    if reply.status != 200 {
        return Ok(Decision::Fail(format!("HTTP {}", reply.status)));
    }

    let body = reply.json()?;
    if body.get("services").is_none() {
        return Ok(Decision::Fail("Invalid response format".to_string()));
    }

    let count = body.get("total_count").cloned().unwrap_or(Value::from(0));
    Ok(Decision::Pass(format!(
        "Discovered {} services in {:.2}s",
        display_value(Some(&count)),
        secs
    )))
}

pub fn decide_list(reply: &HttpReply, secs: f64) -> Result<Decision, ProbeError> {
    if reply.status != 200 {
        return Ok(Decision::Fail(format!("HTTP {}", reply.status)));
    }

    let body = reply.json()?;
    match body.get("services").and_then(Value::as_array) {
        None => Ok(Decision::Fail("Invalid response format".to_string())),
        Some(services) => Ok(Decision::Pass(format!(
            "Listed {} services in {:.2}s",
            services.len(),
            secs
        ))),
    }
}

/// The short-credential registration must be refused outright
pub fn decide_rejection(reply: &HttpReply, secs: f64) -> Result<Decision, ProbeError> {
    Ok(if reply.status == 400 {
        Decision::Pass(format!(
            "Invalid registration properly rejected in {:.2}s",
            secs
        ))
    } else {
        Decision::Fail(format!("Expected 400, got HTTP {}", reply.status))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeTransport;
    use crate::probe::payload::SHORT_ADMIN_TOKEN;
    use crate::probe::run_probe;
    use crate::runner::state::Verdict;

    fn reply(status: u16, body: &str) -> HttpReply {
        HttpReply::new(status, body)
    }

    fn is_pass(decision: Decision) -> bool {
        matches!(decision, Decision::Pass(_))
    }

    fn spec_for(kind: ProbeKind) -> ProbeSpec {
        battery("sqlite")
            .into_iter()
            .find_map(|plan| match plan {
                ProbePlan::Request(spec) if spec.kind == kind => Some(spec),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_battery_order() {
        let kinds: Vec<_> = battery("sqlite").iter().map(ProbePlan::kind).collect();
        assert_eq!(kinds, ProbeKind::ALL.to_vec());
    }

    #[test]
    fn test_health_healthy_passes() {
        let decision = decide_health(&reply(200, r#"{"status":"healthy"}"#), 0.05).unwrap();
        assert_eq!(
            decision,
            Decision::Pass("Health check passed in 0.05s".to_string())
        );
    }

    #[test]
    fn test_health_degraded_fails() {
        let decision = decide_health(&reply(200, r#"{"status":"degraded"}"#), 0.05).unwrap();
        assert_eq!(
            decision,
            Decision::Fail("Unexpected status: degraded".to_string())
        );
    }

    #[test]
    fn test_health_non_200_fails_without_parsing() {
        let decision = decide_health(&reply(503, "down"), 0.0).unwrap();
        assert_eq!(decision, Decision::Fail("HTTP 503".to_string()));
    }

    #[test]
    fn test_health_missing_status_field() {
        let decision = decide_health(&reply(200, "{}"), 0.0).unwrap();
        assert_eq!(decision, Decision::Fail("Unexpected status: None".to_string()));
    }

    #[test]
    fn test_registration_sentinel_passes() {
        let decision =
            decide_registration(&reply(201, r#"{"errorCode":-1,"data":{}}"#), 0.1).unwrap();
        assert!(is_pass(decision));
    }

    #[test]
    fn test_registration_float_sentinel_passes() {
        let decision = decide_registration(&reply(201, r#"{"errorCode":-1.0}"#), 0.1).unwrap();
        assert_eq!(
            decision,
            Decision::Pass("Service registered successfully in 0.10s".to_string())
        );
        let decision = decide_registration(&reply(201, r#"{"errorCode":"-1"}"#), 0.1).unwrap();
        assert!(!is_pass(decision));
    }

    #[test]
    fn test_registration_error_code_fails_with_message() {
        let decision = decide_registration(
            &reply(201, r#"{"errorCode":5,"errorMessage":"bad field"}"#),
            0.1,
        )
        .unwrap();
        match decision {
            Decision::Fail(message) => assert!(message.contains("bad field")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_registration_wrong_status_includes_body() {
        let decision = decide_registration(&reply(401, "Invalid admin token"), 0.1).unwrap();
        assert_eq!(
            decision,
            Decision::Fail("HTTP 401: Invalid admin token".to_string())
        );
    }

    #[test]
    fn test_discovery_reports_total_count() {
        let decision = decide_discovery(
            &reply(200, r#"{"services":[{"name":"a"}],"total_count":1}"#),
            0.2,
        )
        .unwrap();
        assert_eq!(
            decision,
            Decision::Pass("Discovered 1 services in 0.20s".to_string())
        );
    }

    #[test]
    fn test_discovery_empty_list_passes() {
        let decision = decide_discovery(&reply(200, r#"{"services":[]}"#), 0.2).unwrap();
        assert_eq!(
            decision,
            Decision::Pass("Discovered 0 services in 0.20s".to_string())
        );
    }

    #[test]
    fn test_discovery_without_services_key_fails() {
        let decision = decide_discovery(&reply(200, r#"{"items":[]}"#), 0.2).unwrap();
        assert_eq!(
            decision,
            Decision::Fail("Invalid response format".to_string())
        );
    }

    #[test]
    fn test_list_counts_services() {
        let decision = decide_list(&reply(200, r#"{"services":[{},{},{}]}"#), 0.3).unwrap();
        assert_eq!(
            decision,
            Decision::Pass("Listed 3 services in 0.30s".to_string())
        );
        let decision = decide_list(&reply(500, ""), 0.3).unwrap();
        assert_eq!(decision, Decision::Fail("HTTP 500".to_string()));
    }

    #[test]
    fn test_list_non_array_services_fails() {
        for body in [r#"{"services":null}"#, r#"{"services":"x"}"#, r#"{"services":{}}"#, "{}"] {
            let decision = decide_list(&reply(200, body), 0.3).unwrap();
            assert_eq!(
                decision,
                Decision::Fail("Invalid response format".to_string()),
                "body: {}",
                body
            );
        }
    }

    #[test]
    fn test_rejection_requires_400() {
        assert!(is_pass(decide_rejection(&reply(400, "{}"), 0.0).unwrap()));
        assert_eq!(
            decide_rejection(&reply(201, r#"{"errorCode":-1}"#), 0.0).unwrap(),
            Decision::Fail("Expected 400, got HTTP 201".to_string())
        );
    }

    #[tokio::test]
    async fn test_rejection_probe_sends_short_token() {
        let transport = FakeTransport::replying(400, "{}");
        let record = run_probe(
            &transport,
            &spec_for(ProbeKind::InvalidRegistration),
            "sqlite",
        )
        .await;

        assert_eq!(record.status, Verdict::Passed);
        let requests = transport.requests.lock().unwrap();
        let body = requests[0].2.as_ref().unwrap();
        assert_eq!(body["admin_token"], SHORT_ADMIN_TOKEN);
        assert_eq!(requests[0].1, REGISTER_PATH);
    }

    #[tokio::test]
    async fn test_registration_probe_failure_record() {
        let transport =
            FakeTransport::replying(201, r#"{"errorCode":5,"errorMessage":"bad field"}"#);
        let record = run_probe(
            &transport,
            &spec_for(ProbeKind::ServiceRegistration),
            "postgresql",
        )
        .await;

        assert_eq!(record.status, Verdict::Failed);
        assert_eq!(record.message, "Error: bad field");
        assert_eq!(record.name, "service_registration_postgresql");
    }
}
