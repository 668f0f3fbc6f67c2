pub mod events;
pub mod gate;
pub mod state;
pub mod suite;

use anyhow::Result;
use log::info;
use std::time::Instant;
use uuid::Uuid;

pub use events::*;
pub use state::*;
pub use suite::{SuiteOutcome, SuitePhase, SuiteRunner};

use crate::report::types::{SessionReport, TargetReport};
use crate::utils::config::HarnessConfig;

/// Run the suite against every configured target, one target at a time,
/// and collect everything into a single report
pub async fn run_session(config: &HarnessConfig) -> Result<SessionReport> {
    config.validate()?;

    let session_id = Uuid::new_v4().to_string();
    let started = Instant::now();

    let (emitter, receiver) = EventEmitter::new();
    let listener = tokio::spawn(ConsoleEventListener::listen(receiver));

    info!("Registry QA session {} started", session_id);
    emitter.emit(HarnessEvent::SessionStarted {
        session_id: session_id.clone(),
        target_count: config.targets.len(),
    });

    let mut results = SessionResults::new();
    let mut targets = Vec::with_capacity(config.targets.len());

    for target in &config.targets {
        let mut runner = SuiteRunner::for_target(target, config)?;
        let outcome = runner.run(&emitter).await;

        targets.push(TargetReport {
            label: outcome.label,
            base_url: outcome.base_url,
            ready: outcome.ready,
        });
        results.merge(outcome.results);
    }

    let duration_secs = started.elapsed().as_secs_f64();
    emitter.emit(HarnessEvent::SessionFinished { duration_secs });

    // Closing the channel ends the listener; wait so its output lands first
    drop(emitter);
    let _ = listener.await;

    Ok(SessionReport::new(session_id, duration_secs, targets, results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::{Target, UnreachablePolicy};
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::time::Duration;

    async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let token = body["admin_token"].as_str().unwrap_or_default();
        if token.len() < 32 {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "errorCode": 1002, "errorMessage": "Invalid admin token" })),
            )
        } else {
            (StatusCode::CREATED, Json(json!({ "errorCode": -1 })))
        }
    }

    /// Minimal registry that satisfies every probe
    async fn spawn_registry() -> String {
        let app = Router::new()
            .route("/health", get(|| async { Json(json!({ "status": "healthy" })) }))
            .route("/api/services/register", post(register))
            .route(
                "/api/services/discover",
                post(|| async { Json(json!({ "services": [], "total_count": 0 })) }),
            )
            .route(
                "/api/services/list",
                get(|| async { Json(json!({ "services": [] })) }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn unused_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    fn config(healthy: &str, down: &str, policy: UnreachablePolicy) -> HarnessConfig {
        HarnessConfig {
            targets: vec![Target::new("sqlite", healthy), Target::new("postgresql", down)],
            ready_timeout: Duration::from_millis(300),
            poll_interval: Duration::from_millis(50),
            poll_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(5),
            unreachable: policy,
            ..HarnessConfig::default()
        }
    }

    #[tokio::test]
    async fn test_healthy_and_unreachable_with_explicit_skips() {
        let healthy = spawn_registry().await;
        let report = run_session(&config(&healthy, &unused_url(), UnreachablePolicy::Skip))
            .await
            .unwrap();

        let results = &report.results;
        assert_eq!(results.total(), 12);
        assert_eq!(results.passed(), 6, "{:#?}", results.records());
        assert_eq!(results.failed(), 0);
        assert_eq!(results.skipped(), 6);
        assert!(results.is_consistent());
        assert!(!results.all_passed());

        assert!(report.targets[0].ready);
        assert!(!report.targets[1].ready);
        assert!(results.records()[..6].iter().all(|r| r.target == "sqlite"));
    }

    #[tokio::test]
    async fn test_healthy_and_unreachable_with_omission() {
        let healthy = spawn_registry().await;
        let report = run_session(&config(&healthy, &unused_url(), UnreachablePolicy::Omit))
            .await
            .unwrap();

        let results = &report.results;
        assert_eq!(results.total(), 6);
        assert_eq!(results.passed(), 6);
        assert_eq!(results.skipped(), 0);
        assert!(results.all_passed());
    }

    #[tokio::test]
    async fn test_record_names_unique_across_targets() {
        let first = spawn_registry().await;
        let second = spawn_registry().await;
        let mut cfg = config(&first, &second, UnreachablePolicy::Skip);
        cfg.ready_timeout = Duration::from_secs(5);

        let report = run_session(&cfg).await.unwrap();

        let mut names: Vec<_> = report
            .results
            .records()
            .iter()
            .map(|r| r.name.clone())
            .collect();
        assert_eq!(names.len(), 12);
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 12);
        assert!(report.results.all_passed());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_probing() {
        let mut cfg = HarnessConfig::default();
        cfg.targets = vec![];
        assert!(run_session(&cfg).await.is_err());
    }
}
