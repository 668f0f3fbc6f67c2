use crate::runner::state::SessionResults;
use serde::{Deserialize, Serialize};

/// Readiness of one target as observed by the gate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TargetReport {
    pub label: String,
    pub base_url: String,
    pub ready: bool,
}

/// Session results for report generation.
///
/// The counters and `tests` array sit at the top level of the JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: String,
    pub generated_at: String,
    pub duration_secs: f64,
    pub targets: Vec<TargetReport>,
    #[serde(flatten)]
    pub results: SessionResults,
}

impl SessionReport {
    pub fn new(
        session_id: String,
        duration_secs: f64,
        targets: Vec<TargetReport>,
        results: SessionResults,
    ) -> Self {
        Self {
            session_id,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            duration_secs,
            targets,
            results,
        }
    }
}
