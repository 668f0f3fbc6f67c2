use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Terminal outcome of a probe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Passed,
    Failed,
    Skipped,
}

/// A probe that has started but has no verdict yet.
///
/// The terminal methods consume the state, so a probe can only ever be
/// resolved once.
#[derive(Debug)]
pub struct ProbeState {
    name: String,
    description: String,
    target: String,
    started_at: Instant,
    elapsed: Option<Duration>,
}

impl ProbeState {
    pub fn start(name: &str, description: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            target: target.to_string(),
            started_at: Instant::now(),
            elapsed: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Freeze the probe clock and return the elapsed seconds.
    ///
    /// Only the first call stops the clock; later calls return the same value.
    pub fn stop_clock(&mut self) -> f64 {
        let started_at = self.started_at;
        self.elapsed
            .get_or_insert_with(|| started_at.elapsed())
            .as_secs_f64()
    }

    pub fn pass(self, message: impl Into<String>) -> ProbeRecord {
        self.finish(Verdict::Passed, message.into())
    }

    pub fn fail(self, message: impl Into<String>) -> ProbeRecord {
        self.finish(Verdict::Failed, message.into())
    }

    fn finish(mut self, status: Verdict, message: String) -> ProbeRecord {
        let duration = self.stop_clock();
        ProbeRecord {
            name: self.name,
            description: self.description,
            target: self.target,
            status,
            message,
            duration,
        }
    }
}

/// Serialized snapshot of a completed probe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProbeRecord {
    pub name: String,
    pub description: String,
    pub target: String,
    pub status: Verdict,
    pub message: String,
    /// Wall-clock seconds around the request
    pub duration: f64,
}

impl ProbeRecord {
    /// Record for a probe that was never invoked.
    pub fn skipped(name: &str, description: &str, target: &str, reason: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            target: target.to_string(),
            status: Verdict::Skipped,
            message: reason.to_string(),
            duration: 0.0,
        }
    }
}

/// Verdict counters plus every record in execution order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionResults {
    total: u32,
    passed: u32,
    failed: u32,
    skipped: u32,
    tests: Vec<ProbeRecord>,
}

impl SessionResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and bump the matching counter.
    pub fn record(&mut self, record: ProbeRecord) {
        self.total += 1;
        match record.status {
            Verdict::Passed => self.passed += 1,
            Verdict::Failed => self.failed += 1,
            Verdict::Skipped => self.skipped += 1,
        }
        self.tests.push(record);
    }

    /// Append every record of another fragment, keeping its order.
    pub fn merge(&mut self, other: SessionResults) {
        for record in other.tests {
            self.record(record);
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn passed(&self) -> u32 {
        self.passed
    }

    pub fn failed(&self) -> u32 {
        self.failed
    }

    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    pub fn records(&self) -> &[ProbeRecord] {
        &self.tests
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Counters agree with each other and with the stored records.
    pub fn is_consistent(&self) -> bool {
        let count = |verdict: Verdict| {
            self.tests.iter().filter(|t| t.status == verdict).count() as u32
        };

        self.total == self.passed + self.failed + self.skipped
            && self.total as usize == self.tests.len()
            && self.passed == count(Verdict::Passed)
            && self.failed == count(Verdict::Failed)
            && self.skipped == count(Verdict::Skipped)
    }

    /// Passed share of all recorded probes, in percent.
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.passed as f64 / self.total as f64 * 100.0)
        }
    }

    /// Every recorded probe passed and at least one was recorded.
    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }
}
