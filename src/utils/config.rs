use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SQLITE_URL: &str = "http://localhost:8080";
pub const DEFAULT_POSTGRES_URL: &str = "http://localhost:8081";
pub const DEFAULT_REPORT_PATH: &str = "/test-results/ai-qa-report.json";

/// One registry instance under test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub label: String,
    pub base_url: String,
}

impl Target {
    pub fn new(label: &str, base_url: &str) -> Self {
        Self {
            label: label.to_string(),
            base_url: base_url.to_string(),
        }
    }
}

/// What to record for a target that never became ready
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnreachablePolicy {
    /// One explicit `skipped` record per battery probe
    #[default]
    Skip,
    /// No records at all
    Omit,
}

impl FromStr for UnreachablePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(UnreachablePolicy::Skip),
            "omit" => Ok(UnreachablePolicy::Omit),
            other => bail!("Unknown unreachable policy: {} (expected skip or omit)", other),
        }
    }
}

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Targets, tested in this order
    pub targets: Vec<Target>,

    /// How long to wait for a target's liveness endpoint
    pub ready_timeout: Duration,

    /// Pause between readiness polls
    pub poll_interval: Duration,

    /// Limit for a single readiness poll
    pub poll_timeout: Duration,

    /// Limit for every probe request
    pub request_timeout: Duration,

    /// Debug-level logging
    pub verbose: bool,

    /// Where the JSON report is written
    pub report_path: PathBuf,

    /// Also write junit.xml next to the JSON report
    pub junit: bool,

    pub unreachable: UnreachablePolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            targets: vec![
                Target::new("sqlite", DEFAULT_SQLITE_URL),
                Target::new("postgresql", DEFAULT_POSTGRES_URL),
            ],
            ready_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(2),
            poll_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            verbose: true,
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            junit: false,
            unreachable: UnreachablePolicy::Skip,
        }
    }
}

impl HarnessConfig {
    /// Defaults overridden by process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("SQLITE_API_URL") {
            config.set_target_url("sqlite", &url);
        }
        if let Some(url) = lookup("POSTGRES_API_URL") {
            config.set_target_url("postgresql", &url);
        }
        if let Some(secs) = lookup("TEST_TIMEOUT") {
            config.ready_timeout = parse_secs("TEST_TIMEOUT", &secs)?;
        }
        if let Some(secs) = lookup("REQUEST_TIMEOUT") {
            config.request_timeout = parse_secs("REQUEST_TIMEOUT", &secs)?;
        }
        if let Some(flag) = lookup("VERBOSE") {
            config.verbose = parse_flag(&flag);
        }
        if let Some(path) = lookup("REPORT_PATH") {
            config.report_path = PathBuf::from(path);
        }
        if let Some(flag) = lookup("JUNIT_REPORT") {
            config.junit = parse_flag(&flag);
        }
        if let Some(policy) = lookup("UNREACHABLE_POLICY") {
            config.unreachable = policy.parse().context("Invalid UNREACHABLE_POLICY")?;
        }

        Ok(config)
    }

    pub fn set_target_url(&mut self, label: &str, url: &str) {
        if let Some(target) = self.targets.iter_mut().find(|t| t.label == label) {
            target.base_url = url.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            bail!("No targets configured");
        }

        let mut labels = HashSet::new();
        for target in &self.targets {
            if !labels.insert(target.label.as_str()) {
                bail!("Duplicate target label: {}", target.label);
            }
            if !(target.base_url.starts_with("http://") || target.base_url.starts_with("https://"))
            {
                bail!(
                    "Target {} has an invalid base URL: {:?}",
                    target.label,
                    target.base_url
                );
            }
        }

        if self.poll_interval.is_zero() {
            bail!("Readiness poll interval must be positive");
        }

        Ok(())
    }
}

fn parse_secs(name: &str, value: &str) -> Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("{} must be a whole number of seconds, got {:?}", name, value))?;
    Ok(Duration::from_secs(secs))
}

/// Only a case-insensitive "true" enables a flag
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
