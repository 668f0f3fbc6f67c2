use anyhow::{bail, Context, Result};
use std::path::Path;

use super::types::SessionReport;

/// Write the JSON report, creating parent directories as needed
pub fn write(report: &SessionReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Load a report written by `write`
pub fn load(path: &Path) -> Result<SessionReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let report: SessionReport = serde_json::from_str(&content)
        .with_context(|| format!("Invalid report file {}", path.display()))?;

    if !report.results.is_consistent() {
        bail!(
            "Report {} has counters that do not match its tests",
            path.display()
        );
    }

    Ok(report)
}
