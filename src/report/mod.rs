pub mod json;
pub mod junit;
pub mod summary;
pub mod types;

use anyhow::Result;
use colored::Colorize;
use log::error;
use std::path::{Path, PathBuf};

use types::SessionReport;

/// Write the report files and print the summary.
///
/// File failures are logged and never affect the summary or exit status.
pub fn emit(report: &SessionReport, report_path: &Path, junit: bool) -> i32 {
    match json::write(report, report_path) {
        Ok(()) => println!(
            "\n{} Test report saved to: {}",
            "📄".to_string().blue(),
            report_path.display().to_string().cyan()
        ),
        Err(e) => error!("Failed to save report: {:#}", e),
    }

    if junit {
        let junit_path = junit_path_for(report_path);
        match junit::write_report(report, &junit_path) {
            Ok(()) => println!(
                "{} JUnit report saved to: {}",
                "📊".to_string().blue(),
                junit_path.display().to_string().cyan()
            ),
            Err(e) => error!("Failed to save JUnit report: {:#}", e),
        }
    }

    summary::print_summary(&report.results)
}

/// junit.xml in the same directory as the JSON report
pub fn junit_path_for(report_path: &Path) -> PathBuf {
    report_path
        .parent()
        .map(|dir| dir.join("junit.xml"))
        .unwrap_or_else(|| PathBuf::from("junit.xml"))
}

/// Re-render a saved report: summary plus optional JUnit export
pub fn rerender(results_path: &Path, junit_output: Option<&Path>) -> Result<i32> {
    let report = json::load(results_path)?;

    if let Some(path) = junit_output {
        junit::write_report(&report, path)?;
        println!(
            "{} JUnit report saved to: {}",
            "📊".to_string().blue(),
            path.display().to_string().cyan()
        );
    }

    Ok(summary::print_summary(&report.results))
}
