use super::types::SessionReport;
use crate::runner::state::{ProbeRecord, Verdict};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

/// Generate JUnit XML: one <testsuite> per target
pub fn generate_junit_xml(report: &SessionReport) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let results = &report.results;
    let total_time: f64 = results.records().iter().map(|r| r.duration).sum();

    // <testsuites>
    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "registry-qa"));
    suites_start.push_attribute(("tests", results.total().to_string().as_str()));
    suites_start.push_attribute(("failures", results.failed().to_string().as_str()));
    suites_start.push_attribute(("skipped", results.skipped().to_string().as_str()));
    suites_start.push_attribute(("time", format!("{:.3}", total_time).as_str()));
    writer.write_event(Event::Start(suites_start))?;

    for label in target_labels(report) {
        let records: Vec<&ProbeRecord> = results
            .records()
            .iter()
            .filter(|r| r.target == label)
            .collect();
        write_test_suite(&mut writer, report, &label, &records)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let result = writer.into_inner().into_inner();
    let xml = String::from_utf8(result)?;
    Ok(xml)
}

/// Labels from the target list first, then any only seen in records
fn target_labels(report: &SessionReport) -> Vec<String> {
    let mut labels: Vec<String> = report.targets.iter().map(|t| t.label.clone()).collect();
    for record in report.results.records() {
        if !labels.contains(&record.target) {
            labels.push(record.target.clone());
        }
    }
    labels
}

fn write_test_suite<W: std::io::Write>(
    writer: &mut Writer<W>,
    report: &SessionReport,
    label: &str,
    records: &[&ProbeRecord],
) -> Result<()> {
    let count = |verdict: Verdict| records.iter().filter(|r| r.status == verdict).count();
    let time: f64 = records.iter().map(|r| r.duration).sum();

    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", label));
    suite_start.push_attribute(("tests", records.len().to_string().as_str()));
    suite_start.push_attribute(("failures", count(Verdict::Failed).to_string().as_str()));
    suite_start.push_attribute(("skipped", count(Verdict::Skipped).to_string().as_str()));
    suite_start.push_attribute(("id", report.session_id.as_str()));
    suite_start.push_attribute(("time", format!("{:.3}", time).as_str()));
    suite_start.push_attribute(("timestamp", report.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for record in records {
        write_test_case(writer, label, record)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    Ok(())
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    label: &str,
    record: &ProbeRecord,
) -> Result<()> {
    let classname = format!("registry_qa.{}", label);

    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", record.name.as_str()));
    case_start.push_attribute(("classname", classname.as_str()));
    case_start.push_attribute(("time", format!("{:.3}", record.duration).as_str()));
    writer.write_event(Event::Start(case_start))?;

    match record.status {
        Verdict::Failed => {
            let mut fail_start = BytesStart::new("failure");
            fail_start.push_attribute(("message", record.message.as_str()));
            fail_start.push_attribute(("type", "ProbeFailure"));
            writer.write_event(Event::Start(fail_start))?;
            writer.write_event(Event::Text(BytesText::new(&record.description)))?;
            writer.write_event(Event::End(BytesEnd::new("failure")))?;
        }
        Verdict::Skipped => {
            let mut skip = BytesStart::new("skipped");
            skip.push_attribute(("message", record.message.as_str()));
            writer.write_event(Event::Empty(skip))?;
        }
        Verdict::Passed => {}
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write junit.xml to the given path
pub fn write_report(report: &SessionReport, path: &Path) -> Result<()> {
    let xml = generate_junit_xml(report)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, xml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::TargetReport;
    use crate::runner::state::SessionResults;

    fn record(name: &str, target: &str, status: Verdict, message: &str) -> ProbeRecord {
        ProbeRecord {
            name: name.to_string(),
            description: format!("{} ({})", name, target),
            target: target.to_string(),
            status,
            message: message.to_string(),
            duration: 0.25,
        }
    }

    #[test]
    fn test_generate_junit_xml() {
        let mut results = SessionResults::new();
        results.record(record("health_check_sqlite", "sqlite", Verdict::Passed, "ok"));
        results.record(record(
            "service_registration_sqlite",
            "sqlite",
            Verdict::Failed,
            "Error: bad field",
        ));
        results.record(record(
            "health_check_postgresql",
            "postgresql",
            Verdict::Skipped,
            "Service not ready within 60s",
        ));

        let report = SessionReport {
            session_id: "test-session".to_string(),
            generated_at: "2024-01-01 12:00:00".to_string(),
            duration_secs: 3.0,
            targets: vec![
                TargetReport {
                    label: "sqlite".to_string(),
                    base_url: "http://localhost:8080".to_string(),
                    ready: true,
                },
                TargetReport {
                    label: "postgresql".to_string(),
                    base_url: "http://localhost:8081".to_string(),
                    ready: false,
                },
            ],
            results,
        };

        let xml = generate_junit_xml(&report).expect("Failed to generate XML");

        assert!(xml.contains(r#"<testsuites name="registry-qa" tests="3" failures="1" skipped="1""#));
        assert!(xml.contains(r#"<testsuite name="sqlite" tests="2" failures="1" skipped="0""#));
        assert!(xml.contains(r#"<testsuite name="postgresql" tests="1" failures="0" skipped="1""#));
        assert!(xml.contains(r#"<testcase name="health_check_sqlite""#));
        assert!(xml.contains(r#"message="Error: bad field""#));
        assert!(xml.contains(r#"<skipped message="Service not ready within 60s"/>"#));
    }

    #[test]
    fn test_empty_session_still_renders() {
        let report = SessionReport {
            session_id: "empty".to_string(),
            generated_at: "2024-01-01 12:00:00".to_string(),
            duration_secs: 0.0,
            targets: vec![],
            results: SessionResults::new(),
        };

        let xml = generate_junit_xml(&report).unwrap();
        assert!(xml.contains(r#"tests="0""#));
        assert!(xml.ends_with("</testsuites>"));
    }
}
