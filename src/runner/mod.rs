//! Accessibility regression runner
//!
//! Runs every test case of a suite through the share-to-describe flow, one
//! device session per case, strictly in order. Per-case failures are captured
//! as results; only setup problems (unreadable suite, unwritable report)
//! surface as errors.

pub mod cases;
pub mod evaluator;
pub mod extractor;
pub mod locator;
pub mod report;
pub mod session;

use chrono::Local;
use colored::Colorize;
use tracing::Instrument;

use crate::common::config::Config;
use crate::common::Result;
use crate::driver::Driver;

pub use cases::{lint, load_test_cases, TestCase, TestSuite};
pub use evaluator::{evaluate, Evaluation};
pub use report::{RunReport, RunSummary, TestResult};
pub use session::run_with_session;

/// Run every case in order, then write the report and print the summary
pub async fn run_all<D: Driver>(driver: &D, config: &Config, cases: &[TestCase]) -> Result<RunReport> {
    let started = Local::now();
    let mut report = RunReport {
        results: Vec::with_capacity(cases.len()),
        path: None,
    };

    for (position, case) in cases.iter().enumerate() {
        let span = tracing::info_span!("case", name = %case.name, position);
        let result = session::run_with_session(driver, config, case, position)
            .instrument(span)
            .await;
        tracing::info!(passed = result.passed, "Case finished");
        report.results.push(result);
    }

    let path = report.save(&config.report.output_dir, started)?;
    let summary = report.summary();

    println!("\n{}", "Test Summary:".blue().bold());
    let line = format!("Passed: {}/{}", summary.passed, summary.total);
    if summary.all_passed() {
        println!("{}", line.green().bold());
    } else {
        println!("{}", line.red().bold());
    }
    println!("Results saved to: {}", path.display());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake::{fast_config, scripted_flow, FakeDevice, FakeDriver, FakeScreen};

    fn case(name: &str) -> TestCase {
        TestCase {
            name: name.to_string(),
            image_file: format!("{name}.jpg"),
            expected_keywords: vec!["shelf".to_string(), "drink".to_string()],
        }
    }

    #[tokio::test]
    async fn test_failure_in_middle_case_is_isolated() {
        let first = scripted_flow("a shelf with drinks", 0, 1);
        // Case 2 lands on a blank screen and never finds its thumbnail
        let second = FakeDevice::new(vec![FakeScreen::new(vec![])]);
        let third = scripted_flow("drinks on a shelf", 1, 2);
        let driver = FakeDriver::new(vec![first.clone(), second.clone(), third.clone()]);

        let dir = tempfile::tempdir().unwrap();
        let mut config = fast_config();
        config.report.output_dir = dir.path().to_path_buf();
        let cases = vec![case("one"), case("two"), case("three")];

        let report = run_all(&driver, &config, &cases).await.unwrap();

        let names: Vec<_> = report.results.iter().map(|r| r.test_case.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
        assert!(report.results[0].passed);
        assert!(!report.results[1].passed);
        assert!(report.results[1].error.is_some());
        assert!(report.results[2].passed);
        assert_eq!(report.summary(), RunSummary { passed: 2, total: 3 });

        for device in [&first, &second, &third] {
            assert_eq!(device.state().quits, 1);
        }
        assert_eq!(driver.open_count(), 3);
    }

    #[tokio::test]
    async fn test_report_written_with_every_result() {
        let driver = FakeDriver::new(vec![scripted_flow("an empty room", 0, 1)]);
        let dir = tempfile::tempdir().unwrap();
        let mut config = fast_config();
        config.report.output_dir = dir.path().join("reports");

        let report = run_all(&driver, &config, &[case("room"), case("unreachable")])
            .await
            .unwrap();

        let path = report.path.clone().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("test_results_") && name.ends_with(".json"));

        let written: Vec<TestResult> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, report.results);
        assert_eq!(written.len(), 2);
        assert!(written[1].error.as_deref().unwrap().contains("no device available"));
    }

    #[tokio::test]
    async fn test_empty_suite_writes_empty_report() {
        let driver = FakeDriver::new(vec![]);
        let dir = tempfile::tempdir().unwrap();
        let mut config = fast_config();
        config.report.output_dir = dir.path().to_path_buf();

        let report = run_all(&driver, &config, &[]).await.unwrap();

        assert_eq!(report.summary(), RunSummary { passed: 0, total: 0 });
        let written = std::fs::read_to_string(report.path.unwrap()).unwrap();
        assert_eq!(written.trim(), "[]");
        assert_eq!(driver.open_count(), 0);
    }
}
