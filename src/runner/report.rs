//! Per-case results and the run report file

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

use super::cases::TestCase;
use super::evaluator::Evaluation;

/// Outcome of one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub test_case: String,
    pub image_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_keywords: Option<Vec<String>>,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestResult {
    /// Result of a case that ran to the verdict
    pub fn evaluated(case: &TestCase, description: String, evaluation: &Evaluation) -> Self {
        Self {
            test_case: case.name.clone(),
            image_file: case.image_file.clone(),
            description: Some(description),
            found_keywords: Some(evaluation.found.clone()),
            passed: evaluation.passed,
            error: None,
        }
    }

    /// Result of a case that failed before or during evaluation
    pub fn failed(case: &TestCase, error: &Error) -> Self {
        Self {
            test_case: case.name.clone(),
            image_file: case.image_file.clone(),
            description: None,
            found_keywords: None,
            passed: false,
            error: Some(error.to_string()),
        }
    }
}

/// Pass count over total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: usize,
    pub total: usize,
}

impl RunSummary {
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    pub fn failed(&self) -> usize {
        self.total - self.passed
    }
}

/// Every result of a run, in input order
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub results: Vec<TestResult>,
    /// Where the report was written
    pub path: Option<PathBuf>,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            passed: self.results.iter().filter(|r| r.passed).count(),
            total: self.results.len(),
        }
    }

    /// Write the results as `test_results_<stamp>.json` under `dir`
    ///
    /// Never overwrites: a name already taken within the same second gets a
    /// numeric suffix.
    pub fn save(&mut self, dir: &Path, now: DateTime<Local>) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let stem = report_stem(now);

        for attempt in 0..100usize {
            let name = if attempt == 0 {
                format!("{}.json", stem)
            } else {
                format!("{}_{}.json", stem, attempt)
            };
            let path = dir.join(name);

            let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            write_pretty(file, &self.results)?;
            tracing::info!(path = %path.display(), "Report written");
            self.path = Some(path.clone());
            return Ok(path);
        }

        Err(Error::Config(format!(
            "Too many reports named {} in {}",
            stem,
            dir.display()
        )))
    }
}

/// File stem for a run started at `now`
pub fn report_stem(now: DateTime<Local>) -> String {
    format!("test_results_{}", now.format("%Y%m%d_%H%M%S"))
}

fn write_pretty<W: Write>(writer: W, results: &[TestResult]) -> Result<()> {
    let mut writer = io::BufWriter::new(writer);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
    results.serialize(&mut ser)?;
    writer.flush()?;
    Ok(())
}
