//! Test case definitions
//!
//! A suite file is `{ "test_cases": [ ... ] }` in JSON, or the same shape in
//! YAML when the file ends in `.yaml`/`.yml`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::common::{Error, Result};

/// One image to describe and the keywords its description should mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique name of the case
    pub name: String,
    /// Image the case is about (informational; the gallery is indexed by position)
    pub image_file: String,
    /// Keywords expected in the description
    pub expected_keywords: Vec<String>,
}

/// File envelope
#[derive(Debug, Deserialize)]
pub struct TestSuite {
    pub test_cases: Vec<TestCase>,
}

/// Load test cases from a suite file, preserving order
pub fn load_test_cases(path: &Path) -> Result<Vec<TestCase>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read test cases '{}': {}",
            path.display(),
            e
        ))
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let suite: TestSuite = if is_yaml {
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse test cases: {}", e)))?
    } else {
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse test cases: {}", e)))?
    };

    if let Some(unnamed) = suite.test_cases.iter().position(|c| c.name.trim().is_empty()) {
        return Err(Error::Config(format!(
            "Test case #{} has an empty name",
            unnamed + 1
        )));
    }

    Ok(suite.test_cases)
}

/// Problems worth warning about before a run
///
/// None of these stop the run.
pub fn lint(cases: &[TestCase], pass_threshold: usize) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    if cases.is_empty() {
        warnings.push("Suite contains no test cases".to_string());
    }

    for case in cases {
        if !seen.insert(case.name.as_str()) {
            warnings.push(format!("Duplicate test case name '{}'", case.name));
        }
        if case.expected_keywords.len() < pass_threshold {
            warnings.push(format!(
                "Test case '{}' lists {} keyword(s) but {} must match to pass; it can never pass",
                case.name,
                case.expected_keywords.len(),
                pass_threshold
            ));
        }
    }

    warnings
}
