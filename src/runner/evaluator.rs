//! Keyword scoring of an extracted description

/// Outcome of scoring one description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Expected keywords present in the description, in expected order
    pub found: Vec<String>,
    /// Expected keywords absent from the description (diagnostic only)
    pub missing: Vec<String>,
    pub passed: bool,
}

/// Score `description` against `expected` keywords
///
/// Matching is case-insensitive substring containment. The verdict depends
/// only on how many keywords were found, compared against `threshold`.
pub fn evaluate<S: AsRef<str>>(description: &str, expected: &[S], threshold: usize) -> Evaluation {
    let haystack = description.to_lowercase();
    let mut found = Vec::new();
    let mut missing: Vec<String> = Vec::new();

    for keyword in expected {
        let keyword = keyword.as_ref();
        if haystack.contains(&keyword.to_lowercase()) {
            found.push(keyword.to_string());
        } else if !missing.iter().any(|m| m == keyword) {
            missing.push(keyword.to_string());
        }
    }

    let passed = found.len() >= threshold;
    Evaluation {
        found,
        missing,
        passed,
    }
}
