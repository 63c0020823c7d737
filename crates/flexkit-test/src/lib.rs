//! # FlexKit Test
//!
//! Fixture harness for the FlexKit layout engine.
//!
//! A fixture is a JSON file describing a node tree (styles, optional
//! measured leaves), the available size and direction, and the expected
//! layout of every node. The runner computes the layout and reports
//! mismatches as a line diff of the formatted trees.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flexkit_test::FixtureRunner;
//!
//! let runner = FixtureRunner::new();
//! let summary = runner.run_all("fixtures")?;
//! println!("Passed: {}/{}", summary.passed, summary.total);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod fixture;
pub mod runner;

pub use fixture::{Fixture, FixtureNode, LayoutSnapshot, MeasureSpec};
pub use runner::FixtureRunner;

/// Errors that can occur in testing.
#[derive(Error, Debug)]
pub enum TestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Layout error: {0}")]
    Layout(#[from] flexkit_layout::LayoutError),

    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),
}

/// Test result status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
    Error,
}

/// Individual fixture result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub duration_us: u64,
    pub message: Option<String>,
    pub diff: Option<String>,
}

impl TestResult {
    pub fn pass(name: impl Into<String>, duration_us: u64) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Pass,
            duration_us,
            message: None,
            diff: None,
        }
    }

    /// A mismatch between the expected and actual layout trees.
    pub fn fail_with_diff(
        name: impl Into<String>,
        duration_us: u64,
        expected: &str,
        actual: &str,
    ) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Fail,
            duration_us,
            message: Some("Layout mismatch".into()),
            diff: Some(diff_strings(expected, actual)),
        }
    }

    pub fn skip(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Skip,
            duration_us: 0,
            message: Some(reason.into()),
            diff: None,
        }
    }

    pub fn error(name: impl Into<String>, duration_us: u64, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Error,
            duration_us,
            message: Some(message.into()),
            diff: None,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == TestStatus::Pass
    }
}

/// Aggregated test results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub duration_us: u64,
    pub results: Vec<TestResult>,
}

impl TestSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: TestResult) {
        self.total += 1;
        self.duration_us += result.duration_us;

        match result.status {
            TestStatus::Pass => self.passed += 1,
            TestStatus::Fail => self.failed += 1,
            TestStatus::Skip => self.skipped += 1,
            TestStatus::Error => self.errors += 1,
        }

        self.results.push(result);
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }

    /// True when nothing failed or errored.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    /// Results that did not pass or skip.
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.status, TestStatus::Fail | TestStatus::Error))
    }
}

/// Unified line diff of two strings.
pub fn diff_strings(expected: &str, actual: &str) -> String {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(expected, actual);
    let mut output = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        output.push_str(sign);
        output.push_str(change.as_str().unwrap_or_default());
        if change.missing_newline() {
            output.push('\n');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = TestSummary::new();
        let first = TestResult::pass("a", 10);
        assert!(first.is_pass());
        summary.add(first);
        summary.add(TestResult::pass("b", 20));
        summary.add(TestResult::fail_with_diff("c", 15, "x\n", "y\n"));
        summary.add(TestResult::skip("d", "no expected layout"));

        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.duration_us, 45);
        assert!(!summary.is_success());
        assert_eq!(summary.failures().count(), 1);
        assert!((summary.pass_rate() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_diff_strings() {
        let expected = "line1\nline2\nline3";
        let actual = "line1\nmodified\nline3";
        let diff = diff_strings(expected, actual);
        assert!(diff.contains("-line2"));
        assert!(diff.contains("+modified"));
        assert!(diff.contains(" line1"));
    }

    #[test]
    fn test_summary_serializes() {
        let mut summary = TestSummary::new();
        summary.add(TestResult::error("broken", 0, "bad json"));
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"status\":\"error\""));
    }
}
