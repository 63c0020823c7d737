//! Fixture runner.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::{Fixture, TestError, TestResult, TestSummary};

/// Runs JSON layout fixtures and compares them against their expected
/// layout trees.
#[derive(Debug, Clone, Default)]
pub struct FixtureRunner {
    /// Only run fixtures whose name contains this string.
    pub filter: Option<String>,
}

impl FixtureRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
        }
    }

    /// Run every `.json` fixture under `dir`, in path order.
    pub fn run_all(&self, dir: impl AsRef<Path>) -> Result<TestSummary, TestError> {
        let dir = dir.as_ref();
        info!(?dir, "Running fixtures");

        let mut summary = TestSummary::new();
        if !dir.exists() {
            warn!(?dir, "Fixture directory does not exist");
            return Ok(summary);
        }

        let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        for path in paths {
            if let Some(result) = self.run_file(&path) {
                summary.add(result);
            }
        }

        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            errors = summary.errors,
            "Fixture run complete"
        );
        Ok(summary)
    }

    /// Run one fixture file. Returns `None` when the filter excludes it.
    pub fn run_file(&self, path: &Path) -> Option<TestResult> {
        let fallback = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        debug!(?path, "Running fixture");
        match Fixture::from_path(path) {
            Ok(fixture) => self.run_fixture(&fixture),
            Err(e) => Some(TestResult::error(fallback, 0, e.to_string())),
        }
    }

    /// Run a parsed fixture. Returns `None` when the filter excludes it.
    pub fn run_fixture(&self, fixture: &Fixture) -> Option<TestResult> {
        if let Some(filter) = &self.filter {
            if !fixture.name.contains(filter.as_str()) {
                return None;
            }
        }

        let Some(expected) = &fixture.expected else {
            return Some(TestResult::skip(&fixture.name, "No expected layout"));
        };

        let start = Instant::now();
        let actual = fixture.actual();
        let duration = start.elapsed().as_micros() as u64;

        let result = match actual {
            Ok(actual) if actual == *expected => TestResult::pass(&fixture.name, duration),
            Ok(actual) => {
                TestResult::fail_with_diff(&fixture.name, duration, &expected.format(), &actual.format())
            }
            Err(e) => TestResult::error(&fixture.name, duration, e.to_string()),
        };
        Some(result)
    }
}
