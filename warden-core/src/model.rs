// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core data model: test descriptors, assertion failures, and aggregated
//! results. Mirrors spec §3 one-to-one; nothing here depends on how a test
//! is actually executed.

use std::fmt;

/// A single test registered with the harness. Immutable once registered.
#[derive(Clone)]
pub struct TestDescriptor {
    pub suite_name: String,
    pub test_name: String,
    pub callable: fn(),
    pub death_expect: Option<DeathExpect>,
}

impl fmt::Debug for TestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDescriptor")
            .field("suite_name", &self.suite_name)
            .field("test_name", &self.test_name)
            .field("death_expect", &self.death_expect)
            .finish()
    }
}

/// Expected abnormal termination for a death test.
#[derive(Debug, Clone, PartialEq)]
pub struct DeathExpect {
    pub expected_signal: i32,
    pub expected_exit_code: i32,
    pub expected_assert_msg: Option<String>,
    pub match_exactly: bool,
    pub min_similarity: f64,
}

impl Default for DeathExpect {
    fn default() -> Self {
        DeathExpect {
            expected_signal: 0,
            expected_exit_code: -1,
            expected_assert_msg: None,
            match_exactly: false,
            min_similarity: 0.95,
        }
    }
}

/// A single recorded assertion failure, in the order it was observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    pub file: String,
    pub line: u32,
    pub condition_str: String,
    pub expected_str: String,
    pub actual_str: String,
}

/// Tag prefixed onto `condition_str` by captured-output assertions, telling
/// the reporter to print `expected_str`/`actual_str` with escaping (spec §4.G,
/// §6 "reserved condition-string tag").
pub const STDOUT_TAG: &str = "[STDOUT]";

/// Condition string used for the synthesized end-of-test leak-check failure.
pub const LEAK_CONDITION: &str = "No memory leaks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Status {
    Passed,
    Failed,
    Crashed,
    Timeout,
    DeathTestPassed,
}

impl Status {
    pub fn is_pass(self) -> bool {
        matches!(self, Status::Passed | Status::DeathTestPassed)
    }
}

/// Result of running exactly one test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub suite_name: String,
    pub test_name: String,
    pub status: Status,
    pub duration_ms: u64,
    pub captured_output: String,
    pub failures: Vec<AssertionFailure>,
}

impl TestResult {
    pub fn new(suite_name: impl Into<String>, test_name: impl Into<String>) -> Self {
        TestResult {
            suite_name: suite_name.into(),
            test_name: test_name.into(),
            status: Status::Passed,
            duration_ms: 0,
            captured_output: String::new(),
            failures: Vec::new(),
        }
    }

    /// Appends a failure and implies `status = Failed` (sticky, per the
    /// child-side state machine in spec §4).
    pub fn record_failure(&mut self, failure: AssertionFailure) {
        self.failures.push(failure);
        self.status = Status::Failed;
    }

    pub fn passed(&self) -> bool {
        self.status.is_pass()
    }
}

/// Aggregation over a contiguous run of tests sharing `suite_name`.
#[derive(Debug, Clone)]
pub struct SuiteResult {
    pub suite_name: String,
    pub total: usize,
    pub passed: usize,
    /// One glyph per test in execution order: `+` pass, `-` fail.
    pub glyphs: String,
}

impl SuiteResult {
    pub fn new(suite_name: impl Into<String>) -> Self {
        SuiteResult { suite_name: suite_name.into(), total: 0, passed: 0, glyphs: String::new() }
    }

    pub fn record(&mut self, result: &TestResult) {
        self.total += 1;
        if result.passed() {
            self.passed += 1;
            self.glyphs.push('+');
        } else {
            self.glyphs.push('-');
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.passed as f64 / self.total as f64
        }
    }
}

/// Aggregation across all suites in one run.
#[derive(Debug, Clone, Default)]
pub struct TestRun {
    pub suites: Vec<SuiteResult>,
    pub total_duration_ms: u64,
}

impl TestRun {
    pub fn total(&self) -> usize {
        self.suites.iter().map(|s| s.total).sum()
    }

    pub fn passed(&self) -> usize {
        self.suites.iter().map(|s| s.passed).sum()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }
}
