// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The record-failure sink (spec §4.F): a per-thread "current test result"
//! that assertion macros append to. Modeled on the thread-local running
//! outcome used by the pack's own `googletest-rust` (`TestOutcome`):
//! a thread-local slot is initialized when a test starts, mutated by
//! assertion macros as it runs, and read back and cleared when it ends.

use std::cell::RefCell;

use crate::model::{AssertionFailure, TestResult};

thread_local! {
    static CURRENT: RefCell<Option<TestResult>> = const { RefCell::new(None) };
}

/// Starts a fresh current result. Called by the child runner immediately
/// before invoking a test's callable.
pub fn begin(suite_name: &str, test_name: &str) {
    CURRENT.with(|current| {
        *current.borrow_mut() = Some(TestResult::new(suite_name, test_name));
    });
}

/// Appends a failure to the current result, in the order observed. This is
/// the one hook the (out-of-core) assertion vocabulary is expected to call.
///
/// # Panics
/// Panics if called with no test currently running -- that indicates a bug
/// in an assertion macro, not a test failure.
pub fn record_failure(file: &str, line: u32, condition_str: &str, expected_str: &str, actual_str: &str) {
    CURRENT.with(|current| {
        let mut current = current.borrow_mut();
        let result = current.as_mut().expect("record_failure called with no test running");
        result.record_failure(AssertionFailure {
            file: file.to_string(),
            line,
            condition_str: condition_str.to_string(),
            expected_str: expected_str.to_string(),
            actual_str: actual_str.to_string(),
        });
    });
}

/// Returns whether the currently running test has recorded any failures yet.
pub fn has_failures() -> bool {
    CURRENT.with(|current| current.borrow().as_ref().map(|r| !r.failures.is_empty()).unwrap_or(false))
}

/// Ends the current test, returning its accumulated result.
///
/// # Panics
/// Panics if `begin` was never called -- a child-runner bug.
pub fn end() -> TestResult {
    CURRENT.with(|current| current.borrow_mut().take().expect("end() called without a matching begin()"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_preserve_fifo_order() {
        begin("Sink", "fifo order");
        record_failure("f.c", 1, "a", "", "");
        record_failure("f.c", 2, "b", "", "");
        record_failure("f.c", 3, "c", "", "");
        let result = end();
        let lines: Vec<_> = result.failures.iter().map(|f| f.condition_str.clone()).collect();
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn no_failures_yields_passed_status() {
        begin("Sink", "clean run");
        let result = end();
        assert!(result.passed());
        assert!(result.failures.is_empty());
    }
}
