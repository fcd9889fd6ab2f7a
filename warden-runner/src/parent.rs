// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parent-side orchestration: spawn one child per test, wait with timeout,
//! classify the outcome, and drive the reporter (spec §4.E).

use std::time::{Duration, Instant};

use tracing::{debug, info};
use warden_core::{misuse, wire, AssertionFailure, DeathExpect, Status, SuiteResult, TestDescriptor, TestResult, TestRun};

use crate::platform::{self, WaitOutcome};
use crate::reporter::Reporter;
use crate::death;

/// Default per-test wall-clock budget (spec §5: "default 2 s; configurable
/// at compile time" -- exposed here as a runtime field instead, since a
/// compile-time-only knob would force a rebuild for every CI tuning pass).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

pub struct RunConfig {
    pub suite_filter: Option<String>,
    pub timeout: Duration,
    pub ci_mode: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig { suite_filter: None, timeout: DEFAULT_TIMEOUT, ci_mode: false }
    }
}

/// Runs every registered test (optionally filtered by suite) and returns the
/// aggregated `TestRun`. Returns `true` from the caller's perspective iff
/// `run.all_passed()` -- that mapping to the process exit code lives in the
/// `warden` facade crate, not here.
pub fn run_parent(config: &RunConfig, reporter: &mut dyn Reporter) -> TestRun {
    let descriptors: Vec<TestDescriptor> = warden_core::registry::iterate()
        .into_iter()
        .filter(|d| config.suite_filter.as_deref().map_or(true, |f| f == d.suite_name))
        .collect();

    let mut run = TestRun::default();
    reporter.on_run_start(&run);
    let run_start = Instant::now();

    let mut current_suite: Option<SuiteResult> = None;
    for descriptor in &descriptors {
        if current_suite.as_ref().map(|s| s.suite_name.as_str()) != Some(descriptor.suite_name.as_str()) {
            close_suite(&mut current_suite, &mut run, reporter);
            let fresh = SuiteResult::new(descriptor.suite_name.clone());
            reporter.on_suite_start(&fresh);
            current_suite = Some(fresh);
        }

        let test_start = Instant::now();
        let mut result = execute_one(descriptor, config.timeout);
        result.duration_ms = test_start.elapsed().as_millis() as u64;

        debug!(suite = %descriptor.suite_name, test = %descriptor.test_name, status = %result.status, "test finished");
        if let Some(suite) = current_suite.as_mut() {
            suite.record(&result);
        }
        reporter.on_test_finish(&result);
    }
    close_suite(&mut current_suite, &mut run, reporter);

    run.total_duration_ms = run_start.elapsed().as_millis() as u64;
    info!(total = run.total(), passed = run.passed(), "run finished");
    reporter.on_run_finish(&run);
    run
}

fn close_suite(current: &mut Option<SuiteResult>, run: &mut TestRun, reporter: &mut dyn Reporter) {
    if let Some(finished) = current.take() {
        reporter.on_suite_finish(&finished);
        run.suites.push(finished);
    }
}

/// Spawns, waits, classifies, and assembles the `TestResult` for one
/// descriptor. A spawn failure is a framework error (spec §7): it surfaces
/// as a synthetic FAILED result rather than propagating and aborting the run.
fn execute_one(descriptor: &TestDescriptor, timeout: Duration) -> TestResult {
    let argv = vec!["--run_test".to_string(), descriptor.suite_name.clone(), descriptor.test_name.clone()];
    let mut handle = match platform::spawn_child(&argv) {
        Ok(handle) => handle,
        Err(err) => {
            let mut result = TestResult::new(&descriptor.suite_name, &descriptor.test_name);
            result.record_failure(AssertionFailure {
                file: String::new(),
                line: 0,
                condition_str: "framework error".to_string(),
                expected_str: "child process spawned successfully".to_string(),
                actual_str: format!("spawn failed: {err}"),
            });
            return result;
        }
    };

    let outcome = handle.wait_with_timeout(timeout);
    let captured = handle.take_captured();
    classify(descriptor, outcome, captured)
}

fn classify(descriptor: &TestDescriptor, outcome: WaitOutcome, captured_bytes: Vec<u8>) -> TestResult {
    let mut result = TestResult::new(&descriptor.suite_name, &descriptor.test_name);
    let captured_text = String::from_utf8_lossy(&captured_bytes).into_owned();

    if let WaitOutcome::TimedOut = outcome {
        result.status = Status::Timeout;
        result.captured_output = "Test exceeded timeout.".to_string();
        return result;
    }

    if let WaitOutcome::Exited(code) = outcome {
        if misuse::is_fatal_misuse(code) {
            result.status = Status::Crashed;
            result.captured_output = captured_text;
            return result;
        }
    }

    if let Some(death_expect) = &descriptor.death_expect {
        return classify_death(death_expect, outcome, &captured_text, result);
    }

    match outcome {
        WaitOutcome::Exited(0) => match wire::decode(&captured_bytes) {
            Ok(decoded) => {
                for failure in decoded.failures {
                    result.record_failure(failure);
                }
                result.captured_output = captured_text;
            }
            Err(err) => {
                result.status = Status::Crashed;
                result.captured_output = format!("malformed result stream ({err}): {captured_text}");
            }
        },
        _ => {
            result.status = Status::Crashed;
            result.captured_output = captured_text;
        }
    }
    result
}

/// Applies every present clause of `death_expect` to the observed
/// termination (spec §4.E). All clauses must hold, plus the base
/// requirement that the process did not exit zero.
fn classify_death(
    death_expect: &DeathExpect,
    outcome: WaitOutcome,
    captured_text: &str,
    mut result: TestResult,
) -> TestResult {
    let mut violations = Vec::new();

    if matches!(outcome, WaitOutcome::Exited(0)) {
        violations.push("process exited 0; a death test must terminate abnormally".to_string());
    }

    if death_expect.expected_signal != 0 {
        match outcome {
            WaitOutcome::Signaled(signal) if signal == death_expect.expected_signal => {}
            WaitOutcome::Signaled(signal) => {
                violations.push(format!("expected signal {}, got signal {signal}", death_expect.expected_signal))
            }
            WaitOutcome::Exited(code) => violations.push(format!(
                "expected signal {}, process exited with code {code} instead",
                death_expect.expected_signal
            )),
            WaitOutcome::TimedOut => unreachable!("timeouts are classified before death expectations"),
        }
    }

    if death_expect.expected_exit_code != -1 {
        match outcome {
            WaitOutcome::Exited(code) if code == death_expect.expected_exit_code => {}
            WaitOutcome::Exited(code) => violations.push(format!(
                "expected exit code {}, got {code}",
                death_expect.expected_exit_code
            )),
            WaitOutcome::Signaled(signal) => violations.push(format!(
                "expected exit code {}, process was signaled ({signal}) instead",
                death_expect.expected_exit_code
            )),
            WaitOutcome::TimedOut => unreachable!("timeouts are classified before death expectations"),
        }
    }

    if let Some(expected_msg) = &death_expect.expected_assert_msg {
        match death::extract_assert_message(captured_text) {
            None => violations.push("no assert message could be extracted from captured output".to_string()),
            Some(actual) => {
                let matched = if death_expect.match_exactly {
                    actual == *expected_msg
                } else {
                    death::similarity(&actual, expected_msg) >= death_expect.min_similarity
                };
                if !matched {
                    violations.push(format!("expected assert message `{expected_msg}`, got `{actual}`"));
                }
            }
        }
    }

    if violations.is_empty() {
        result.status = Status::DeathTestPassed;
        result.captured_output = captured_text.to_string();
    } else {
        result.status = Status::Failed;
        result.captured_output = format!("death test expectation not met:\n{}", violations.join("\n"));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::model::DeathExpect as DE;

    fn descriptor() -> TestDescriptor {
        TestDescriptor {
            suite_name: "Death".into(),
            test_name: "by signal".into(),
            callable: || {},
            death_expect: None,
        }
    }

    #[test]
    fn exit_zero_with_clean_result_decodes_to_passed() {
        let result = TestResult::new("Arithmetic", "adds");
        let bytes = wire::encode(&result);
        let classified = classify(&descriptor(), WaitOutcome::Exited(0), bytes);
        assert_eq!(classified.status, Status::Passed);
    }

    #[test]
    fn exit_zero_with_recorded_failure_decodes_to_failed() {
        let mut result = TestResult::new("Arithmetic", "adds");
        result.record_failure(AssertionFailure {
            file: "t.c".into(),
            line: 1,
            condition_str: "2+2 == 5".into(),
            expected_str: "5".into(),
            actual_str: "4".into(),
        });
        let bytes = wire::encode(&result);
        let classified = classify(&descriptor(), WaitOutcome::Exited(0), bytes);
        assert_eq!(classified.status, Status::Failed);
        assert_eq!(classified.failures.len(), 1);
    }

    #[test]
    fn nonzero_exit_without_death_expectation_is_crashed() {
        let classified = classify(&descriptor(), WaitOutcome::Exited(134), Vec::new());
        assert_eq!(classified.status, Status::Crashed);
    }

    #[test]
    fn fatal_misuse_exit_code_is_crashed() {
        let classified = classify(&descriptor(), WaitOutcome::Exited(misuse::INVALID_FREE), Vec::new());
        assert_eq!(classified.status, Status::Crashed);
    }

    #[test]
    fn timeout_produces_fixed_message() {
        let classified = classify(&descriptor(), WaitOutcome::TimedOut, b"partial garbage".to_vec());
        assert_eq!(classified.status, Status::Timeout);
        assert_eq!(classified.captured_output, "Test exceeded timeout.");
    }

    #[test]
    fn death_test_matching_expected_signal_passes() {
        let mut d = descriptor();
        d.death_expect = Some(DE { expected_signal: 11, ..Default::default() });
        let classified = classify(&d, WaitOutcome::Signaled(11), Vec::new());
        assert_eq!(classified.status, Status::DeathTestPassed);
    }

    #[test]
    fn death_test_with_wrong_signal_fails_with_diagnosis() {
        let mut d = descriptor();
        d.death_expect = Some(DE { expected_signal: 11, ..Default::default() });
        let classified = classify(&d, WaitOutcome::Signaled(6), Vec::new());
        assert_eq!(classified.status, Status::Failed);
        assert!(classified.captured_output.contains("expected signal 11"));
    }

    #[test]
    fn death_test_exiting_zero_always_fails_regardless_of_other_clauses() {
        let mut d = descriptor();
        d.death_expect = Some(DE { expected_exit_code: 0, ..Default::default() });
        let classified = classify(&d, WaitOutcome::Exited(0), Vec::new());
        assert_eq!(classified.status, Status::Failed);
    }

    #[test]
    fn death_test_with_matching_exit_code_passes() {
        let mut d = descriptor();
        d.death_expect = Some(DE { expected_exit_code: 139, ..Default::default() });
        let classified = classify(&d, WaitOutcome::Exited(139), Vec::new());
        assert_eq!(classified.status, Status::DeathTestPassed);
    }

    #[test]
    fn death_test_with_fuzzy_assert_message_match_passes() {
        let mut d = descriptor();
        d.death_expect = Some(DE {
            expected_signal: 6,
            expected_assert_msg: Some("pointer must not be null".to_string()),
            ..Default::default()
        });
        let output = r#"Assertion failed: p != 0 && "pointer must not be nul1" on file a.c line 9"#;
        let classified = classify(&d, WaitOutcome::Signaled(6), output.as_bytes().to_vec());
        assert_eq!(classified.status, Status::DeathTestPassed);
    }

    #[test]
    fn death_test_with_unextractable_assert_message_fails() {
        let mut d = descriptor();
        d.death_expect = Some(DE {
            expected_signal: 6,
            expected_assert_msg: Some("anything".to_string()),
            ..Default::default()
        });
        let classified = classify(&d, WaitOutcome::Signaled(6), b"segfault, no diagnostic".to_vec());
        assert_eq!(classified.status, Status::Failed);
        assert!(classified.captured_output.contains("no assert message could be extracted"));
    }
}
