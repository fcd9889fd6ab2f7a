// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spawns each fixture binary in parent mode (no args) and checks the
//! process-level outcome the way a CI job would: exit code, plus a sanity
//! check on the printed diagnosis. Each fixture binary re-execs itself as a
//! child via `--run_test`, so this exercises the full parent/child round
//! trip, not just in-process logic.

use std::process::Command;

#[test]
fn arithmetic_pass_fixture_passes() {
    let output = Command::new(env!("CARGO_BIN_EXE_arithmetic_pass")).output().expect("spawn fixture");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn memory_leak_fixture_fails_the_run_and_reports_the_leak() {
    let output = Command::new(env!("CARGO_BIN_EXE_memory_leak")).output().expect("spawn fixture");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("100"), "expected the leaked size in output, got: {stdout}");
}

#[test]
fn null_free_misuse_fixture_crashes_and_fails_the_run() {
    let output = Command::new(env!("CARGO_BIN_EXE_null_free_misuse")).output().expect("spawn fixture");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Crashed"), "expected a Crashed status in the report, got: {stdout}");
}

#[cfg(unix)]
#[test]
fn death_by_signal_fixture_passes() {
    let output = Command::new(env!("CARGO_BIN_EXE_death_by_signal")).output().expect("spawn fixture");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn timeout_forever_fixture_fails_the_run_after_the_configured_timeout() {
    let output = Command::new(env!("CARGO_BIN_EXE_timeout_forever")).output().expect("spawn fixture");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Test exceeded timeout"), "stdout: {stdout}");
}

#[test]
fn stdout_mismatch_fixture_fails_with_the_stdout_tag() {
    let output = Command::new(env!("CARGO_BIN_EXE_stdout_mismatch")).output().expect("spawn fixture");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("captured stdout matches"), "stdout: {stdout}");
}
