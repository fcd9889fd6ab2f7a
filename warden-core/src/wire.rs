// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The child-to-parent wire protocol (spec §6): ASCII records terminated by
//! the unit-separator byte `0x1F`, never newline-delimited, so that captured
//! test output (which may itself contain newlines, ANSI escapes, or anything
//! else) can never be mistaken for a record boundary.

use thiserror::Error;

use crate::model::{AssertionFailure, Status, TestResult};

/// Byte terminating every record.
pub const RECORD_SEP: u8 = 0x1F;

const STATUS_PASSED: i32 = 0;
const STATUS_FAILED: i32 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("wire stream ended before an end_of_data record was seen")]
    Truncated,
    #[error("malformed status record: {0:?}")]
    BadStatus(String),
}

/// Serializes a child's final result: one `status=` record, one `failure=`
/// record per recorded failure in FIFO order, then a closing `end_of_data`.
///
/// # Panics
/// Panics if `result.status` is anything other than `Passed`/`Failed` --
/// those are the only statuses a child ever assigns itself (spec §4.D step
/// 6); `Crashed`/`Timeout`/`DeathTestPassed` are parent-assigned and never
/// serialized.
pub fn encode(result: &TestResult) -> Vec<u8> {
    let mut out = Vec::new();
    // A leading separator isolates the first record even if something was
    // already written to stdout before this call (e.g. a test body that
    // prints without going through a capture assertion) -- decode() ignores
    // any segment that doesn't match a known prefix, so stray output before
    // the first 0x1F is simply discarded rather than corrupting `status=`.
    out.push(RECORD_SEP);
    let status_code = match result.status {
        Status::Passed => STATUS_PASSED,
        Status::Failed => STATUS_FAILED,
        other => panic!("child results must be Passed or Failed, got {other}"),
    };
    push_record(&mut out, &format!("status={status_code}"));
    for failure in &result.failures {
        push_record(
            &mut out,
            &format!(
                "failure={}|{}|{}|{}|{}",
                failure.file, failure.line, failure.condition_str, failure.expected_str, failure.actual_str,
            ),
        );
    }
    push_record(&mut out, "end_of_data");
    out
}

fn push_record(out: &mut Vec<u8>, record: &str) {
    out.extend_from_slice(record.as_bytes());
    out.push(RECORD_SEP);
}

/// The subset of a `TestResult` a child is allowed to report about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedResult {
    pub status: Status,
    pub failures: Vec<AssertionFailure>,
}

/// Parses the format `encode` produces. Tolerant of `failure=` records with
/// fewer than five `|`-separated fields -- missing trailing fields decode as
/// empty strings, per §6.
pub fn decode(bytes: &[u8]) -> Result<DecodedResult, WireError> {
    let text = String::from_utf8_lossy(bytes);
    let mut status = None;
    let mut failures = Vec::new();
    let mut saw_end = false;
    for record in text.split(RECORD_SEP as char).filter(|r| !r.is_empty()) {
        if record == "end_of_data" {
            saw_end = true;
            break;
        } else if let Some(value) = record.strip_prefix("status=") {
            status = Some(parse_status(value)?);
        } else if let Some(value) = record.strip_prefix("failure=") {
            failures.push(parse_failure(value));
        }
    }
    if !saw_end {
        return Err(WireError::Truncated);
    }
    // A missing status record (e.g. the child died mid-write) is treated as
    // a failure rather than silently passing.
    Ok(DecodedResult { status: status.unwrap_or(Status::Failed), failures })
}

fn parse_status(value: &str) -> Result<Status, WireError> {
    match value.parse::<i32>() {
        Ok(STATUS_PASSED) => Ok(Status::Passed),
        Ok(STATUS_FAILED) => Ok(Status::Failed),
        _ => Err(WireError::BadStatus(value.to_string())),
    }
}

fn parse_failure(value: &str) -> AssertionFailure {
    let mut fields = value.splitn(5, '|');
    AssertionFailure {
        file: fields.next().unwrap_or("").to_string(),
        line: fields.next().and_then(|f| f.parse().ok()).unwrap_or(0),
        condition_str: fields.next().unwrap_or("").to_string(),
        expected_str: fields.next().unwrap_or("").to_string(),
        actual_str: fields.next().unwrap_or("").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> TestResult {
        let mut result = TestResult::new("Wire", "round trip");
        result.record_failure(AssertionFailure {
            file: "t.c".into(),
            line: 10,
            condition_str: "x == y".into(),
            expected_str: "1".into(),
            actual_str: "2".into(),
        });
        result
    }

    #[test]
    fn round_trips_well_formed_results() {
        let result = sample_result();
        let decoded = decode(&encode(&result)).unwrap();
        assert_eq!(decoded.status, result.status);
        assert_eq!(decoded.failures, result.failures);
    }

    #[test]
    fn passing_result_has_no_failures() {
        let result = TestResult::new("Wire", "clean");
        let decoded = decode(&encode(&result)).unwrap();
        assert_eq!(decoded.status, Status::Passed);
        assert!(decoded.failures.is_empty());
    }

    #[test]
    fn missing_trailing_fields_decode_as_empty() {
        let bytes = [
            "status=1",
            "failure=file.c|42|cond",
            "end_of_data",
        ]
        .join("\u{1F}")
            + "\u{1F}";
        let decoded = decode(bytes.as_bytes()).unwrap();
        assert_eq!(decoded.failures.len(), 1);
        let failure = &decoded.failures[0];
        assert_eq!(failure.file, "file.c");
        assert_eq!(failure.line, 42);
        assert_eq!(failure.condition_str, "cond");
        assert_eq!(failure.expected_str, "");
        assert_eq!(failure.actual_str, "");
    }

    #[test]
    fn truncated_stream_without_end_marker_errors() {
        let bytes = format!("status=0{}", RECORD_SEP as char);
        assert_eq!(decode(bytes.as_bytes()), Err(WireError::Truncated));
    }

    #[test]
    fn failures_preserve_fifo_order_across_the_wire() {
        let mut result = TestResult::new("Wire", "fifo");
        for i in 0..5 {
            result.record_failure(AssertionFailure {
                file: "t.c".into(),
                line: i,
                condition_str: format!("check_{i}"),
                expected_str: String::new(),
                actual_str: String::new(),
            });
        }
        let decoded = decode(&encode(&result)).unwrap();
        let order: Vec<_> = decoded.failures.iter().map(|f| f.condition_str.clone()).collect();
        assert_eq!(order, vec!["check_0", "check_1", "check_2", "check_3", "check_4"]);
    }
}
