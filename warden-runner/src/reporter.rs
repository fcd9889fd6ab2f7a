// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporter interface and the default console reporter (spec §4.G).

use comfy_table::{presets::UTF8_FULL, Cell, Table};
use console::{style, StyledObject};
use warden_core::{Status, SuiteResult, TestResult, TestRun, STDOUT_TAG};

/// Five optional callbacks invoked by the parent as a run progresses. All
/// have empty default bodies so a reporter only overrides what it cares
/// about, mirroring libtest's own `Output`-trait split observed in the pack.
pub trait Reporter {
    fn on_run_start(&mut self, _run: &TestRun) {}
    fn on_suite_start(&mut self, _suite: &SuiteResult) {}
    fn on_test_finish(&mut self, _result: &TestResult) {}
    fn on_suite_finish(&mut self, _suite: &SuiteResult) {}
    fn on_run_finish(&mut self, _run: &TestRun) {}
}

/// Human-readable reporter for a terminal or CI log. Emits the §6 CI block
/// at the end of the run when `ci_mode` is set.
pub struct ConsoleReporter {
    colors_enabled: bool,
    ci_mode: bool,
}

impl ConsoleReporter {
    pub fn new(colors_enabled: bool, ci_mode: bool) -> Self {
        ConsoleReporter { colors_enabled, ci_mode }
    }

    fn paint_status(&self, status: Status) -> StyledObject<String> {
        let text = status.to_string();
        let styled = style(text);
        if !self.colors_enabled {
            return styled;
        }
        match status {
            Status::Passed | Status::DeathTestPassed => styled.green(),
            Status::Failed | Status::Crashed => styled.red(),
            Status::Timeout => styled.yellow(),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn on_suite_start(&mut self, suite: &SuiteResult) {
        println!("== {} ==", suite.suite_name);
    }

    fn on_test_finish(&mut self, result: &TestResult) {
        println!(
            "  [{}] {} ({} ms)",
            self.paint_status(result.status),
            result.test_name,
            result.duration_ms
        );
        for failure in &result.failures {
            if let Some(rest) = failure.condition_str.strip_prefix(STDOUT_TAG) {
                println!(
                    "      {file}:{line}: {rest}\n        expected: {exp}\n        actual:   {act}",
                    file = failure.file,
                    line = failure.line,
                    rest = rest.trim(),
                    exp = failure.expected_str.escape_default(),
                    act = failure.actual_str.escape_default(),
                );
            } else {
                println!(
                    "      {file}:{line}: {cond}\n        expected: {exp}\n        actual:   {act}",
                    file = failure.file,
                    line = failure.line,
                    cond = failure.condition_str,
                    exp = failure.expected_str,
                    act = failure.actual_str,
                );
            }
        }
        // Crashes, timeouts, and death-test mismatches carry their
        // diagnosis in `captured_output` rather than as structured
        // failures (spec §4.E/§7): print it when there's nothing else to
        // show the user why the test didn't pass.
        if result.failures.is_empty() && !result.status.is_pass() && !result.captured_output.is_empty() {
            println!("      {}", result.captured_output.replace('\n', "\n      "));
        }
    }

    fn on_suite_finish(&mut self, suite: &SuiteResult) {
        println!("  {}/{} passed [{}]", suite.passed, suite.total, suite.glyphs);
    }

    fn on_run_finish(&mut self, run: &TestRun) {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec!["Suite", "Total", "Passed", "Failed", "Success", "Glyphs"]);
        for suite in &run.suites {
            table.add_row(vec![
                Cell::new(&suite.suite_name),
                Cell::new(suite.total),
                Cell::new(suite.passed),
                Cell::new(suite.total - suite.passed),
                Cell::new(format!("{:.1}%", suite.pass_rate() * 100.0)),
                Cell::new(&suite.glyphs),
            ]);
        }
        println!("{table}");
        println!(
            "{}/{} tests passed in {} ms",
            run.passed(),
            run.total(),
            run.total_duration_ms
        );

        if self.ci_mode {
            print!("{}", ci_block(run));
        }
    }
}

/// The §6 machine-parseable CI block: four lines, one per metric, each
/// space/semicolon-delimited per suite.
pub fn ci_block(run: &TestRun) -> String {
    let passed_total = run
        .suites
        .iter()
        .map(|s| format!("{}/{}", s.passed, s.total))
        .collect::<Vec<_>>()
        .join(" ");

    let glyph_matrix = run
        .suites
        .iter()
        .map(|s| s.glyphs.chars().map(|c| c.to_string()).collect::<Vec<_>>().join(";"))
        .collect::<Vec<_>>()
        .join(";;");

    let passed_counts = run.suites.iter().map(|s| s.passed.to_string()).collect::<Vec<_>>().join(";");

    let pass_rates = run
        .suites
        .iter()
        .map(|s| format!("{:.3}", s.pass_rate()))
        .collect::<Vec<_>>()
        .join(";");

    format!(
        "passed_total: {passed_total}\nglyphs: {glyph_matrix}\npassed: {passed_counts}\npass_rate: {pass_rates}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::SuiteResult;

    fn run_with_two_suites() -> TestRun {
        let mut run = TestRun::default();
        let mut a = SuiteResult::new("Arithmetic");
        a.total = 2;
        a.passed = 1;
        a.glyphs = "+-".to_string();
        let mut b = SuiteResult::new("Memory");
        b.total = 1;
        b.passed = 1;
        b.glyphs = "+".to_string();
        run.suites.push(a);
        run.suites.push(b);
        run
    }

    #[test]
    fn ci_block_has_four_lines_with_expected_shape() {
        let block = ci_block(&run_with_two_suites());
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "passed_total: 1/2 1/1");
        assert_eq!(lines[1], "glyphs: +;-;;+");
        assert_eq!(lines[2], "passed: 1;1");
        assert_eq!(lines[3], "pass_rate: 0.500;1.000");
    }
}
