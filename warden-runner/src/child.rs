// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-test execution inside the spawned child process (spec §4.D).

use std::io::Write;

use tracing::{error, warn};
use warden_core::misuse;

/// Runs exactly one test and exits the process; never returns.
///
/// `suite_name`/`test_name` must match a registered descriptor by exact
/// string equality. Any other shape of `--run_test` invocation is rejected
/// by the CLI layer before this function is ever called.
pub fn run_child(suite_name: &str, test_name: &str) -> ! {
    let Some(descriptor) = warden_core::registry::find(suite_name, test_name) else {
        eprintln!("warden: no test registered as `{suite_name} / {test_name}`");
        std::process::exit(misuse::DESCRIPTOR_NOT_FOUND);
    };

    warden_alloc::reset();
    warden_core::sink::begin(&descriptor.suite_name, &descriptor.test_name);

    (descriptor.callable)();

    if let Some(leak) = warden_alloc::check_leaks() {
        warden_core::sink::record_failure(
            &leak.file,
            leak.line,
            &leak.condition_str,
            &leak.expected_str,
            &leak.actual_str,
        );
    }

    let result = warden_core::sink::end();
    if !result.passed() {
        warn!(test = %test_name, failures = result.failures.len(), "test recorded failures");
    }

    let bytes = warden_core::wire::encode(&result);
    if let Err(err) = write_unbuffered(&bytes) {
        error!(%err, "failed to write result to stdout");
        std::process::exit(1);
    }
    std::process::exit(0);
}

fn write_unbuffered(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()
}
