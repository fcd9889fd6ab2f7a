// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI contract (spec §6) and process entry point shared by every warden
//! binary.

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "warden", about = "sandboxed per-test native harness")]
struct RawArgs {
    /// Child mode: run exactly one test and report its result on stdout.
    #[arg(long = "run_test", num_args = 2, value_names = ["SUITE", "TEST"])]
    run_test: Option<Vec<String>>,

    /// Parent mode only: restrict the run to one suite (exact match).
    #[arg(long = "suite")]
    suite: Option<String>,

    /// Dump the registry as JSON instead of running anything.
    #[arg(long)]
    list: bool,
}

/// Parses argv, dispatches to the child or parent role, and returns the
/// process exit code (spec §6: 0 iff every executed test passed). Never
/// returns in child mode -- `run_child` exits the process itself.
pub fn run() -> i32 {
    init_tracing();
    let args = RawArgs::parse();

    if let Some(run_test) = args.run_test {
        let Ok([suite, test]) = <[String; 2]>::try_from(run_test) else {
            eprintln!("warden: --run_test requires exactly two arguments: <suite> <test>");
            return warden_core::misuse::MALFORMED_CHILD_ARGS;
        };
        warden_runner::child::run_child(&suite, &test);
    }

    if args.list {
        return match warden_runner::listing::list_as_json() {
            Ok(json) => {
                println!("{json}");
                0
            }
            Err(err) => {
                eprintln!("warden: failed to list registered tests: {err}");
                1
            }
        };
    }

    let config = warden_runner::RunConfig {
        suite_filter: args.suite,
        timeout: warden_runner::DEFAULT_TIMEOUT,
        ci_mode: std::env::var_os("CI").is_some(),
    };
    let mut reporter =
        warden_runner::ConsoleReporter::new(warden_runner::platform::colors_enabled(), config.ci_mode);
    let run = warden_runner::run_parent(&config, &mut reporter);
    if run.all_passed() {
        0
    } else {
        1
    }
}

/// Reads verbosity from `WARDEN_LOG`, defaulting to warnings-only. Failure to
/// install the subscriber (e.g. a second call in the same process, as
/// happens across the integration tests) is silently ignored.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("WARDEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
