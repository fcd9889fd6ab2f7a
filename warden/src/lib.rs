// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facade crate: the `#[warden::test]` registration macro, the assertion
//! vocabulary, and the generated process entry point. Everything here wires
//! together `warden-core`, `warden-alloc`, `warden-macros`, `warden-runner`,
//! and `warden-assert` behind one dependency.

mod cli;

pub use cli::run;
pub use warden_alloc;
pub use warden_assert::{capture_stdout, check, check_eq, check_false, check_stdout_eq, check_true, STDOUT_TAG};
pub use warden_macros::test;
pub use warden_runner::{ConsoleReporter, Reporter, RunConfig};

/// Generates `fn main()`. Every warden test binary ends with a call to this.
#[macro_export]
macro_rules! warden_main {
    () => {
        fn main() {
            std::process::exit($crate::run());
        }
    };
}

/// Not part of the public API: referenced by code `warden-macros` generates.
#[doc(hidden)]
pub mod __private {
    pub use ctor;
    pub use warden_core::registry;
    pub use warden_core::{DeathExpect, TestDescriptor};
}
