// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process orchestration, platform abstraction, and the console reporter.
//! See spec components A, D, E, G.

pub mod child;
pub mod death;
pub mod listing;
pub mod parent;
pub mod platform;
pub mod reporter;

pub use parent::{run_parent, RunConfig, DEFAULT_TIMEOUT};
pub use reporter::{ConsoleReporter, Reporter};
