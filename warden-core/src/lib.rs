// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model, registry, record-failure sink, and wire protocol shared by
//! every warden crate. See spec components C and F.

pub mod misuse;
pub mod model;
pub mod registry;
pub mod sink;
pub mod wire;

pub use model::{
    AssertionFailure, DeathExpect, Status, SuiteResult, TestDescriptor, TestResult, TestRun,
    LEAK_CONDITION, STDOUT_TAG,
};
