// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered, process-wide registry of declared tests (spec §4.C).
//!
//! Registration happens from pre-`main` initializers generated by
//! `warden_macros::test` (via the `ctor` crate); iteration happens later, from
//! the parent or child role. The two phases never interleave in practice, so
//! a plain `Mutex` is sufficient -- there is no contention to speak of.

use std::sync::{Mutex, OnceLock};

use crate::model::TestDescriptor;

static REGISTRY: OnceLock<Mutex<Vec<TestDescriptor>>> = OnceLock::new();

fn registry() -> &'static Mutex<Vec<TestDescriptor>> {
    REGISTRY.get_or_init(|| Mutex::new(Vec::new()))
}

/// Appends a descriptor to the registry. Registration order is what
/// `iterate` later returns, which is what the parent runs tests in.
pub fn register(descriptor: TestDescriptor) {
    registry().lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(descriptor);
}

/// Returns every registered descriptor in registration order.
pub fn iterate() -> Vec<TestDescriptor> {
    registry().lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
}

/// Looks up a descriptor by exact string equality on both fields, as the
/// child runner's `--run_test <suite> <test>` entry contract requires.
pub fn find(suite_name: &str, test_name: &str) -> Option<TestDescriptor> {
    registry()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .iter()
        .find(|d| d.suite_name == suite_name && d.test_name == test_name)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // The registry is a process-wide singleton, so tests that mutate it must
    // not run concurrently with each other.
    static TEST_LOCK: StdMutex<()> = StdMutex::new(());

    fn descriptor(suite: &str, name: &str) -> TestDescriptor {
        TestDescriptor {
            suite_name: suite.to_string(),
            test_name: name.to_string(),
            callable: || {},
            death_expect: None,
        }
    }

    #[test]
    fn iterate_preserves_registration_order() {
        let _guard = TEST_LOCK.lock().unwrap();
        let before = iterate().len();
        register(descriptor("Order", "first"));
        register(descriptor("Order", "second"));
        register(descriptor("Order", "third"));
        let names: Vec<_> = iterate()[before..].iter().map(|d| d.test_name.clone()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn find_matches_exact_strings_only() {
        let _guard = TEST_LOCK.lock().unwrap();
        register(descriptor("Lookup", "exact name"));
        assert!(find("Lookup", "exact name").is_some());
        assert!(find("Lookup", "exact Name").is_none());
        assert!(find("lookup", "exact name").is_none());
    }
}
