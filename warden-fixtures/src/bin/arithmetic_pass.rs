// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spec §8 scenario 1: a clean pass with no failures.

#[warden::test(suite = "Arithmetic")]
fn adds_two_positives() {
    warden::check_eq!(5, 2 + 3);
    warden::check_true!(1 + 1 == 2);
    warden::check_false!(1 + 1 == 3);
}

warden::warden_main!();
