// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spec §8 scenario 2: an unfreed allocation is reported as a leak.

#[warden::test(suite = "Memory")]
fn detects_a_leak() {
    let _leaked = warden::warden_alloc::alloc(100);
}

warden::warden_main!();
