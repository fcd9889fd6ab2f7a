// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spec §8 scenario 6: a captured-output assertion mismatch is reported with
//! the reserved `[STDOUT]` condition-string tag.

#[warden::test(suite = "Capture")]
fn prints_hello_but_expects_hi() {
    warden::check_stdout_eq!("hi\n", {
        println!("hello");
    });
}

warden::warden_main!();
