// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spec §8 scenario 5: a test whose body never returns is classified TIMEOUT.

#[warden::test(suite = "Timing")]
fn loops_forever() {
    loop {
        std::hint::spin_loop();
    }
}

warden::warden_main!();
