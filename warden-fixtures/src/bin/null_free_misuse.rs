// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spec §8 scenario 3, adapted: §4.B is explicit that `free(NULL)` is a
//! required no-op, not a misuse, so this demonstrates the same fatal-misuse
//! contract (reserved exit code, parent classifies CRASHED) via the other
//! trigger named in §4.B -- a free of a pointer the allocator never handed
//! out. See DESIGN.md for the full resolution of this tension.

#[warden::test(suite = "Memory")]
fn frees_an_unrecognized_pointer() {
    let bogus = 0x1usize as *mut u8;
    warden::warden_alloc::free(bogus);
}

warden::warden_main!();
