// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spec §8 scenario 4: a null-pointer dereference is expected to terminate
//! the child with SIGSEGV.

#[warden::test(suite = "Death", signal = 11)]
fn null_pointer_dereference() {
    let ptr: *const i32 = std::ptr::null();
    unsafe {
        let _ = std::ptr::read_volatile(ptr);
    }
}

warden::warden_main!();
