// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracked allocator shim. See spec component B.

mod shim;

pub use shim::{
    alloc, calloc, check_leaks, counters, disable_leak_check, disable_tracking, enable_leak_check,
    enable_tracking, free, is_tracking_active, live_records, mark_all_as_baseline,
    mark_recent_n_as_baseline, realloc, reset, try_free, try_realloc, AllocCounters, MemoryRecord, Misuse,
};
