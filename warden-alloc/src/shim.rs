// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracked allocator shim (spec §4.B). Exposes `alloc`/`calloc`/`realloc`/
//! `free`, a set of live allocations keyed by address, running counters, and
//! the baseline/leak-check machinery a death/leak test drives through.
//!
//! This does not implement `std::alloc::GlobalAlloc`: the spec's signatures
//! are `alloc(size, file, line)` etc. because the system being modeled (a C
//! allocator shim) has no way to recover caller location other than threading
//! `__FILE__`/`__LINE__` through explicitly. Rust's idiomatic equivalent is
//! `#[track_caller]`, which recovers the same provenance without widening the
//! signature or intercepting every allocation the process makes -- so these
//! functions are the ones test bodies call directly, the way a C test would
//! call an instrumented `malloc`.

use std::alloc::{self, Layout};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use warden_core::{AssertionFailure, LEAK_CONDITION};

const DEFAULT_ALIGN: usize = 16;

/// A single live allocation, as exposed to callers (spec §3 `MemoryRecord`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRecord {
    pub address: usize,
    pub size: usize,
    pub file: &'static str,
    pub line: u32,
    pub is_baseline: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocCounters {
    pub alloc_count: u64,
    pub free_count: u64,
    pub total_bytes_allocated: u64,
    pub total_bytes_freed: u64,
}

/// What went wrong when a misuse was detected. Carries enough to build the
/// diagnostic printed before the child aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misuse {
    InvalidRealloc,
    InvalidOrDoubleFree,
}

struct TrackedBlock {
    record: MemoryRecord,
    layout: Layout,
    // Insertion sequence number, used by `mark_recent_n_as_baseline`.
    seq: u64,
}

struct AllocState {
    live: HashMap<usize, TrackedBlock>,
    next_seq: u64,
    counters: AllocCounters,
    tracking_active: bool,
    leak_check_enabled: bool,
}

impl AllocState {
    fn new() -> Self {
        AllocState {
            live: HashMap::new(),
            next_seq: 0,
            counters: AllocCounters::default(),
            tracking_active: true,
            leak_check_enabled: true,
        }
    }
}

static STATE: OnceLock<Mutex<AllocState>> = OnceLock::new();

fn state() -> &'static Mutex<AllocState> {
    STATE.get_or_init(|| Mutex::new(AllocState::new()))
}

fn lock() -> std::sync::MutexGuard<'static, AllocState> {
    state().lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Resets all tracking state. Called by the child runner before every test
/// (spec §4.D step 2): clears the live set and counters, and re-enables
/// tracking and the leak check.
pub fn reset() {
    let mut s = lock();
    s.live.clear();
    s.next_seq = 0;
    s.counters = AllocCounters::default();
    s.tracking_active = true;
    s.leak_check_enabled = true;
}

/// Idempotent: calling this while already enabled does nothing observable.
pub fn enable_tracking() {
    lock().tracking_active = true;
}

pub fn disable_tracking() {
    lock().tracking_active = false;
}

pub fn is_tracking_active() -> bool {
    lock().tracking_active
}

pub fn enable_leak_check() {
    lock().leak_check_enabled = true;
}

pub fn disable_leak_check() {
    lock().leak_check_enabled = false;
}

pub fn counters() -> AllocCounters {
    lock().counters
}

/// Allocates `size` bytes, tracking the block unless tracking is disabled.
#[track_caller]
pub fn alloc(size: usize) -> *mut u8 {
    let location = std::panic::Location::caller();
    alloc_at(size, location.file(), location.line())
}

fn alloc_at(size: usize, file: &'static str, line: u32) -> *mut u8 {
    let layout = Layout::from_size_align(size.max(1), DEFAULT_ALIGN).expect("invalid allocation size");
    let ptr = unsafe { alloc::alloc(layout) };
    if ptr.is_null() {
        return ptr;
    }
    let mut s = lock();
    if s.tracking_active {
        let seq = s.next_seq;
        s.next_seq += 1;
        s.counters.alloc_count += 1;
        s.counters.total_bytes_allocated += size as u64;
        s.live.insert(
            ptr as usize,
            TrackedBlock {
                record: MemoryRecord { address: ptr as usize, size, file, line, is_baseline: false },
                layout,
                seq,
            },
        );
    }
    ptr
}

/// Allocates `n * size` zeroed bytes. Returns null on overflow or on
/// allocation failure, mirroring C's `calloc`.
#[track_caller]
pub fn calloc(n: usize, size: usize) -> *mut u8 {
    let location = std::panic::Location::caller();
    let Some(total) = n.checked_mul(size) else {
        return std::ptr::null_mut();
    };
    let ptr = alloc_at(total, location.file(), location.line());
    if !ptr.is_null() {
        unsafe { std::ptr::write_bytes(ptr, 0, total) };
    }
    ptr
}

/// Resizes a tracked allocation. `realloc(NULL, size)` is equivalent to
/// `alloc(size)`, per spec. Returns `Err(Misuse::InvalidRealloc)` for any
/// pointer the shim did not hand out itself.
#[track_caller]
pub fn try_realloc(ptr: *mut u8, new_size: usize) -> Result<*mut u8, Misuse> {
    let location = std::panic::Location::caller();
    if ptr.is_null() {
        return Ok(alloc_at(new_size, location.file(), location.line()));
    }
    let mut s = lock();
    let Some(block) = s.live.get(&(ptr as usize)) else {
        return Err(Misuse::InvalidRealloc);
    };
    let old_size = block.record.size;
    let old_layout = block.layout;
    let is_baseline = block.record.is_baseline;
    let seq = block.seq;
    drop(s);

    let new_layout = Layout::from_size_align(new_size.max(1), DEFAULT_ALIGN).expect("invalid size");
    let new_ptr = unsafe { alloc::realloc(ptr, old_layout, new_layout.size()) };
    if new_ptr.is_null() {
        return Ok(new_ptr);
    }

    let mut s = lock();
    if s.tracking_active {
        s.live.remove(&(ptr as usize));
        if new_size > old_size {
            s.counters.total_bytes_allocated += (new_size - old_size) as u64;
        } else if new_size < old_size {
            s.counters.total_bytes_freed += (old_size - new_size) as u64;
        }
        s.live.insert(
            new_ptr as usize,
            TrackedBlock {
                record: MemoryRecord {
                    address: new_ptr as usize,
                    size: new_size,
                    file: location.file(),
                    line: location.line(),
                    is_baseline,
                },
                layout: new_layout,
                seq,
            },
        );
    }
    Ok(new_ptr)
}

/// Like `try_realloc`, but aborts the process on misuse (spec §4.B: the
/// child's fatal-misuse policy). This is what test bodies normally call.
#[track_caller]
pub fn realloc(ptr: *mut u8, new_size: usize) -> *mut u8 {
    match try_realloc(ptr, new_size) {
        Ok(p) => p,
        Err(Misuse::InvalidRealloc) => abort_with_misuse(
            warden_core::misuse::INVALID_REALLOC,
            &format!("realloc of untracked pointer {ptr:p}"),
        ),
        Err(_) => unreachable!("try_realloc only returns InvalidRealloc"),
    }
}

/// Frees a tracked allocation. `free(NULL)` is always a no-op, regardless of
/// tracking state. Frees of an unrecognized pointer are misuse.
pub fn try_free(ptr: *mut u8) -> Result<(), Misuse> {
    if ptr.is_null() {
        return Ok(());
    }
    let mut s = lock();
    let Some(block) = s.live.remove(&(ptr as usize)) else {
        return Err(Misuse::InvalidOrDoubleFree);
    };
    if s.tracking_active {
        s.counters.free_count += 1;
        s.counters.total_bytes_freed += block.record.size as u64;
    }
    drop(s);
    unsafe { alloc::dealloc(ptr, block.layout) };
    Ok(())
}

/// Like `try_free`, but aborts the process on misuse.
pub fn free(ptr: *mut u8) {
    if let Err(Misuse::InvalidOrDoubleFree) = try_free(ptr) {
        abort_with_misuse(warden_core::misuse::INVALID_FREE, &format!("invalid or double free of {ptr:p}"));
    }
}

fn abort_with_misuse(exit_code: i32, message: &str) -> ! {
    eprintln!("fatal allocator misuse: {message}");
    std::process::exit(exit_code);
}

/// Marks every currently-live allocation as baseline: it may still be freed
/// normally, but it is excluded from `check_leaks`.
pub fn mark_all_as_baseline() {
    let mut s = lock();
    for block in s.live.values_mut() {
        block.record.is_baseline = true;
    }
}

/// Marks the `n` most recently allocated live blocks as baseline.
pub fn mark_recent_n_as_baseline(n: usize) {
    let mut s = lock();
    let mut seqs: Vec<u64> = s.live.values().map(|b| b.seq).collect();
    seqs.sort_unstable_by(|a, b| b.cmp(a));
    let cutoff: std::collections::HashSet<u64> = seqs.into_iter().take(n).collect();
    for block in s.live.values_mut() {
        if cutoff.contains(&block.seq) {
            block.record.is_baseline = true;
        }
    }
}

/// Runs the end-of-test leak check: a single synthesized failure listing
/// every live, non-baseline block, or `None` if there are none (spec §4.B).
/// Idempotent: running it twice in a row with nothing freed in between
/// produces the same (non-accumulating) failure.
pub fn check_leaks() -> Option<AssertionFailure> {
    let s = lock();
    if !s.leak_check_enabled {
        return None;
    }
    let mut leaked: Vec<&MemoryRecord> =
        s.live.values().map(|b| &b.record).filter(|r| !r.is_baseline).collect();
    if leaked.is_empty() {
        return None;
    }
    leaked.sort_by_key(|r| r.address);
    let actual = leaked
        .iter()
        .map(|r| format!("{} bytes at {}:{}", r.size, r.file, r.line))
        .collect::<Vec<_>>()
        .join(", ");
    Some(AssertionFailure {
        file: String::new(),
        line: 0,
        condition_str: LEAK_CONDITION.to_string(),
        expected_str: "no live allocations".to_string(),
        actual_str: actual,
    })
}

/// Returns every currently-live record, for introspection in tests.
pub fn live_records() -> Vec<MemoryRecord> {
    lock().live.values().map(|b| b.record).collect()
}
