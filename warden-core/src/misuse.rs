// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exit codes reserved for fatal allocator misuse (spec §4.B/§6). Shared
//! between `warden-alloc` (which exits with one of these) and `warden-runner`
//! (which classifies any exit code in this range as `Crashed`) so neither
//! crate has to depend on the other.

/// Invalid/unknown pointer passed to `realloc`.
pub const INVALID_REALLOC: i32 = 90;
/// Invalid or double free.
pub const INVALID_FREE: i32 = 91;
/// `free(NULL)` observed while tracking was active. (Note: this is reserved
/// for symmetry with a C allocator shim; warden's own wrappers treat
/// `free(NULL)` as the required no-op per spec §4.B and never emit this
/// code themselves -- it exists so a child embedding a C allocator under
/// test can still report the same misuse class.)
pub const NULL_FREE_WHILE_TRACKING: i32 = 92;

pub const FATAL_MISUSE_EXIT_CODES: [i32; 3] = [INVALID_REALLOC, INVALID_FREE, NULL_FREE_WHILE_TRACKING];

pub fn is_fatal_misuse(exit_code: i32) -> bool {
    FATAL_MISUSE_EXIT_CODES.contains(&exit_code)
}

/// Exit code the child uses when it cannot find the requested test
/// descriptor (spec §4.D: "a distinct non-zero code").
pub const DESCRIPTOR_NOT_FOUND: i32 = 93;

/// Exit code the child uses for a malformed `--run_test` argv shape (spec §6).
pub const MALFORMED_CHILD_ARGS: i32 = 94;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misuse_codes_are_disjoint_from_each_other_and_from_child_error_codes() {
        let mut codes = FATAL_MISUSE_EXIT_CODES.to_vec();
        codes.push(DESCRIPTOR_NOT_FOUND);
        codes.push(MALFORMED_CHILD_ARGS);
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn is_fatal_misuse_rejects_ordinary_exit_codes() {
        assert!(!is_fatal_misuse(0));
        assert!(!is_fatal_misuse(1));
        assert!(is_fatal_misuse(INVALID_FREE));
    }
}
