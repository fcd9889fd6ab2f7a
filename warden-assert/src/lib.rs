// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal assertion vocabulary backed by `warden_core::sink`. Deliberately
//! thin: the spec treats the full assertion vocabulary as an external
//! collaborator of the core, needing only the `record_failure` hook.
//!
//! Every macro here is non-fatal: a failed check records a failure and
//! execution continues, matching the child's "surface as many failures as
//! possible" recovery policy (spec §7).

#[doc(hidden)]
pub use warden_core::sink::record_failure as __record_failure;
pub use warden_core::STDOUT_TAG;

/// Records a failure unless `$cond` holds.
#[macro_export]
macro_rules! check {
    ($cond:expr) => {
        if !($cond) {
            $crate::__record_failure(file!(), line!(), stringify!($cond), "true", "false");
        }
    };
}

/// Alias for [`check!`] for call sites that read better asserting a boolean.
#[macro_export]
macro_rules! check_true {
    ($cond:expr) => {
        $crate::check!($cond)
    };
}

#[macro_export]
macro_rules! check_false {
    ($cond:expr) => {
        $crate::check!(!($cond))
    };
}

/// Records a failure unless `$actual == $expected`. Argument order follows
/// the expected-then-actual convention (expected_str/actual_str are filled
/// in that order).
#[macro_export]
macro_rules! check_eq {
    ($expected:expr, $actual:expr) => {{
        let (expected, actual) = (&$expected, &$actual);
        if *expected != *actual {
            $crate::__record_failure(
                file!(),
                line!(),
                concat!(stringify!($expected), " == ", stringify!($actual)),
                &format!("{expected:?}"),
                &format!("{actual:?}"),
            );
        }
    }};
}

/// Runs `$body`, capturing everything it writes to stdout, and records a
/// `[STDOUT]`-tagged failure if the captured text doesn't equal `$expected`.
#[macro_export]
macro_rules! check_stdout_eq {
    ($expected:expr, $body:block) => {{
        let expected_value: String = ($expected).to_string();
        let actual = $crate::capture_stdout(|| $body);
        if actual != expected_value {
            $crate::__record_failure(
                file!(),
                line!(),
                &format!("{}captured stdout matches", $crate::STDOUT_TAG),
                &expected_value,
                &actual,
            );
        }
    }};
}

#[cfg(unix)]
struct StdoutGuard {
    saved_fd: libc::c_int,
}

#[cfg(unix)]
impl Drop for StdoutGuard {
    fn drop(&mut self) {
        unsafe {
            libc::dup2(self.saved_fd, libc::STDOUT_FILENO);
            libc::close(self.saved_fd);
        }
    }
}

/// Temporarily redirects the process's real stdout file descriptor to an
/// in-memory pipe for the duration of `f`, restoring it afterward (spec §9
/// "Stdout capture via descriptor redirection"). If the process aborts
/// mid-capture, restoration never runs -- the spec calls that acceptable,
/// since there's no parent process state left to confuse.
#[cfg(unix)]
pub fn capture_stdout<F: FnOnce()>(f: F) -> String {
    use std::io::Read;
    use std::os::fd::FromRawFd;

    let mut fds = [0 as libc::c_int; 2];
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    assert_eq!(rc, 0, "failed to create a capture pipe");
    let (read_fd, write_fd) = (fds[0], fds[1]);

    unsafe { libc::fflush(std::ptr::null_mut()) };
    let saved_fd = unsafe { libc::dup(libc::STDOUT_FILENO) };
    unsafe {
        libc::dup2(write_fd, libc::STDOUT_FILENO);
        libc::close(write_fd);
    }
    let guard = StdoutGuard { saved_fd };

    f();

    unsafe { libc::fflush(std::ptr::null_mut()) };
    drop(guard);

    let mut captured = Vec::new();
    let mut reader = unsafe { std::fs::File::from_raw_fd(read_fd) };
    let _ = reader.read_to_end(&mut captured);
    String::from_utf8_lossy(&captured).into_owned()
}

/// No descriptor-redirection primitive on non-Unix targets; runs the body
/// and reports an empty capture rather than failing to compile.
#[cfg(not(unix))]
pub fn capture_stdout<F: FnOnce()>(f: F) -> String {
    f();
    String::new()
}
