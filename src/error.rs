//! Error codes for the bridge's safe boundary.
//!
//! The raw [`crate::posix`] surface reports failure the way the OS
//! does: a negative return with the detail left in errno. This module
//! is where that sentinel gets decoded for safe callers. The error
//! domain is errno itself rather than a private numbering, so codes
//! can be compared against `libc` constants directly; the `E_*`
//! aliases below cover the cases this crate and its tests name.

pub type ErrorCode = i32;

pub const E_OK: ErrorCode = 0;
pub const E_NOT_FOUND: ErrorCode = libc::ENOENT;
pub const E_NOT_ALLOWED: ErrorCode = libc::EACCES;
pub const E_BAD_HANDLE: ErrorCode = libc::EBADF;
pub const E_INVALID_ARGUMENT: ErrorCode = libc::EINVAL;

/// The calling thread's errno.
///
/// Only meaningful immediately after a failed bridge call; the OS
/// updates it behind every syscall.
pub fn last_os_error() -> ErrorCode {
    // io::Error::last_os_error() is always the Os variant, so the raw
    // code is always present; EIO is an unreachable fallback.
    std::io::Error::last_os_error()
        .raw_os_error()
        .unwrap_or(libc::EIO)
}

/// Decode a negative-sentinel raw return into a `Result`, consulting
/// errno on failure. Must be invoked before anything else can clobber
/// errno.
#[macro_export]
macro_rules! to_result {
    ($arg:expr) => {{
        let res = $arg;
        if res < 0 {
            Err($crate::error::last_os_error())
        } else {
            Ok(unsafe { res.try_into().unwrap_unchecked() })
        }
    }};
}
