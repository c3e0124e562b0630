//! Safe wrappers over the raw bridge.
//!
//! In-process callers get bounded slices and `Result` instead of raw
//! pointers and sentinels. Paths are `&CStr`: the bridge passes path
//! bytes to the OS uninterpreted, so no string conversion or path
//! manipulation belongs here.
//!
//! The decoding is the only thing this layer adds. In particular it
//! resolves the raw stat channels' ambiguity: [`size`] and
//! [`modified_millis`] report failure as `Err(errno)`, so a genuine
//! zero-byte file or zero-millisecond timestamp is an `Ok` value, not
//! a sentinel look-alike.

use core::ffi::CStr;

use log::debug;

use crate::error::last_os_error;
use crate::error::ErrorCode;
use crate::error::E_INVALID_ARGUMENT;
use crate::posix;
use crate::Fd;

pub fn open_read_only(path: &CStr) -> Result<Fd, ErrorCode> {
    let fd: Fd = to_result!(unsafe { posix::open_ro(path.as_ptr()) })?;
    debug!("open_read_only {path:?} -> fd {fd}");
    Ok(fd)
}

/// Opens for read/write, creating the file with mode 0644 if absent.
pub fn open_read_write(path: &CStr) -> Result<Fd, ErrorCode> {
    let fd: Fd = to_result!(unsafe { posix::open_rw(path.as_ptr()) })?;
    debug!("open_read_write {path:?} -> fd {fd}");
    Ok(fd)
}

/// Opens write-only in append mode, creating the file with mode 0644
/// if absent.
pub fn open_append(path: &CStr) -> Result<Fd, ErrorCode> {
    let fd: Fd = to_result!(unsafe { posix::open_append(path.as_ptr()) })?;
    debug!("open_append {path:?} -> fd {fd}");
    Ok(fd)
}

pub fn close(fd: Fd) -> Result<(), ErrorCode> {
    debug!("close fd {fd}");
    if unsafe { posix::close(fd) } == 0 {
        Ok(())
    } else {
        Err(last_os_error())
    }
}

/// Reads up to `buf.len()` bytes at absolute `offset`. Returns the
/// byte count actually read; 0 means end-of-file. The descriptor's
/// implicit position does not move.
pub fn read_at(fd: Fd, buf: &mut [u8], offset: u64) -> Result<usize, ErrorCode> {
    if offset > i64::MAX as u64 {
        return Err(E_INVALID_ARGUMENT);
    }
    to_result!(unsafe { posix::read(fd, buf.as_mut_ptr(), buf.len(), offset as i64) })
}

/// Writes `buf` at absolute `offset`, extending the file if needed.
/// May write fewer bytes than requested; the caller retries with the
/// remainder.
pub fn write_at(fd: Fd, buf: &[u8], offset: u64) -> Result<usize, ErrorCode> {
    if offset > i64::MAX as u64 {
        return Err(E_INVALID_ARGUMENT);
    }
    to_result!(unsafe { posix::write(fd, buf.as_ptr(), buf.len(), offset as i64) })
}

/// Writes `buf` at end-of-file through a descriptor from
/// [`open_append`]. Positioning is the OS's atomic append guarantee,
/// so concurrent appenders never interleave within a write.
pub fn append(fd: Fd, buf: &[u8]) -> Result<usize, ErrorCode> {
    to_result!(unsafe { posix::append(fd, buf.as_ptr(), buf.len()) })
}

/// Size of the file at `path` in bytes.
pub fn size(path: &CStr) -> Result<u64, ErrorCode> {
    to_result!(unsafe { posix::length(path.as_ptr()) })
}

/// Modification time of the file at `path`, milliseconds since the
/// epoch at the platform's stat granularity (whole seconds).
///
/// The raw channel cannot carry pre-epoch timestamps, so a file whose
/// mtime is negative surfaces as `Err` here as well.
pub fn modified_millis(path: &CStr) -> Result<i64, ErrorCode> {
    to_result!(unsafe { posix::last_modified(path.as_ptr()) })
}

/// Sets the modification time of `path`. The value is applied at the
/// platform's native granularity, so a follow-up [`modified_millis`]
/// reads back `millis` truncated to that resolution.
pub fn set_modified_millis(path: &CStr, millis: i64) -> Result<(), ErrorCode> {
    if unsafe { posix::set_last_modified(path.as_ptr(), millis) } {
        Ok(())
    } else {
        Err(last_os_error())
    }
}

pub fn is_terminal(fd: Fd) -> bool {
    posix::is_terminal(fd) == 1
}
