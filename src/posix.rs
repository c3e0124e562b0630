//! The raw bridge surface: one `extern "C"` entry point per POSIX
//! primitive.
//!
//! Everything here is caller-trusted, which is what the `unsafe` on
//! each signature means: a `path` pointer must reference a
//! null-terminated byte string (raw bytes, the OS interprets them),
//! and a `buf` pointer must reference at least `len` bytes owned by
//! the caller for the duration of the call. The bridge never
//! allocates, frees, or bounds-checks through these pointers.
//!
//! Failure signaling is the OS's own: descriptor- and byte-count
//! channels go negative, with the detail left in errno for the caller
//! to consult out-of-band. Nothing is retried, logged, or translated
//! at this layer. The stat-backed channels ([`length`],
//! [`last_modified`]) return the raw stat result on failure, so a
//! caller must treat any non-positive value as an error there; the
//! safe layer in [`crate::fs`] disambiguates.

use libc::c_char;

use crate::Fd;
use crate::FD_STDOUT;

/// Mode bits applied verbatim to files this bridge creates.
const CREATE_MODE: libc::mode_t = 0o644;

/// Opens `path` for reading only. No creation. Returns a descriptor
/// (>= 0) or the OS's negative sentinel.
pub unsafe extern "C" fn open_ro(path: *const c_char) -> i64 {
    unsafe { libc::open(path, libc::O_RDONLY) as i64 }
}

/// Opens `path` for read/write, creating it with mode 0644 if absent.
pub unsafe extern "C" fn open_rw(path: *const c_char) -> i64 {
    unsafe { open_with_create(path, libc::O_RDWR) }
}

/// Opens `path` write-only in append mode, creating it with mode 0644
/// if absent. Writes through the returned descriptor land atomically
/// at end-of-file.
pub unsafe extern "C" fn open_append(path: *const c_char) -> i64 {
    unsafe { open_with_create(path, libc::O_WRONLY | libc::O_APPEND) }
}

/// Releases `fd`. 0 on success, negative on failure. The bridge keeps
/// no bookkeeping; reuse after close is the caller's bug.
pub unsafe extern "C" fn close(fd: Fd) -> i32 {
    unsafe { libc::close(fd) }
}

/// Positional read: up to `len` bytes from absolute `offset` into
/// `buf`, without moving the descriptor's implicit position. Returns
/// bytes read (0 at end-of-file) or the negative sentinel. Sequential
/// traversal is driven by the caller advancing `offset`.
pub unsafe extern "C" fn read(fd: Fd, buf: *mut u8, len: usize, offset: i64) -> i64 {
    unsafe { libc::pread(fd, buf.cast(), len, offset as libc::off_t) as i64 }
}

/// Positional write: `len` bytes from `buf` at absolute `offset`,
/// extending the file if needed, implicit position untouched. May
/// write short under OS pressure; the caller retries.
pub unsafe extern "C" fn write(fd: Fd, buf: *const u8, len: usize, offset: i64) -> i64 {
    unsafe { libc::pwrite(fd, buf.cast(), len, offset as libc::off_t) as i64 }
}

/// Sequential write at end-of-file. No offset argument: positioning
/// relies on `fd` having been opened via [`open_append`], where the OS
/// places each write at EOF atomically even across concurrent writers.
pub unsafe extern "C" fn append(fd: Fd, buf: *const u8, len: usize) -> i64 {
    unsafe { libc::write(fd, buf.cast(), len) as i64 }
}

/// Size of the file at `path` in bytes, or the raw negative stat
/// result if the stat fails.
pub unsafe extern "C" fn length(path: *const c_char) -> i64 {
    let mut st: libc::stat = unsafe { core::mem::zeroed() };
    let r = unsafe { libc::stat(path, &mut st) };
    if r == 0 {
        st.st_size as i64
    } else {
        r as i64
    }
}

/// Modification time of the file at `path`, milliseconds since the
/// epoch (native seconds * 1000). On failure the raw stat result comes
/// back NOT promoted to milliseconds, so a non-positive value is an
/// error signal, not a pre-epoch timestamp.
pub unsafe extern "C" fn last_modified(path: *const c_char) -> i64 {
    let mut st: libc::stat = unsafe { core::mem::zeroed() };
    let r = unsafe { libc::stat(path, &mut st) };
    if r == 0 {
        1000 * st.st_mtime as i64
    } else {
        r as i64
    }
}

/// Sets the modification time of `path` to `millis` since the epoch,
/// converted to the platform's native granularity. True iff the OS
/// call succeeds.
pub unsafe extern "C" fn set_last_modified(path: *const c_char, millis: i64) -> bool {
    unsafe { set_mtime_native(path, millis) }
}

/// The well-known standard-output descriptor. A fixed handle accessor,
/// not I/O.
pub extern "C" fn stdout_fd() -> Fd {
    FD_STDOUT
}

/// 1 if `fd` refers to a terminal, 0 otherwise.
pub extern "C" fn is_terminal(fd: Fd) -> i32 {
    unsafe { libc::isatty(fd) }
}

/// Open an existing file, or create it with [`CREATE_MODE`] applied
/// verbatim rather than masked by the process umask. The original
/// facade reset the process-wide umask before O_CREAT; that global
/// mutation is replaced here by creating with O_EXCL and fchmod-ing
/// the fresh descriptor. A lost create race (EEXIST) loops back to the
/// plain open, so a file someone else made is never re-moded.
unsafe fn open_with_create(path: *const c_char, flags: libc::c_int) -> i64 {
    loop {
        let fd = unsafe { libc::open(path, flags) };
        if fd >= 0 || unsafe { errno() } != libc::ENOENT {
            return fd as i64;
        }

        let fd = unsafe {
            libc::open(
                path,
                flags | libc::O_CREAT | libc::O_EXCL,
                CREATE_MODE as libc::c_uint,
            )
        };
        if fd >= 0 {
            // The kernel masked the O_CREAT mode with the umask;
            // fchmod puts the literal bits back.
            if unsafe { libc::fchmod(fd, CREATE_MODE) } < 0 {
                let saved = unsafe { errno() };
                unsafe { libc::close(fd) };
                unsafe { set_errno(saved) };
                return -1;
            }
            return fd as i64;
        }
        if unsafe { errno() } != libc::EEXIST {
            return fd as i64;
        }
        // Lost the create race; the file exists now.
    }
}

/// Set the modification time with platform-native resolution:
/// microseconds where the platform offers them, whole seconds (the
/// millisecond fraction truncated, not rounded) elsewhere. The
/// access time is set to the same instant; utime/utimes cannot leave
/// it alone.
#[cfg(target_vendor = "apple")]
unsafe fn set_mtime_native(path: *const c_char, millis: i64) -> bool {
    let t = libc::timeval {
        tv_sec: millis / 1000,
        tv_usec: ((millis % 1000) * 1000) as libc::suseconds_t,
    };
    let times = [t, t];
    unsafe { libc::utimes(path, times.as_ptr()) == 0 }
}

#[cfg(not(target_vendor = "apple"))]
unsafe fn set_mtime_native(path: *const c_char, millis: i64) -> bool {
    let secs = millis / 1000;
    let t = libc::utimbuf {
        actime: secs,
        modtime: secs,
    };
    unsafe { libc::utime(path, &t) == 0 }
}

#[cfg(target_vendor = "apple")]
unsafe fn errno_location() -> *mut libc::c_int {
    unsafe { libc::__error() }
}

#[cfg(not(target_vendor = "apple"))]
unsafe fn errno_location() -> *mut libc::c_int {
    unsafe { libc::__errno_location() }
}

unsafe fn errno() -> libc::c_int {
    unsafe { *errno_location() }
}

unsafe fn set_errno(val: libc::c_int) {
    unsafe { *errno_location() = val };
}

/// The bridge as a C-shaped table of function pointers, for embedders
/// that consume it as a handoff object rather than linked symbols.
#[repr(C)]
pub struct PosixFileVtable {
    pub open_ro: unsafe extern "C" fn(*const c_char) -> i64,
    pub open_rw: unsafe extern "C" fn(*const c_char) -> i64,
    pub open_append: unsafe extern "C" fn(*const c_char) -> i64,
    pub close: unsafe extern "C" fn(Fd) -> i32,
    pub read: unsafe extern "C" fn(Fd, *mut u8, usize, i64) -> i64,
    pub write: unsafe extern "C" fn(Fd, *const u8, usize, i64) -> i64,
    pub append: unsafe extern "C" fn(Fd, *const u8, usize) -> i64,
    pub length: unsafe extern "C" fn(*const c_char) -> i64,
    pub last_modified: unsafe extern "C" fn(*const c_char) -> i64,
    pub set_last_modified: unsafe extern "C" fn(*const c_char, i64) -> bool,
    pub stdout_fd: extern "C" fn() -> Fd,
    pub is_terminal: extern "C" fn(Fd) -> i32,
}

static VTABLE: PosixFileVtable = PosixFileVtable {
    open_ro,
    open_rw,
    open_append,
    close,
    read,
    write,
    append,
    length,
    last_modified,
    set_last_modified,
    stdout_fd,
    is_terminal,
};

impl PosixFileVtable {
    pub fn get() -> &'static Self {
        &VTABLE
    }
}
