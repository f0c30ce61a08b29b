//! Per-OS device queries.
//!
//! Everything that needs an ioctl or an `lseek` whence the standard library does not
//! expose goes through [`DeviceQueries`]. [`NativeDevice`] picks the implementation for the
//! build target; targets without a dedicated module fall back to plain file metadata and
//! report no holes.

use std::fs::File;
use std::io;
use std::path::Path;

#[cfg(unix)]
mod unix;

#[cfg(any(target_os = "linux", target_os = "android"))]
mod linux;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use linux::NativeDevice;

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod macos;
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub use macos::NativeDevice;

#[cfg(target_os = "freebsd")]
mod freebsd;
#[cfg(target_os = "freebsd")]
pub use freebsd::NativeDevice;

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd"
)))]
mod fallback;
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd"
)))]
pub use fallback::NativeDevice;

/// Questions the pager asks about the file or device it views.
pub trait DeviceQueries {
    /// True if `path` names a raw disk rather than a regular file.
    fn is_block_device(&self, path: &Path) -> bool;

    /// Size in bytes of an opened device.
    ///
    /// # Errors
    ///
    /// Returns the ioctl failure; regular files should be sized from metadata instead.
    fn device_size(&self, file: &File) -> io::Result<u64>;

    /// Required read alignment in bytes, `0` when reads may start anywhere.
    fn device_alignment(&self, file: &File) -> u64;

    /// First hole at or after `offset`, `None` when holes are unsupported or none remain.
    fn next_hole(&self, file: &File, offset: u64) -> Option<u64>;

    /// First data byte at or after `offset`, `None` when no data follows.
    fn next_data(&self, file: &File, offset: u64) -> Option<u64>;
}

/// Positional read that does not move the file cursor.
///
/// Loops over short reads and stops at end of file, so the returned count is only
/// below `buf.len()` when the file ends first.
///
/// # Errors
///
/// Returns any I/O error other than `Interrupted`.
pub fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match read_once_at(file, &mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(unix)]
fn read_once_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::unix::fs::FileExt::read_at(file, buf, offset)
}

#[cfg(windows)]
fn read_once_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::windows::fs::FileExt::seek_read(file, buf, offset)
}
