//! Linux block device queries.

use super::{unix, DeviceQueries};
use std::fs::File;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// `_IOR(0x12, 114, size_t)`
const BLKGETSIZE64: libc::c_ulong = 0x8008_1272;
/// `_IO(0x12, 104)`
const BLKSSZGET: libc::c_ulong = 0x1268;

/// Device queries for the build target.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDevice;

impl DeviceQueries for NativeDevice {
    fn is_block_device(&self, path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|m| m.file_type().is_block_device())
            .unwrap_or(false)
    }

    fn device_size(&self, file: &File) -> io::Result<u64> {
        let mut size: u64 = 0;
        // SAFETY: BLKGETSIZE64 writes one u64 through the pointer.
        let rc = unsafe { libc::ioctl(file.as_raw_fd(), BLKGETSIZE64 as _, &mut size as *mut u64) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(size)
    }

    fn device_alignment(&self, file: &File) -> u64 {
        let mut sector: libc::c_int = 0;
        // SAFETY: BLKSSZGET writes one int through the pointer.
        let rc = unsafe {
            libc::ioctl(file.as_raw_fd(), BLKSSZGET as _, &mut sector as *mut libc::c_int)
        };
        if rc < 0 {
            return 0;
        }
        u64::try_from(sector).unwrap_or(0)
    }

    fn next_hole(&self, file: &File, offset: u64) -> Option<u64> {
        unix::next_hole(file, offset)
    }

    fn next_data(&self, file: &File, offset: u64) -> Option<u64> {
        unix::next_data(file, offset)
    }
}
