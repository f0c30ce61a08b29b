//! FreeBSD disk queries via the `DIOCG*` ioctls.

use super::{unix, DeviceQueries};
use std::fs::File;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

const DIOCGSECTORSIZE: libc::c_ulong = 0x4004_6480;
const DIOCGMEDIASIZE: libc::c_ulong = 0x4008_6481;

/// Device queries for the build target.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDevice;

impl DeviceQueries for NativeDevice {
    // Disks are character devices on FreeBSD.
    fn is_block_device(&self, path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|m| {
                let kind = m.file_type();
                kind.is_block_device() || kind.is_char_device()
            })
            .unwrap_or(false)
    }

    fn device_size(&self, file: &File) -> io::Result<u64> {
        let mut size: libc::off_t = 0;
        // SAFETY: DIOCGMEDIASIZE writes one off_t through the pointer.
        let rc = unsafe {
            libc::ioctl(file.as_raw_fd(), DIOCGMEDIASIZE, &mut size as *mut libc::off_t)
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        u64::try_from(size).map_err(|_| io::Error::other("negative media size"))
    }

    fn device_alignment(&self, file: &File) -> u64 {
        let mut sector: libc::c_uint = 0;
        // SAFETY: DIOCGSECTORSIZE writes one u_int through the pointer.
        let rc = unsafe {
            libc::ioctl(file.as_raw_fd(), DIOCGSECTORSIZE, &mut sector as *mut libc::c_uint)
        };
        if rc < 0 {
            return 0;
        }
        u64::from(sector)
    }

    fn next_hole(&self, file: &File, offset: u64) -> Option<u64> {
        unix::next_hole(file, offset)
    }

    fn next_data(&self, file: &File, offset: u64) -> Option<u64> {
        unix::next_data(file, offset)
    }
}
