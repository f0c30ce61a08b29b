//! macOS disk queries via the `DKIOC*` ioctls.

use super::{unix, DeviceQueries};
use std::fs::File;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

const DKIOCGETBLOCKSIZE: libc::c_ulong = 0x4004_6418;
const DKIOCGETBLOCKCOUNT: libc::c_ulong = 0x4008_6419;

/// Device queries for the build target.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDevice;

fn block_size(file: &File) -> io::Result<u32> {
    let mut size: u32 = 0;
    // SAFETY: DKIOCGETBLOCKSIZE writes one u32 through the pointer.
    let rc = unsafe { libc::ioctl(file.as_raw_fd(), DKIOCGETBLOCKSIZE, &mut size as *mut u32) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(size)
}

impl DeviceQueries for NativeDevice {
    fn is_block_device(&self, path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|m| {
                let kind = m.file_type();
                kind.is_block_device() || kind.is_char_device()
            })
            .unwrap_or(false)
    }

    fn device_size(&self, file: &File) -> io::Result<u64> {
        let block = block_size(file)?;
        let mut count: u64 = 0;
        // SAFETY: DKIOCGETBLOCKCOUNT writes one u64 through the pointer.
        let rc = unsafe {
            libc::ioctl(file.as_raw_fd(), DKIOCGETBLOCKCOUNT, &mut count as *mut u64)
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(count * u64::from(block))
    }

    fn device_alignment(&self, file: &File) -> u64 {
        block_size(file).map(u64::from).unwrap_or(0)
    }

    fn next_hole(&self, file: &File, offset: u64) -> Option<u64> {
        unix::next_hole(file, offset)
    }

    fn next_data(&self, file: &File, offset: u64) -> Option<u64> {
        unix::next_data(file, offset)
    }
}
