//! `lseek(SEEK_HOLE / SEEK_DATA)` probes shared by the unix targets.

use std::fs::File;
use std::os::unix::io::AsRawFd;

fn seek_whence(file: &File, offset: u64, whence: libc::c_int) -> Option<u64> {
    let offset = libc::off_t::try_from(offset).ok()?;
    // SAFETY: the descriptor is owned by `file` and stays open for the call.
    let pos = unsafe { libc::lseek(file.as_raw_fd(), offset, whence) };
    u64::try_from(pos).ok()
}

pub(super) fn next_hole(file: &File, offset: u64) -> Option<u64> {
    seek_whence(file, offset, libc::SEEK_HOLE)
}

pub(super) fn next_data(file: &File, offset: u64) -> Option<u64> {
    seek_whence(file, offset, libc::SEEK_DATA)
}
