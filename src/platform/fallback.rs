//! Targets without device ioctls: regular files only, no hole detection.

use super::DeviceQueries;
use std::fs::File;
use std::io;
use std::path::Path;

/// Device queries for the build target.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDevice;

impl DeviceQueries for NativeDevice {
    fn is_block_device(&self, _path: &Path) -> bool {
        false
    }

    fn device_size(&self, _file: &File) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "device sizing is not supported on this platform",
        ))
    }

    fn device_alignment(&self, _file: &File) -> u64 {
        0
    }

    fn next_hole(&self, _file: &File, _offset: u64) -> Option<u64> {
        None
    }

    fn next_data(&self, _file: &File, _offset: u64) -> Option<u64> {
        None
    }
}
