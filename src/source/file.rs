//! File-backed byte source.

use super::{ByteSource, ReadAt};
use crate::platform;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

/// A regular file or unaligned device read through positional I/O.
///
/// The sequential cursor is tracked here rather than in the descriptor, so positional
/// reads and `Read` calls never disturb each other.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    size: u64,
    position: u64,
}

impl FileSource {
    /// Wrap an opened file of known size.
    pub fn new(file: File, size: u64) -> Self {
        Self {
            file,
            size,
            position: 0,
        }
    }
}

impl ByteSource for FileSource {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<ReadAt> {
        if offset >= self.size {
            return Ok(ReadAt::end());
        }
        let want = buf.len().min(usize::try_from(self.size - offset).unwrap_or(usize::MAX));
        let len = platform::read_exact_at(&self.file, &mut buf[..want], offset)?;
        Ok(ReadAt::filled(len))
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn file(&self) -> Option<&File> {
        Some(&self.file)
    }
}

impl Read for FileSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let got = self.read_at(buf, self.position)?;
        self.position += got.len as u64;
        Ok(got.len)
    }
}

impl Seek for FileSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.position = super::resolve_seek(pos, self.position, self.size)?;
        Ok(self.position)
    }
}
