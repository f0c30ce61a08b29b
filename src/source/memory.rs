//! In-memory byte source.

use super::{ByteSource, ReadAt};
use std::io::{self, Cursor, Read, Seek, SeekFrom};

/// A byte buffer exposed as a [`ByteSource`].
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    cursor: Cursor<Vec<u8>>,
}

impl MemorySource {
    /// Wrap `bytes`.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            cursor: Cursor::new(bytes.into()),
        }
    }

    /// The wrapped bytes.
    pub fn bytes(&self) -> &[u8] {
        self.cursor.get_ref()
    }
}

impl ByteSource for MemorySource {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<ReadAt> {
        let data = self.cursor.get_ref();
        let Ok(start) = usize::try_from(offset) else {
            return Ok(ReadAt::end());
        };
        if start >= data.len() {
            return Ok(ReadAt::end());
        }
        let len = buf.len().min(data.len() - start);
        buf[..len].copy_from_slice(&data[start..start + len]);
        Ok(ReadAt::filled(len))
    }

    fn size(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }
}

impl Read for MemorySource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for MemorySource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

/// A memory source whose reads fail once they would touch `bad_from` or beyond.
#[cfg(test)]
pub(crate) struct BadSectorSource {
    inner: MemorySource,
    bad_from: u64,
}

#[cfg(test)]
impl BadSectorSource {
    pub(crate) fn new(bytes: impl Into<Vec<u8>>, bad_from: u64) -> Self {
        Self {
            inner: MemorySource::new(bytes),
            bad_from,
        }
    }

    fn check(&self, offset: u64, len: usize) -> io::Result<()> {
        let end = offset.saturating_add(len as u64).min(self.inner.size());
        if end > self.bad_from {
            return Err(io::Error::other("bad sector"));
        }
        Ok(())
    }
}

#[cfg(test)]
impl ByteSource for BadSectorSource {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<ReadAt> {
        self.check(offset, buf.len())?;
        self.inner.read_at(buf, offset)
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }
}

#[cfg(test)]
impl Read for BadSectorSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check(self.inner.cursor.position(), buf.len())?;
        self.inner.read(buf)
    }
}

#[cfg(test)]
impl Seek for BadSectorSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
