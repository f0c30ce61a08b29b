//! Sector-aligned reads for raw devices.
//!
//! Raw disks opened without the page cache reject reads whose offset or length is not a
//! multiple of the sector size. [`AlignedReader`] widens every request to the enclosing
//! aligned window, reads that into a scratch buffer, and copies the requested slice out.

use super::{resolve_seek, ByteSource, ReadAt};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

/// Wraps a source so every underlying read is aligned to `alignment` bytes.
#[derive(Debug)]
pub struct AlignedReader<S> {
    inner: S,
    alignment: u64,
    scratch: Vec<u8>,
    position: u64,
}

impl<S: ByteSource> AlignedReader<S> {
    /// Wrap `inner`. An alignment of `0` or `1` passes reads straight through.
    pub fn new(inner: S, alignment: u64) -> Self {
        Self {
            inner,
            alignment: alignment.max(1),
            scratch: Vec::new(),
            position: 0,
        }
    }

    /// The wrapped source.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn is_aligned(&self, offset: u64, len: usize) -> bool {
        offset % self.alignment == 0 && len as u64 % self.alignment == 0
    }
}

impl<S: ByteSource> ByteSource for AlignedReader<S> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<ReadAt> {
        let size = self.inner.size();
        if offset >= size {
            return Ok(ReadAt::end());
        }
        if self.alignment == 1 || self.is_aligned(offset, buf.len()) {
            return self.inner.read_at(buf, offset);
        }

        let skip = offset % self.alignment;
        let window_start = offset - skip;
        let wanted = skip + buf.len() as u64;
        let window_len = wanted.div_ceil(self.alignment) * self.alignment;
        // Devices are sized in whole sectors, so clipping to the end keeps alignment.
        let window_len = window_len.min(size - window_start);
        let window_len = usize::try_from(window_len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "read window too large"))?;

        if self.scratch.len() < window_len {
            self.scratch.resize(window_len, 0);
        }
        let got = self
            .inner
            .read_at(&mut self.scratch[..window_len], window_start)?
            .len;

        let skip = skip as usize;
        let delivered = got.saturating_sub(skip).min(buf.len());
        buf[..delivered].copy_from_slice(&self.scratch[skip..skip + delivered]);
        Ok(ReadAt::filled(delivered))
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn file(&self) -> Option<&File> {
        self.inner.file()
    }
}

impl<S: ByteSource> Read for AlignedReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let got = self.read_at(buf, self.position)?;
        self.position += got.len as u64;
        Ok(got.len)
    }
}

impl<S: ByteSource> Seek for AlignedReader<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.position = resolve_seek(pos, self.position, self.inner.size())?;
        Ok(self.position)
    }
}
