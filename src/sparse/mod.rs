//! Hole map for sparse files.
//!
//! Built once per session on a background thread by alternating `SEEK_HOLE` and
//! `SEEK_DATA` probes. Readers see nothing until the whole map is published, after which
//! it is immutable. Every query on an unpublished map answers "no hole here", so a slow
//! or unsupported filesystem only costs speed, never correctness.

use crate::model::ByteRange;
use crate::platform::{DeviceQueries, NativeDevice};
use std::fs::File;
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Source of hole/data boundaries.
pub trait HoleProbe {
    /// First hole at or after `offset`.
    fn next_hole(&mut self, offset: u64) -> Option<u64>;
    /// First data byte at or after `offset`.
    fn next_data(&mut self, offset: u64) -> Option<u64>;
}

/// [`HoleProbe`] over an open file using native device queries.
#[derive(Debug)]
pub struct FileHoleProbe<D = NativeDevice> {
    file: File,
    device: D,
}

impl<D: DeviceQueries> FileHoleProbe<D> {
    /// Probe `file` with `device`.
    pub fn new(file: File, device: D) -> Self {
        Self { file, device }
    }
}

impl<D: DeviceQueries> HoleProbe for FileHoleProbe<D> {
    fn next_hole(&mut self, offset: u64) -> Option<u64> {
        self.device.next_hole(&self.file, offset)
    }

    fn next_data(&mut self, offset: u64) -> Option<u64> {
        self.device.next_data(&self.file, offset)
    }
}

/// Walk `probe` from offset 0 and collect the holes of a `size`-byte file.
///
/// A hole that runs to the end of the file (no data after it) is recorded up to `size`.
pub fn scan_holes<P: HoleProbe + ?Sized>(probe: &mut P, size: u64) -> Vec<ByteRange> {
    let mut holes = Vec::new();
    let mut pos = 0;
    while pos < size {
        let Some(hole) = probe.next_hole(pos) else {
            break;
        };
        if hole >= size {
            break;
        }
        let data = probe.next_data(hole).unwrap_or(size).min(size);
        if data <= hole {
            break;
        }
        holes.push(ByteRange::new(hole, data));
        pos = data;
    }
    holes
}

/// Sorted, non-overlapping holes of the viewed file, published once.
#[derive(Debug, Default)]
pub struct SparseIndex {
    holes: OnceLock<Vec<ByteRange>>,
}

impl SparseIndex {
    /// An index with nothing published yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// An index published immediately with `holes`.
    pub fn from_holes(mut holes: Vec<ByteRange>) -> Self {
        holes.sort();
        let index = Self::new();
        let _ = index.holes.set(holes);
        index
    }

    /// True once the map has been published.
    pub fn is_ready(&self) -> bool {
        self.holes.get().is_some()
    }

    /// The published holes, if any.
    pub fn holes(&self) -> Option<&[ByteRange]> {
        self.holes.get().map(Vec::as_slice)
    }

    /// Scan with `probe` and publish. Later calls are ignored.
    pub fn build<P: HoleProbe + ?Sized>(&self, probe: &mut P, size: u64) {
        let holes = scan_holes(probe, size);
        let count = holes.len();
        if self.holes.set(holes).is_ok() {
            info!(holes = count, "Sparse index ready");
        }
    }

    /// Build the index on a background thread from `file`, usually a clone of the
    /// viewed source's descriptor.
    pub fn spawn_build(self: &Arc<Self>, file: File, size: u64) -> Option<JoinHandle<()>> {
        let index = Arc::clone(self);
        let spawned = std::thread::Builder::new()
            .name("sparse-index".into())
            .spawn(move || {
                debug!(size, "Building sparse index");
                index.build(&mut FileHoleProbe::new(file, NativeDevice), size);
            });
        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "Could not start sparse index thread");
                None
            }
        }
    }

    /// If `offset` lies inside a hole, the end of that hole.
    pub fn find_next_data(&self, offset: u64) -> Option<u64> {
        let holes = self.holes.get()?;
        let idx = holes.partition_point(|h| h.end <= offset);
        holes.get(idx).filter(|h| h.contains(offset)).map(|h| h.end)
    }

    /// If `offset` lies in `(start, end]` of a hole, the start of that hole.
    pub fn find_prev_data(&self, offset: u64) -> Option<u64> {
        let holes = self.holes.get()?;
        let idx = holes.partition_point(|h| h.end < offset);
        holes
            .get(idx)
            .filter(|h| h.start < offset && offset <= h.end)
            .map(|h| h.start)
    }
}
