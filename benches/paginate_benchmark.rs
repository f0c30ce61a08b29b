//! Pagination and search throughput.
//!
//! Run with: cargo bench

#![allow(missing_docs)] // criterion macros generate undocumented items

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hexpager::model::{DisplayMode, Pattern};
use hexpager::monitor::Unmonitored;
use hexpager::page::{paginate, PageLayout, PageRequest, SkipMap};
use hexpager::search::search_forward;
use hexpager::source::MemorySource;
use hexpager::sparse::SparseIndex;

const SOURCE_SIZE: usize = 64 * 1024 * 1024;

/// Mostly zeros with a short distinct row every megabyte, like a freshly formatted disk.
fn disk_image() -> Vec<u8> {
    let mut bytes = vec![0u8; SOURCE_SIZE];
    for (i, chunk) in bytes.chunks_mut(1024 * 1024).enumerate() {
        chunk[..8].copy_from_slice(&(i as u64).to_le_bytes());
    }
    bytes
}

fn layout(mode: DisplayMode, dedup: bool) -> PageLayout {
    PageLayout {
        columns: 16,
        mode,
        dedup,
        max_text_width: 120,
    }
}

fn bench_paginate(c: &mut Criterion) {
    let mut source = MemorySource::new(disk_image());
    let random: Vec<u8> = (0..SOURCE_SIZE / 16).map(|i| (i * 31 % 255) as u8).collect();
    let mut dense = MemorySource::new(random);

    c.bench_function("paginate_dense_page", |b| {
        b.iter(|| {
            let mut skips = SkipMap::new();
            let request = PageRequest::new(black_box(0x1000), 50, layout(DisplayMode::Dump, true));
            paginate(&mut dense, &request, &mut skips, &mut Unmonitored)
        })
    });

    c.bench_function("paginate_collapsed_runs", |b| {
        b.iter(|| {
            let mut skips = SkipMap::new();
            let request = PageRequest::new(black_box(0), 50, layout(DisplayMode::Dump, true));
            paginate(&mut source, &request, &mut skips, &mut Unmonitored)
        })
    });

    c.bench_function("paginate_text_page", |b| {
        b.iter(|| {
            let mut skips = SkipMap::new();
            let request = PageRequest::new(black_box(0), 50, layout(DisplayMode::Text, false));
            paginate(&mut dense, &request, &mut skips, &mut Unmonitored)
        })
    });
}

fn bench_search(c: &mut Criterion) {
    let mut bytes = disk_image();
    let end = bytes.len() - 4;
    bytes[end..].copy_from_slice(b"TAIL");
    let mut source = MemorySource::new(bytes);
    let sparse = SparseIndex::from_holes(Vec::new());
    let pattern = Pattern::new(b"TAIL".to_vec()).expect("non-empty pattern");

    c.bench_function("search_forward_64mib", |b| {
        b.iter(|| {
            search_forward(&mut source, &sparse, &pattern, black_box(0), &mut Unmonitored)
                .expect("in-memory search")
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_paginate, bench_search
}
criterion_main!(benches);
