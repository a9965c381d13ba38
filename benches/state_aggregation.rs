//! Benchmarks for state aggregation and snapshot reads
//!
//! - Delta application and publication by the single writer
//! - Snapshot cost for readers
//! - End-to-end pipeline throughput on a mixed stream
//!
//! Run: `cargo bench --features benchmark --bench state_aggregation`

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use scorepad::test_utils::{clock_payload, sample_stream};
use scorepad::{Diagnostics, MessageParser, Pipeline, StateWriter};
use std::hint::black_box;
use std::sync::Arc;

fn bench_apply(c: &mut Criterion) {
    let delta = MessageParser::new().parse_payload(&clock_payload(9, 59, Some(2)));
    let mut writer = StateWriter::new();
    let _handle = writer.handle();

    c.bench_function("apply_clock_delta", |b| {
        b.iter(|| black_box(writer.apply(black_box(&delta))))
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let mut writer = StateWriter::new();
    let handle = writer.handle();
    writer.apply(&MessageParser::new().parse_payload(&clock_payload(9, 59, Some(2))));

    c.bench_function("snapshot_read", |b| b.iter(|| black_box(handle.snapshot())));
}

fn bench_pipeline(c: &mut Criterion) {
    let stream = sample_stream(200);

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("process_4k_chunks", |b| {
        b.iter(|| {
            let mut writer = StateWriter::new();
            let mut pipeline = Pipeline::new(Arc::new(Diagnostics::new()));
            for chunk in stream.chunks(4096) {
                black_box(pipeline.process_chunk(chunk, &mut writer));
            }
            writer.sequence()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_apply, bench_snapshot, bench_pipeline);
criterion_main!(benches);
