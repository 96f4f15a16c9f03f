//! Decoder and link state benchmark suite.
//!
//! Measures decoding throughput for clean and noisy streams, and the cost of
//! feeding the shared state in small reads as a serial port delivers them.
//!
//! Run with: cargo bench --bench decode
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pointlink::link::{BufferLimits, DecodeMode, LinkState};
use pointlink::protocol::{Point, decode};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const RECORD_COUNTS: &[usize] = &[100, 10_000];
const READ_SIZES: &[usize] = &[16, 256, 4096];

// ============================================================================
// Inputs
// ============================================================================

fn clean_stream(records: usize) -> Vec<u8> {
    (0..records)
        .flat_map(|i| {
            let t = i as f64 * 0.2;
            format!("{t},{}\r\n", t.sin()).into_bytes()
        })
        .collect()
}

fn noisy_stream(records: usize) -> Vec<u8> {
    (0..records)
        .flat_map(|i| {
            let mut line = Vec::new();
            if i % 10 == 0 {
                line.extend_from_slice(b"\xa0\xa1garbage\r\n");
            }
            line.extend_from_slice(format!("{i},{}\r\n", i * 2).as_bytes());
            line
        })
        .collect()
}

// ============================================================================
// Benchmark: Decode
// ============================================================================

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for &count in RECORD_COUNTS {
        let clean = clean_stream(count);
        group.throughput(Throughput::Bytes(clean.len() as u64));
        group.bench_with_input(BenchmarkId::new("clean", count), &clean, |b, input| {
            b.iter(|| {
                let mut bag: Vec<Point> = Vec::with_capacity(count);
                decode(&mut bag, black_box(input));
                bag
            });
        });

        let noisy = noisy_stream(count);
        group.throughput(Throughput::Bytes(noisy.len() as u64));
        group.bench_with_input(BenchmarkId::new("noisy", count), &noisy, |b, input| {
            b.iter(|| {
                let mut bag: Vec<Point> = Vec::with_capacity(count);
                decode(&mut bag, black_box(input));
                bag
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Chunked Feed
// ============================================================================

fn bench_chunked_feed(c: &mut Criterion) {
    let stream = clean_stream(10_000);
    let mut group = c.benchmark_group("chunked_feed");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    for &size in READ_SIZES {
        for (name, mode) in [("on_read", DecodeMode::OnRead), ("on_poll", DecodeMode::OnPoll)] {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &size| {
                b.iter(|| {
                    let state = LinkState::new(mode, BufferLimits::default());
                    for chunk in stream.chunks(size) {
                        state.append_bytes(chunk);
                    }
                    state.poll()
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_chunked_feed);
criterion_main!(benches);
