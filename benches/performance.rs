use std::io::BufReader;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reada::{MemorySource, ReadAhead};
use reada_cli::rpm::{scan, synthetic_stream, PlainReader, ReadaReader, StdBufReader};

fn bench_header_scan(c: &mut Criterion) {
    let data = synthetic_stream(2000);
    let mut group = c.benchmark_group("header_scan");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function(BenchmarkId::new("read", data.len()), |b| {
        b.iter(|| {
            let mut r = PlainReader(MemorySource::new(data.clone()));
            scan(&mut r, |_| {}).unwrap()
        })
    });

    group.bench_function(BenchmarkId::new("reada", data.len()), |b| {
        b.iter(|| {
            let ra = ReadAhead::new(MemorySource::new(data.clone())).unwrap();
            scan(&mut ReadaReader::new(ra, false), |_| {}).unwrap()
        })
    });

    group.bench_function(BenchmarkId::new("reada_peek", data.len()), |b| {
        b.iter(|| {
            let ra = ReadAhead::new(MemorySource::new(data.clone())).unwrap();
            scan(&mut ReadaReader::new(ra, true), |_| {}).unwrap()
        })
    });

    group.bench_function(BenchmarkId::new("bufread", data.len()), |b| {
        b.iter(|| {
            let br = BufReader::with_capacity(8192, MemorySource::new(data.clone()));
            scan(&mut StdBufReader(br), |_| {}).unwrap()
        })
    });

    group.finish();
}

criterion_group!(readahead, bench_header_scan);
criterion_main!(readahead);
