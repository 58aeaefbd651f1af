//! Benchmarks for the per-request hot paths: Range header resolution and
//! content sniffing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rh_media::sniff::{sniff, SNIFF_LEN};
use rh_server::routes::streaming_helpers::resolve_range;

const TOTAL: u64 = 4 * 1024 * 1024 * 1024;

fn bench_resolve_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_range");

    let cases = [
        ("none", None),
        ("closed", Some("bytes=1048576-2097151")),
        ("open", Some("bytes=1048576-")),
        ("suffix", Some("bytes=-65536")),
        ("multi", Some("bytes=0-99,200-299,400-499")),
        ("unsatisfiable", Some("bytes=9999999999999-")),
        ("malformed", Some("items=0-10")),
    ];

    for (name, header) in cases {
        group.bench_function(name, |b| {
            b.iter(|| resolve_range(black_box(header), black_box(TOTAL)));
        });
    }

    group.finish();
}

fn bench_sniff(c: &mut Criterion) {
    let mut group = c.benchmark_group("sniff");

    let mut mp4 = vec![0, 0, 0, 24];
    mp4.extend_from_slice(b"ftypisommp41");
    mp4.resize(SNIFF_LEN, 0x11);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0];
    jpeg.resize(SNIFF_LEN, 0x22);

    let text = b"just some plain text that is not any known container ".repeat(10);
    let binary: Vec<u8> = (0..SNIFF_LEN).map(|i| (i % 7) as u8).collect();

    for (name, prefix) in [
        ("mp4", mp4.as_slice()),
        ("jpeg", jpeg.as_slice()),
        ("text", &text[..SNIFF_LEN.min(text.len())]),
        ("binary", binary.as_slice()),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| sniff(black_box(prefix)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve_range, bench_sniff);
criterion_main!(benches);
