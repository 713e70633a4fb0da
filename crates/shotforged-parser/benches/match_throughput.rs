//! Benchmarks for shotforged-parser.
//!
//! Run with: cargo bench -p shotforged-parser

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shotforged_parser::{classify, collect_sequences, FilenameMatcher};

const SAMPLES: &[&str] = &[
    "/proj/uni/io/From_axv/uni_pg_0455_plt_01_roto_output-01_v001.%04d.exr",
    "/proj/uni/io/From_axv/abc_sq01_0010_plate_comp_v002.mov",
    "/proj/uni/io/From_axv/matchmove/uni_pg_0455_v002.abc",
    "/proj/uni/io/From_axv/MP01_V0001_CC.%04d.exr",
];

fn entity_codes(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("uni_pg_{:04}", i * 5))
        .chain(std::iter::once("uni_pg_0455".to_string()))
        .collect()
}

fn bench_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_filename");

    for count in [10usize, 100, 1000] {
        let matcher = FilenameMatcher::builder()
            .entity_codes(entity_codes(count))
            .project_code("uni")
            .build();

        group.throughput(Throughput::Elements(SAMPLES.len() as u64));
        group.bench_with_input(BenchmarkId::new("codes", count), &matcher, |b, matcher| {
            b.iter(|| {
                for sample in SAMPLES {
                    let result = matcher.match_filename(black_box(sample));
                    black_box(classify(&result, matcher.tasks()));
                }
            })
        });
    }

    group.finish();
}

fn bench_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect_sequences");

    for frames in [100i64, 1000] {
        let files: Vec<String> = (1001..1001 + frames)
            .flat_map(|f| {
                [
                    format!("/pkg/sh010_plate.{f}.exr"),
                    format!("/pkg/sh010_matte.{f}.exr"),
                ]
            })
            .collect();

        group.throughput(Throughput::Elements(files.len() as u64));
        group.bench_with_input(BenchmarkId::new("files", files.len()), &files, |b, files| {
            b.iter(|| collect_sequences(black_box(files)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_match, bench_collect);
criterion_main!(benches);
