//! Benchmarks for delivery path resolution
//!
//! Tests output anatomy data and destination rendering across override
//! hierarchies of increasing depth.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use shotforged::config::DeliveryConfig;
use shotforged::delivery::{
    plan_delivery, resolve_output_path, DeliveryRequest, DeliveryVersion, OverrideEntity,
    OverrideHierarchy,
};
use shotforged_common::EntityLevel;
use shotforged_template::AnatomyData;

const PATH_TEMPLATE: &str =
    "{package_name}/{output}/<{is_sequence}<{filename}/>>{filename}<.{frame:0>4}>.{ext}";

fn base() -> AnatomyData {
    AnatomyData::from_value(json!({
        "project": {"name": "Unicorn", "code": "uni"},
        "asset": "uni_pg_0455",
        "SEQ": "PG",
        "shotnum": "0455",
        "task": {"name": "comp", "short": "cmp"},
        "version": 3,
        "vendor": "ax",
        "frame": "1001",
        "package_name": "uni_20260305",
        "yyyy": "2026",
        "mm": "03",
        "dd": "05",
    }))
    .unwrap_or_default()
}

fn hierarchy(depth: usize) -> OverrideHierarchy {
    let levels = [
        EntityLevel::Shot,
        EntityLevel::Sequence,
        EntityLevel::Episode,
        EntityLevel::Project,
    ];
    let entities = levels
        .iter()
        .take(depth)
        .map(|level| {
            OverrideEntity::new(*level)
                .with_field("filename_override", format!("{{asset}}_{}", level.as_str()))
                .with_field("task[short]_override", "comp")
                .with_field("sg_review_output_type", json!(["mov_review"]))
                .with_field("sg_final_output_type", json!(["exr_final"]))
        })
        .collect();
    OverrideHierarchy::new(entities)
}

fn bench_resolve_output_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_output_path");
    let base = base();

    for depth in [0usize, 1, 4] {
        let overrides = hierarchy(depth);
        for (name, ext) in [("mov_review", "mov"), ("exr_final", "exr")] {
            group.bench_with_input(
                BenchmarkId::new(name, depth),
                &overrides,
                |b, overrides| {
                    b.iter(|| {
                        resolve_output_path(
                            black_box(&base),
                            overrides,
                            name,
                            ext,
                            black_box(PATH_TEMPLATE),
                        )
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_plan_delivery(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_delivery");
    let config = DeliveryConfig::default();
    let datetime = AnatomyData::new();

    for depth in [1usize, 4] {
        let request = DeliveryRequest {
            project_name: "Unicorn".to_string(),
            version: DeliveryVersion {
                code: "uni_pg_0455_comp_v003".to_string(),
                instance_id: Some("64f0c2".to_string()),
                frame_start: 1001,
                frame_end: 1100,
                source_path: "/proj/uni/publish/pg_0455/comp_v003.1001.exr".to_string(),
                ..Default::default()
            },
            anatomy: base(),
            overrides: hierarchy(depth),
            ..Default::default()
        };

        group.bench_with_input(BenchmarkId::new("depth", depth), &request, |b, request| {
            b.iter(|| plan_delivery(black_box(request), &config, &datetime));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve_output_path, bench_plan_delivery);
criterion_main!(benches);
