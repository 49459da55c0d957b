//! Benchmark for comment tag parsing and record extraction
//!
//! Target: a 10K-volume filer extracted well under one poll interval

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use filer_share_exporter::domain::ports::{
    RawVolumeEntry, RawVolumePage, VolumeEfficiencyAttributes, VolumeIdAttributes,
    VolumeSpaceAttributes,
};
use filer_share_exporter::{extract, parse_tag};

const COMMENT: &str = "share_id: 69fe1228-360c-4063-8f29-3a5bfb6d9772, share_name: c_blackbox_1553028005, project: d940aae3f8084f15a9b67de5b3b39720";

fn volume(i: usize) -> RawVolumeEntry {
    RawVolumeEntry {
        id: VolumeIdAttributes {
            name: format!("share_{:05}", i),
            owning_vserver_name: "ma_vs1".to_string(),
            owning_vserver_uuid: "4c1f6a3e-2b1d-11e9-8d5a-00a098d6a1f0".to_string(),
            comment: COMMENT.to_string(),
            volume_type: "rw".to_string(),
        },
        space: VolumeSpaceAttributes {
            size: 107374182400,
            size_total: "102005473280".to_string(),
            size_available: "91804925952".to_string(),
            size_used: "10200547328".to_string(),
            size_used_by_snapshots: "1048576".to_string(),
            size_available_for_snapshots: "5367660544".to_string(),
            snapshot_reserve_size: "5368709120".to_string(),
            percentage_size_used: "10".to_string(),
        },
        efficiency: (i % 2 == 0).then(|| VolumeEfficiencyAttributes {
            percentage_compression_space_saved: "12".to_string(),
            percentage_deduplication_space_saved: "3".to_string(),
            percentage_total_space_saved: "15".to_string(),
        }),
    }
}

fn bench_parse_tag(c: &mut Criterion) {
    let mut group = c.benchmark_group("comment_tag");
    group.throughput(Throughput::Elements(1));

    group.bench_function("parse_full_tag", |b| {
        b.iter(|| parse_tag(black_box(COMMENT)));
    });

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("volume_extract");
    group.throughput(Throughput::Elements(10_000));

    // 20 pages of 500, the default page size
    let pages: Vec<RawVolumePage> = (0..20)
        .map(|p| RawVolumePage::new((0..500).map(|i| volume(p * 500 + i)).collect()))
        .collect();

    group.bench_function("extract_10k_volumes", |b| {
        b.iter(|| extract(black_box(pages.clone())));
    });

    group.finish();
}

criterion_group!(benches, bench_parse_tag, bench_extract);
criterion_main!(benches);
