//! Writer throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use somindel::genomics::{
    fisher_exact_two_sided, CallResult, NormalType, PendingRecord, SomaticIndelWriter, Tier,
    TierPair, TieredSampleEvidence, WindowNoiseStats, WindowNoiseTracker,
};
use somindel::WriterOptions;

fn record(pos: u32) -> PendingRecord {
    let evidence = TieredSampleEvidence {
        depth: 60,
        ref_reads: 40,
        alt_reads: 2,
        indel_reads: 18,
        ref_reads_fwd: 22,
        ref_reads_rev: 18,
        indel_reads_fwd: 10 + pos % 5,
        indel_reads_rev: 8,
        other_reads: 3,
        mean_mapq: 58.5,
        mapq0_frac: 0.02,
        read_pos_ranksum: 0.4,
    };
    PendingRecord {
        call: CallResult {
            qphred: 45,
            tier: Tier::Tier1,
            ntype: NormalType::Ref,
            from_ntype_qphred: 40,
            from_ntype_tier: Tier::Tier1,
            genotype: 9,
            is_overlap: false,
            normal: TierPair::new(TieredSampleEvidence::default(), TieredSampleEvidence::default()),
            tumor: TierPair::new(evidence.clone(), evidence),
        },
        ref_seq: "GT".to_string(),
        alt_seq: "G".to_string(),
        homopolymer_len: 3,
        repeat: None,
        indel_type: Default::default(),
    }
}

fn benchmark_flush_cycle(c: &mut Criterion) {
    let records: Vec<PendingRecord> = (0..1_000).map(record).collect();
    let window = WindowNoiseStats::new(40.0, 2.0, 0.5);

    c.bench_function("cache_and_flush_1000", |b| {
        b.iter(|| {
            let mut writer = SomaticIndelWriter::new(WriterOptions::new("chr1"), Vec::new());
            for (pos, record) in records.iter().enumerate() {
                let pos = pos as u32;
                writer.cache_indel(pos, record.clone());
                writer
                    .add_window_stats(pos, &window, &window)
                    .expect("call cached");
            }
            black_box(writer.finish().expect("nothing pending"));
        });
    });
}

fn benchmark_window_tracking(c: &mut Criterion) {
    c.bench_function("window_tracker_10000_positions", |b| {
        b.iter(|| {
            let mut tracker = WindowNoiseTracker::new(25);
            for pos in 0..10_000u32 {
                tracker.observe(pos, 40 + pos % 7, pos % 3, pos % 2);
            }
            black_box(tracker.stats())
        });
    });
}

fn benchmark_fisher(c: &mut Criterion) {
    c.bench_function("fisher_exact_deep_table", |b| {
        b.iter(|| fisher_exact_two_sided(black_box(480), black_box(20), black_box(450), black_box(60)));
    });
}

criterion_group!(
    benches,
    benchmark_flush_cycle,
    benchmark_window_tracking,
    benchmark_fisher
);
criterion_main!(benches);
