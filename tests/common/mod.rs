#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use somindel::genomics::{
    CallResult, IndelType, NormalType, PendingRecord, RepeatAnnotation, Tier, TierPair,
    TieredSampleEvidence,
};

fn snapshot_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
}

pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_root().join(name);
    if std::env::var("SOMINDEL_UPDATE_SNAPSHOTS").is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {:?} not found", path));
    if normalize(&expected) != normalize(actual) {
        panic!(
            "Snapshot mismatch for {:?}. Set SOMINDEL_UPDATE_SNAPSHOTS=1 to regenerate.\nExpected:\n{}\nActual:\n{}",
            path,
            expected,
            actual
        );
    }
}

fn normalize(input: &str) -> String {
    input.replace("\r\n", "\n")
}

/// Evidence with strand-split counts; `ref_reads`/`indel_reads` are the
/// strand sums.
pub fn evidence(
    depth: u32,
    (ref_fwd, ref_rev): (u32, u32),
    alt_reads: u32,
    (indel_fwd, indel_rev): (u32, u32),
    other_reads: u32,
    (mean_mapq, mapq0_frac, read_pos_ranksum): (f64, f64, f64),
) -> TieredSampleEvidence {
    TieredSampleEvidence {
        depth,
        ref_reads: ref_fwd + ref_rev,
        alt_reads,
        indel_reads: indel_fwd + indel_rev,
        ref_reads_fwd: ref_fwd,
        ref_reads_rev: ref_rev,
        indel_reads_fwd: indel_fwd,
        indel_reads_rev: indel_rev,
        other_reads,
        mean_mapq,
        mapq0_frac,
        read_pos_ranksum,
    }
}

/// Tier-1 call with the given evidence.
pub fn call(
    qphred: u32,
    ntype: NormalType,
    from_ntype_qphred: u32,
    normal: TierPair<TieredSampleEvidence>,
    tumor: TierPair<TieredSampleEvidence>,
) -> CallResult {
    CallResult {
        qphred,
        tier: Tier::Tier1,
        ntype,
        from_ntype_qphred,
        from_ntype_tier: Tier::Tier1,
        genotype: 0,
        is_overlap: false,
        normal,
        tumor,
    }
}

pub fn pending(call: CallResult, ref_seq: &str, alt_seq: &str) -> PendingRecord {
    PendingRecord {
        call,
        ref_seq: ref_seq.to_string(),
        alt_seq: alt_seq.to_string(),
        homopolymer_len: 1,
        repeat: None,
        indel_type: IndelType::Insert,
    }
}

/// Deletion of two T's from a T-repeat, with a clean normal and supported tumor.
pub fn repeat_deletion() -> PendingRecord {
    let normal = TierPair::new(
        evidence(35, (17, 16), 0, (0, 0), 2, (59.1, 0.0, 0.0)),
        evidence(37, (17, 17), 1, (0, 0), 2, (58.7, 0.03, 0.0)),
    );
    let tumor = TierPair::new(
        evidence(41, (13, 12), 0, (7, 5), 4, (60.0, 0.0, 0.9)),
        evidence(44, (13, 13), 1, (7, 6), 4, (59.8, 0.02, 1.1)),
    );
    let mut call = call(52, NormalType::Ref, 52, normal, tumor);
    call.genotype = 9;
    PendingRecord {
        repeat: Some(RepeatAnnotation {
            unit: "T".to_string(),
            ref_count: 4,
            indel_count: 2,
        }),
        homopolymer_len: 4,
        indel_type: IndelType::Delete,
        ..pending(call, "CTT", "C")
    }
}

/// Overlapping insertion at the same locus with a heterozygous normal.
pub fn overlapping_insertion() -> PendingRecord {
    let normal = TierPair::new(
        evidence(35, (10, 9), 0, (5, 6), 2, (59.1, 0.0, -0.4)),
        evidence(37, (10, 10), 1, (6, 6), 2, (58.7, 0.03, -0.3)),
    );
    let tumor = TierPair::new(
        evidence(41, (3, 1), 0, (1, 3), 4, (60.0, 0.0, 0.2)),
        evidence(44, (3, 2), 1, (2, 3), 4, (59.8, 0.02, 0.2)),
    );
    let mut call = call(18, NormalType::Het, 3, normal, tumor);
    call.tier = Tier::Tier2;
    call.from_ntype_tier = Tier::Tier2;
    call.genotype = 4;
    call.is_overlap = true;
    pending(call, "C", "CA")
}

/// Breakpoint allele in a deep, noisy normal.
pub fn noisy_breakpoint() -> PendingRecord {
    let normal = TierPair::new(
        evidence(150, (70, 0), 0, (0, 0), 10, (41.25, 0.2, 0.0)),
        evidence(160, (72, 1), 3, (0, 0), 12, (40.5, 0.21, 0.0)),
    );
    let tumor = TierPair::new(
        evidence(90, (20, 18), 0, (30, 0), 6, (38.0, 0.1, 2.7)),
        evidence(95, (21, 19), 2, (31, 1), 6, (37.5, 0.12, 2.6)),
    );
    let mut call = call(31, NormalType::Ref, 12, normal, tumor);
    call.genotype = 7;
    PendingRecord {
        indel_type: IndelType::BpLeft,
        homopolymer_len: 2,
        ..pending(call, "A", "AGGTTCA")
    }
}
