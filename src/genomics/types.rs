use std::fmt;

use serde::{Deserialize, Serialize};

/// Zero-based genomic coordinate; written one-based in output.
pub type Position = u32;

/// Read-inclusion confidence tier. Tier 1 is the stricter one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Minimal-confidence (strict) inclusion thresholds.
    #[default]
    Tier1,
    /// Relaxed inclusion thresholds.
    Tier2,
}

impl Tier {
    /// 1-based tier number as written in INFO.
    pub fn number(self) -> u8 {
        match self {
            Tier::Tier1 => 1,
            Tier::Tier2 => 2,
        }
    }
}

/// A value computed once per evidence tier.
///
/// Formatting forwards the caller's format spec to both halves, so
/// `format!("{:.2}", pair)` renders `0.50,0.25`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TierPair<T> {
    /// Tier 1 value.
    pub tier1: T,
    /// Tier 2 value.
    pub tier2: T,
}

impl<T> TierPair<T> {
    /// Construct a pair from both tiers.
    pub fn new(tier1: T, tier2: T) -> Self {
        Self { tier1, tier2 }
    }

    /// Value for the given tier.
    pub fn get(&self, tier: Tier) -> &T {
        match tier {
            Tier::Tier1 => &self.tier1,
            Tier::Tier2 => &self.tier2,
        }
    }

    /// Apply `f` to each tier independently.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> TierPair<U> {
        TierPair {
            tier1: f(&self.tier1),
            tier2: f(&self.tier2),
        }
    }
}

impl<T: fmt::Display> fmt::Display for TierPair<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tier1.fmt(f)?;
        f.write_str(",")?;
        self.tier2.fmt(f)
    }
}

/// Read evidence for one sample at one tier, as reported by the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TieredSampleEvidence {
    /// Total depth at the locus.
    pub depth: u32,
    /// Qualifying reads supporting the reference allele.
    pub ref_reads: u32,
    /// Qualifying reads supporting some other alternate allele.
    pub alt_reads: u32,
    /// Qualifying reads supporting this indel.
    pub indel_reads: u32,
    /// Forward-strand share of `ref_reads`.
    pub ref_reads_fwd: u32,
    /// Reverse-strand share of `ref_reads`.
    pub ref_reads_rev: u32,
    /// Forward-strand share of `indel_reads`.
    pub indel_reads_fwd: u32,
    /// Reverse-strand share of `indel_reads`.
    pub indel_reads_rev: u32,
    /// Reads supporting neither allele.
    pub other_reads: u32,
    /// Mean mapping quality.
    pub mean_mapq: f64,
    /// Fraction of reads with mapping quality zero.
    pub mapq0_frac: f64,
    /// Read-position rank-sum statistic, reference vs. indel reads.
    pub read_pos_ranksum: f64,
}

/// Rolling basecall-noise averages around a locus for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowNoiseStats {
    /// Average count of basecalls used for calling.
    pub used: f64,
    /// Average count of basecalls filtered out.
    pub filtered: f64,
    /// Average count of reads below the mapping-quality threshold.
    pub submapped: f64,
}

impl WindowNoiseStats {
    /// Construct window averages.
    pub fn new(used: f64, filtered: f64, submapped: f64) -> Self {
        Self {
            used,
            filtered,
            submapped,
        }
    }
}

/// Inferred genotype of the normal sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalType {
    /// Homozygous reference.
    Ref,
    /// Heterozygous.
    Het,
    /// Homozygous alternate.
    Hom,
    /// No single genotype dominates.
    Conflict,
}

impl NormalType {
    /// Label written to the NT key.
    pub fn label(self) -> &'static str {
        match self {
            NormalType::Ref => "ref",
            NormalType::Het => "het",
            NormalType::Hom => "hom",
            NormalType::Conflict => "conflict",
        }
    }
}

/// Shape of the candidate allele.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndelType {
    /// Inserted sequence.
    #[default]
    Insert,
    /// Deleted sequence.
    Delete,
    /// Left side of a breakpoint.
    BpLeft,
    /// Right side of a breakpoint.
    BpRight,
    /// Simultaneous deletion and insertion.
    Swap,
}

impl IndelType {
    /// Breakpoint alleles are annotated `SVTYPE=BND`.
    pub fn is_breakpoint(self) -> bool {
        matches!(self, IndelType::BpLeft | IndelType::BpRight)
    }
}

/// Repeat context of a repeat-derived allele.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatAnnotation {
    /// Repeat unit sequence (RU).
    pub unit: String,
    /// Repeat unit count in the reference (RC).
    pub ref_count: u32,
    /// Repeat unit count in the indel allele (IC).
    pub indel_count: u32,
}

/// Scored somatic call together with the evidence it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    /// Phred-scaled somatic quality (QSI).
    pub qphred: u32,
    /// Tier that produced `qphred` (TQSI).
    pub tier: Tier,
    /// Inferred normal genotype (NT).
    pub ntype: NormalType,
    /// Somatic quality conditioned on `ntype` (QSI_NT).
    pub from_ntype_qphred: u32,
    /// Tier that produced `from_ntype_qphred` (TQSI_NT).
    pub from_ntype_tier: Tier,
    /// Most likely joint genotype index (SGT).
    pub genotype: u16,
    /// The indel footprint overlaps another call.
    #[serde(default)]
    pub is_overlap: bool,
    /// Normal sample evidence per tier.
    pub normal: TierPair<TieredSampleEvidence>,
    /// Tumor sample evidence per tier.
    pub tumor: TierPair<TieredSampleEvidence>,
}

/// A call awaiting window statistics, with the locus description it
/// will be written with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRecord {
    /// Scored call and its evidence.
    pub call: CallResult,
    /// REF column sequence.
    pub ref_seq: String,
    /// ALT column sequence.
    pub alt_seq: String,
    /// Homopolymer length around the indel (IHP).
    pub homopolymer_len: u32,
    /// Repeat annotation, present for repeat-derived alleles.
    #[serde(default)]
    pub repeat: Option<RepeatAnnotation>,
    /// Allele shape.
    #[serde(default)]
    pub indel_type: IndelType,
}
