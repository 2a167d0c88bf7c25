use anyhow::{anyhow, Result};
use std::fmt;
use std::io::{self, Write};

use crate::genomics::{
    FilterSet, IndelFilter, PendingRecord, Position, SampleStatistics, TierPair,
    TieredSampleEvidence, WindowNoiseStats,
};
use crate::WriterOptions;

/// FORMAT column shared by every record.
pub const FORMAT_KEYS: &str = "DP:DP2:TAR:TIR:TOR:DP50:FDP50:SUBDP50:AF:SOR:FS:RR:MQ:MQ0";

/// Column header line, without the trailing newline.
pub const COLUMN_HEADER: &str =
    "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNORMAL\tTUMOR";

const INFO_HEADER: &[&str] = &[
    r#"##INFO=<ID=SOMATIC,Number=0,Type=Flag,Description="Somatic mutation">"#,
    r#"##INFO=<ID=QSI,Number=1,Type=Integer,Description="Phred quality that the indel is present at different frequencies in tumor and normal">"#,
    r#"##INFO=<ID=TQSI,Number=1,Type=Integer,Description="Evidence tier used to compute QSI">"#,
    r#"##INFO=<ID=NT,Number=1,Type=String,Description="Inferred normal genotype, one of ref, het, hom, conflict">"#,
    r#"##INFO=<ID=QSI_NT,Number=1,Type=Integer,Description="Phred quality of a somatic indel jointly with NT">"#,
    r#"##INFO=<ID=TQSI_NT,Number=1,Type=Integer,Description="Evidence tier used to compute QSI_NT">"#,
    r#"##INFO=<ID=SGT,Number=1,Type=Integer,Description="Index of the most likely joint genotype">"#,
    r#"##INFO=<ID=RU,Number=1,Type=String,Description="Repeat unit of the inserted or deleted sequence">"#,
    r#"##INFO=<ID=RC,Number=1,Type=Integer,Description="Repeat unit count in the reference allele">"#,
    r#"##INFO=<ID=IC,Number=1,Type=Integer,Description="Repeat unit count in the indel allele">"#,
    r#"##INFO=<ID=IHP,Number=1,Type=Integer,Description="Longest reference homopolymer intersecting the indel">"#,
    r#"##INFO=<ID=SVTYPE,Number=1,Type=String,Description="Structural variant type">"#,
    r#"##INFO=<ID=OVERLAP,Number=0,Type=Flag,Description="Indel footprint overlaps another call">"#,
];

const FORMAT_HEADER: &[&str] = &[
    r#"##FORMAT=<ID=DP,Number=1,Type=Integer,Description="Tier 1 read depth">"#,
    r#"##FORMAT=<ID=DP2,Number=1,Type=Integer,Description="Tier 2 read depth">"#,
    r#"##FORMAT=<ID=TAR,Number=2,Type=Integer,Description="Reads supporting reference or another allele, tiers 1,2">"#,
    r#"##FORMAT=<ID=TIR,Number=2,Type=Integer,Description="Reads supporting the indel, tiers 1,2">"#,
    r#"##FORMAT=<ID=TOR,Number=2,Type=Integer,Description="Reads supporting neither allele, tiers 1,2">"#,
    r#"##FORMAT=<ID=DP50,Number=1,Type=Float,Description="Window average of used plus filtered basecalls">"#,
    r#"##FORMAT=<ID=FDP50,Number=1,Type=Float,Description="Window average of filtered basecalls">"#,
    r#"##FORMAT=<ID=SUBDP50,Number=1,Type=Float,Description="Window average of reads below the mapping quality threshold">"#,
    r#"##FORMAT=<ID=AF,Number=2,Type=Float,Description="Indel allele fraction, tiers 1,2">"#,
    r#"##FORMAT=<ID=SOR,Number=2,Type=Float,Description="Log10 strand odds ratio, tiers 1,2">"#,
    r#"##FORMAT=<ID=FS,Number=2,Type=Float,Description="Phred-scaled Fisher strand bias, tiers 1,2">"#,
    r#"##FORMAT=<ID=RR,Number=2,Type=Float,Description="Read position rank-sum statistic, tiers 1,2">"#,
    r#"##FORMAT=<ID=MQ,Number=2,Type=Float,Description="Mean mapping quality, tiers 1,2">"#,
    r#"##FORMAT=<ID=MQ0,Number=2,Type=Float,Description="Fraction of mapping quality zero reads, tiers 1,2">"#,
];

/// Write the meta-information and column header lines for a run.
pub fn write_header<W: Write>(writer: &mut W, options: &WriterOptions) -> io::Result<()> {
    writeln!(writer, "##fileformat=VCFv4.1")?;
    writeln!(writer, "##source={}", options.source)?;
    writeln!(writer, "##contig=<ID={}>", options.chrom)?;
    for line in INFO_HEADER.iter().chain(FORMAT_HEADER) {
        writeln!(writer, "{}", line)?;
    }
    for filter in IndelFilter::ALL {
        writeln!(
            writer,
            "##FILTER=<ID={},Description=\"{}\">",
            filter,
            filter_description(filter, options)
        )?;
    }
    writeln!(writer, "{}", COLUMN_HEADER)
}

fn filter_description(filter: IndelFilter, options: &WriterOptions) -> String {
    match filter {
        IndelFilter::HighDepth => match options.max_depth {
            Some(max_depth) => format!("Normal tier 1 depth greater than {}", max_depth),
            None => "Normal tier 1 depth greater than the configured maximum".to_string(),
        },
        IndelFilter::IndelBCNoise => format!(
            "Fraction of filtered basecalls in the surrounding window is at least {}",
            options.max_window_filtered_frac
        ),
        IndelFilter::QsiRef => format!(
            "Normal is not homozygous reference or QSI_NT < {}",
            options.qsi_nt_lower_bound
        ),
    }
}

/// Render the header into a string.
pub fn render_header(options: &WriterOptions) -> Result<String> {
    let mut buffer = Vec::new();
    write_header(&mut buffer, options)?;
    String::from_utf8(buffer).map_err(|_| anyhow!("rendered header is not valid UTF-8"))
}

/// One sample's evidence, window context and derived statistics.
#[derive(Debug, Clone, Copy)]
pub struct SampleBlock<'a> {
    /// Evidence for both tiers.
    pub evidence: &'a TierPair<TieredSampleEvidence>,
    /// Window noise averages.
    pub window: &'a WindowNoiseStats,
    /// Statistics derived from `evidence`.
    pub stats: SampleStatistics,
}

impl<'a> SampleBlock<'a> {
    /// Derive statistics for one sample.
    pub fn new(
        evidence: &'a TierPair<TieredSampleEvidence>,
        window: &'a WindowNoiseStats,
    ) -> Self {
        Self {
            evidence,
            window,
            stats: SampleStatistics::compute(evidence),
        }
    }
}

impl fmt::Display for SampleBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let evidence = self.evidence;
        let ref_alt = evidence.map(|e| u64::from(e.ref_reads) + u64::from(e.alt_reads));
        let indel = evidence.map(|e| e.indel_reads);
        let other = evidence.map(|e| e.other_reads);
        write!(
            f,
            "{}:{}:{}:{}:{}",
            evidence.tier1.depth, evidence.tier2.depth, ref_alt, indel, other
        )?;

        let window = self.window;
        let stats = &self.stats;
        write!(
            f,
            ":{:.2}:{:.2}:{:.2}:{:.2}:{:.2}:{:.2}:{:.2}:{:.2}:{:.2}",
            window.used + window.filtered,
            window.filtered,
            window.submapped,
            stats.allele_fraction,
            stats.strand_odds_ratio,
            stats.strand_bias,
            stats.read_pos_ranksum,
            evidence.map(|e| e.mean_mapq),
            evidence.map(|e| e.mapq0_frac),
        )
    }
}

/// A cached call with everything needed to write it.
#[derive(Debug, Clone)]
pub struct ResolvedRecord<'a> {
    /// Chromosome name.
    pub chrom: &'a str,
    /// Zero-based position.
    pub pos: Position,
    /// Call and locus description.
    pub record: &'a PendingRecord,
    /// Active filters.
    pub filters: FilterSet,
    /// Normal sample block.
    pub normal: SampleBlock<'a>,
    /// Tumor sample block.
    pub tumor: SampleBlock<'a>,
}

impl<'a> ResolvedRecord<'a> {
    /// Pair a cached call with its filters and both samples' window context.
    pub fn new(
        chrom: &'a str,
        pos: Position,
        record: &'a PendingRecord,
        filters: FilterSet,
        normal_window: &'a WindowNoiseStats,
        tumor_window: &'a WindowNoiseStats,
    ) -> Self {
        Self {
            chrom,
            pos,
            record,
            filters,
            normal: SampleBlock::new(&record.call.normal, normal_window),
            tumor: SampleBlock::new(&record.call.tumor, tumor_window),
        }
    }

    fn write_info(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record;
        let call = &record.call;
        write!(
            f,
            "SOMATIC;QSI={};TQSI={};NT={};QSI_NT={};TQSI_NT={};SGT={}",
            call.qphred,
            call.tier.number(),
            call.ntype.label(),
            call.from_ntype_qphred,
            call.from_ntype_tier.number(),
            call.genotype
        )?;
        if let Some(repeat) = &record.repeat {
            write!(
                f,
                ";RU={};RC={};IC={}",
                repeat.unit, repeat.ref_count, repeat.indel_count
            )?;
        }
        write!(f, ";IHP={}", record.homopolymer_len)?;
        if record.indel_type.is_breakpoint() {
            f.write_str(";SVTYPE=BND")?;
        }
        if call.is_overlap {
            f.write_str(";OVERLAP")?;
        }
        Ok(())
    }
}

impl fmt::Display for ResolvedRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t.\t{}\t{}\t.\t{}\t",
            self.chrom,
            self.pos + 1,
            self.record.ref_seq,
            self.record.alt_seq,
            self.filters
        )?;
        self.write_info(f)?;
        write!(f, "\t{}\t{}\t{}", FORMAT_KEYS, self.normal, self.tumor)
    }
}

/// Write one record as a newline-terminated line.
pub fn write_record<W: Write>(writer: &mut W, record: &ResolvedRecord<'_>) -> io::Result<()> {
    writeln!(writer, "{}", record)
}
