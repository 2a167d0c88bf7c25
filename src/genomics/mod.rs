//! Somatic indel call synchronization and output.
//!
//! Calls are cached per position until the window noise statistics for that
//! position arrive; each flush runs the site filters, derives per-tier
//! statistics and writes one record per cached allele.

mod cache;
pub mod features;
mod filters;
mod statistics;
mod types;
pub mod vcf;
mod window;
mod writer;

pub use cache::PendingCallCache;
pub use features::{FeatureParseError, IndelFeatures, SampleFeatures};
pub use filters::{
    window_filtered_fraction, FilterConfig, FilterSet, IndelFilter, FILTER_SEPARATOR, PASS,
};
pub use statistics::{
    allele_fraction, error_prob_to_phred, fisher_exact_two_sided, safe_frac, strand_bias_phred,
    strand_odds_ratio, SampleStatistics, MAX_PHRED,
};
pub use types::{
    CallResult, IndelType, NormalType, PendingRecord, Position, RepeatAnnotation, Tier, TierPair,
    TieredSampleEvidence, WindowNoiseStats,
};
pub use vcf::{render_header, write_header, write_record, ResolvedRecord, SampleBlock, FORMAT_KEYS};
pub use window::{RollingWindow, WindowNoiseTracker};
pub use writer::{IndelWriterError, SomaticIndelWriter, WriterEvent};
