//! # Somatic indel record writer
//!
//! Synchronizes two independently produced, position-keyed streams for a
//! paired normal/tumor analysis:
//!
//! 1. **Candidate calls**: scored indel alleles with tiered read evidence,
//!    cached as they arrive.
//! 2. **Window noise statistics**: rolling basecall-noise averages around a
//!    locus. Their arrival flushes every cached call at that position.
//!
//! Each flushed call is filtered, annotated with derived strand and allele
//! statistics and written as one tab-delimited VCF-style line.
//!
//! Callers that only have per-position basecall counts can derive the window
//! statistics with [`genomics::WindowNoiseTracker`], one tracker per sample.
//! The writer itself takes finished [`genomics::WindowNoiseStats`] and does
//! not depend on how they were computed.
//!
//! ## Usage Example
//!
//! ```ignore
//! use somindel::{WriterOptions, genomics::SomaticIndelWriter};
//!
//! let options = WriterOptions::new("chr1").with_max_depth(Some(500));
//! let mut writer = SomaticIndelWriter::new(options, std::io::stdout());
//! writer.cache_indel(pos, record);
//! writer.add_window_stats(pos, &normal_window, &tumor_window)?;
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod genomics; // Call records, statistics, filtering and output

use std::sync::Arc;

pub use genomics::{FilterConfig, IndelWriterError, SomaticIndelWriter};

/// Default ceiling on the filtered share of window basecalls.
pub const DEFAULT_MAX_WINDOW_FILTERED_FRAC: f64 = 0.3;

/// Default lower bound on the normal-type conditioned somatic quality.
pub const DEFAULT_QSI_NT_LOWER_BOUND: u32 = 30;

/// Run-level configuration supplied by whoever constructs the writer.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterOptions {
    /// Chromosome name written in the CHROM column.
    pub chrom: Arc<str>,

    /// Normal depth ceiling; `None` disables the HighDepth filter.
    pub max_depth: Option<u32>,

    /// IndelBCNoise triggers when either sample's filtered window fraction
    /// meets or exceeds this value.
    pub max_window_filtered_frac: f64,

    /// QSI_ref triggers when QSI_NT falls below this value.
    pub qsi_nt_lower_bound: u32,

    /// Value of the `##source` header line.
    pub source: String,
}

impl WriterOptions {
    /// Options for one chromosome with default thresholds.
    pub fn new(chrom: impl Into<Arc<str>>) -> Self {
        Self {
            chrom: chrom.into(),
            max_depth: None,
            max_window_filtered_frac: DEFAULT_MAX_WINDOW_FILTERED_FRAC,
            qsi_nt_lower_bound: DEFAULT_QSI_NT_LOWER_BOUND,
            source: concat!("somindel ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set the depth ceiling.
    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the filtered basecall fraction threshold.
    pub fn with_max_window_filtered_frac(mut self, frac: f64) -> Self {
        self.max_window_filtered_frac = frac;
        self
    }

    /// Set the QSI_NT lower bound.
    pub fn with_qsi_nt_lower_bound(mut self, bound: u32) -> Self {
        self.qsi_nt_lower_bound = bound;
        self
    }

    /// Filter thresholds derived from these options.
    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            max_depth: self.max_depth,
            max_window_filtered_frac: self.max_window_filtered_frac,
            qsi_nt_lower_bound: self.qsi_nt_lower_bound,
        }
    }
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self::new("chr1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        let options = WriterOptions::new("chr2");
        assert_eq!(options.chrom.as_ref(), "chr2");
        assert_eq!(options.max_depth, None);
        assert_eq!(options.max_window_filtered_frac, 0.3);
        assert_eq!(options.qsi_nt_lower_bound, 30);
    }

    #[test]
    fn filter_config_follows_options() {
        let config = WriterOptions::new("chr1")
            .with_max_depth(Some(500))
            .with_max_window_filtered_frac(0.2)
            .with_qsi_nt_lower_bound(40)
            .filter_config();
        assert_eq!(config.max_depth, Some(500));
        assert_eq!(config.max_window_filtered_frac, 0.2);
        assert_eq!(config.qsi_nt_lower_bound, 40);
    }
}
