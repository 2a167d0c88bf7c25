use std::collections::BTreeSet;
use std::fmt;

use crate::genomics::{CallResult, NormalType, WindowNoiseStats};

/// Token written in FILTER when no filter is active.
pub const PASS: &str = "PASS";

/// Separator between active filter names.
pub const FILTER_SEPARATOR: char = ';';

/// Quality filters that may be applied to a somatic indel record.
///
/// Declaration order is the order filters are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndelFilter {
    /// Normal depth above the configured ceiling.
    HighDepth,
    /// Too many filtered basecalls in the surrounding window.
    IndelBCNoise,
    /// Normal is not confidently reference.
    QsiRef,
}

impl IndelFilter {
    /// Every filter, in output order.
    pub const ALL: [IndelFilter; 3] = [
        IndelFilter::HighDepth,
        IndelFilter::IndelBCNoise,
        IndelFilter::QsiRef,
    ];

    /// Name written to FILTER and the header.
    pub fn label(self) -> &'static str {
        match self {
            IndelFilter::HighDepth => "HighDepth",
            IndelFilter::IndelBCNoise => "IndelBCNoise",
            IndelFilter::QsiRef => "QSI_ref",
        }
    }

    /// Look a filter up by its written name.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|filter| filter.label() == label)
    }
}

impl fmt::Display for IndelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Active filters for one record. Empty means the record passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    active: BTreeSet<IndelFilter>,
}

impl FilterSet {
    /// Empty (passing) set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a filter active. Setting it twice has no further effect.
    pub fn set(&mut self, filter: IndelFilter) {
        self.active.insert(filter);
    }

    /// Whether `filter` is active.
    pub fn contains(&self, filter: IndelFilter) -> bool {
        self.active.contains(&filter)
    }

    /// True when no filter is active.
    pub fn is_pass(&self) -> bool {
        self.active.is_empty()
    }

    /// Active filters in output order.
    pub fn iter(&self) -> impl Iterator<Item = IndelFilter> + '_ {
        self.active.iter().copied()
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pass() {
            return f.write_str(PASS);
        }
        for (idx, filter) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, "{}", FILTER_SEPARATOR)?;
            }
            f.write_str(filter.label())?;
        }
        Ok(())
    }
}

/// Thresholds for the site filters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    /// Normal tier-1 depth ceiling; `None` disables HighDepth.
    pub max_depth: Option<u32>,
    /// Filtered window basecall fraction at which IndelBCNoise triggers.
    pub max_window_filtered_frac: f64,
    /// QSI_NT below this triggers QSI_ref.
    pub qsi_nt_lower_bound: u32,
}

/// Share of window basecalls that were filtered: `filtered / (filtered + used)`.
///
/// Window averages are truncated to whole basecall counts first.
pub fn window_filtered_fraction(window: &WindowNoiseStats) -> f64 {
    // Negative or NaN averages count as zero.
    let filtered = window.filtered.trunc().max(0.0);
    let used = window.used.trunc().max(0.0);
    let total = filtered + used;
    if total > 0.0 {
        filtered / total
    } else {
        0.0
    }
}

impl FilterConfig {
    /// Evaluate every site filter for one call against its window context.
    pub fn evaluate(
        &self,
        call: &CallResult,
        normal_window: &WindowNoiseStats,
        tumor_window: &WindowNoiseStats,
    ) -> FilterSet {
        let mut filters = FilterSet::new();

        if let Some(max_depth) = self.max_depth {
            if call.normal.tier1.depth > max_depth {
                filters.set(IndelFilter::HighDepth);
            }
        }

        let normal_frac = window_filtered_fraction(normal_window);
        let tumor_frac = window_filtered_fraction(tumor_window);
        if normal_frac >= self.max_window_filtered_frac
            || tumor_frac >= self.max_window_filtered_frac
        {
            filters.set(IndelFilter::IndelBCNoise);
        }

        if call.ntype != NormalType::Ref || call.from_ntype_qphred < self.qsi_nt_lower_bound {
            filters.set(IndelFilter::QsiRef);
        }

        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{Tier, TierPair, TieredSampleEvidence};
    use test_case::test_case;

    fn config() -> FilterConfig {
        FilterConfig {
            max_depth: Some(500),
            max_window_filtered_frac: 0.2,
            qsi_nt_lower_bound: 30,
        }
    }

    fn call(normal_depth: u32, ntype: NormalType, qsi_nt: u32) -> CallResult {
        let normal = TieredSampleEvidence {
            depth: normal_depth,
            ..Default::default()
        };
        CallResult {
            qphred: 50,
            tier: Tier::Tier1,
            ntype,
            from_ntype_qphred: qsi_nt,
            from_ntype_tier: Tier::Tier1,
            genotype: 0,
            is_overlap: false,
            normal: TierPair::new(normal.clone(), normal),
            tumor: TierPair::default(),
        }
    }

    fn quiet() -> WindowNoiseStats {
        WindowNoiseStats::new(100.0, 0.0, 0.0)
    }

    #[test_case(1000, true ; "above ceiling")]
    #[test_case(501, true ; "just above ceiling")]
    #[test_case(500, false ; "at ceiling")]
    #[test_case(10, false ; "shallow")]
    fn high_depth(depth: u32, expected: bool) {
        let filters = config().evaluate(&call(depth, NormalType::Ref, 40), &quiet(), &quiet());
        assert_eq!(filters.contains(IndelFilter::HighDepth), expected);
    }

    #[test]
    fn high_depth_disabled_without_ceiling() {
        let config = FilterConfig {
            max_depth: None,
            ..config()
        };
        let filters = config.evaluate(&call(1_000_000, NormalType::Ref, 40), &quiet(), &quiet());
        assert!(filters.is_pass());
    }

    #[test]
    fn high_depth_uses_tier1_normal_depth() {
        let mut call = call(10, NormalType::Ref, 40);
        call.normal.tier2.depth = 10_000;
        call.tumor.tier1.depth = 10_000;
        let filters = config().evaluate(&call, &quiet(), &quiet());
        assert!(!filters.contains(IndelFilter::HighDepth));
    }

    #[test_case(9.0, 1.0, true ; "ninety percent")]
    #[test_case(2.0, 8.0, true ; "at threshold")]
    #[test_case(1.0, 9.0, false ; "below threshold")]
    #[test_case(0.0, 0.0, false ; "empty window")]
    #[test_case(0.9, 0.1, false ; "truncated to zero counts")]
    fn bc_noise_in_tumor(filtered: f64, used: f64, expected: bool) {
        let tumor = WindowNoiseStats::new(used, filtered, 0.0);
        let filters = config().evaluate(&call(10, NormalType::Ref, 40), &quiet(), &tumor);
        assert_eq!(filters.contains(IndelFilter::IndelBCNoise), expected);
    }

    #[test_case(1e30, 1e30, 0.5 ; "beyond integer range")]
    #[test_case(-4.0, 6.0, 0.0 ; "negative filtered")]
    #[test_case(f64::NAN, 3.0, 0.0 ; "nan filtered")]
    #[test_case(2.7, 7.9, 2.0 / 9.0 ; "fractional averages")]
    fn filtered_fraction_edges(filtered: f64, used: f64, expected: f64) {
        let frac = window_filtered_fraction(&WindowNoiseStats::new(used, filtered, 0.0));
        assert!((frac - expected).abs() < 1e-12, "{} vs {}", frac, expected);
    }

    #[test]
    fn bc_noise_in_normal() {
        let normal = WindowNoiseStats::new(1.0, 9.0, 0.0);
        let filters = config().evaluate(&call(10, NormalType::Ref, 40), &normal, &quiet());
        assert!(filters.contains(IndelFilter::IndelBCNoise));
    }

    #[test_case(NormalType::Ref, 40, false)]
    #[test_case(NormalType::Ref, 30, false)]
    #[test_case(NormalType::Ref, 29, true)]
    #[test_case(NormalType::Het, 40, true)]
    #[test_case(NormalType::Hom, 40, true)]
    #[test_case(NormalType::Conflict, 0, true)]
    fn qsi_ref(ntype: NormalType, qsi_nt: u32, expected: bool) {
        let filters = config().evaluate(&call(10, ntype, qsi_nt), &quiet(), &quiet());
        assert_eq!(filters.contains(IndelFilter::QsiRef), expected);
    }

    #[test]
    fn filters_accumulate_in_fixed_order() {
        let noisy = WindowNoiseStats::new(1.0, 9.0, 0.0);
        let filters = config().evaluate(&call(1000, NormalType::Het, 0), &noisy, &noisy);
        let active: Vec<_> = filters.iter().collect();
        assert_eq!(active, IndelFilter::ALL.to_vec());
        assert_eq!(filters.to_string(), "HighDepth;IndelBCNoise;QSI_ref");
    }

    #[test]
    fn empty_set_renders_pass() {
        let mut filters = FilterSet::new();
        assert_eq!(filters.to_string(), PASS);
        filters.set(IndelFilter::QsiRef);
        filters.set(IndelFilter::QsiRef);
        assert_eq!(filters.to_string(), "QSI_ref");
    }

    #[test]
    fn labels_round_trip() {
        for filter in IndelFilter::ALL {
            assert_eq!(IndelFilter::from_label(filter.label()), Some(filter));
        }
        assert_eq!(IndelFilter::from_label("LowQ"), None);
    }
}
