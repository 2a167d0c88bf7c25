use statrs::function::factorial::ln_factorial;

use crate::genomics::{TierPair, TieredSampleEvidence};

/// Largest phred score reported for a strand-bias probability.
///
/// A Fisher p-value that underflows to zero maps here instead of infinity.
pub const MAX_PHRED: f64 = 3000.0;

/// Relative tolerance when collecting tables "as or less likely" than the
/// observed one in the two-sided Fisher test.
const FISHER_REL_TOLERANCE: f64 = 1e-7;

/// `num / denom`, or 0 when the denominator is zero.
pub fn safe_frac(num: u64, denom: u64) -> f64 {
    if denom > 0 {
        num as f64 / denom as f64
    } else {
        0.0
    }
}

/// Indel allele fraction estimated from qualifying reads.
pub fn allele_fraction(evidence: &TieredSampleEvidence) -> f64 {
    let total = u64::from(evidence.ref_reads)
        + u64::from(evidence.alt_reads)
        + u64::from(evidence.indel_reads);
    safe_frac(u64::from(evidence.indel_reads), total)
}

/// Strand odds ratio `log10((ref_fwd * indel_rev) / (ref_rev * indel_fwd))`.
///
/// Positive infinity when the denominator product is zero. A zero numerator
/// over a non-zero denominator gives negative infinity.
pub fn strand_odds_ratio(evidence: &TieredSampleEvidence) -> f64 {
    let num = u64::from(evidence.ref_reads_fwd) * u64::from(evidence.indel_reads_rev);
    let denom = u64::from(evidence.ref_reads_rev) * u64::from(evidence.indel_reads_fwd);
    if denom == 0 {
        return f64::INFINITY;
    }
    (num as f64 / denom as f64).log10()
}

/// Two-sided Fisher exact test p-value for the 2x2 table `[[a, b], [c, d]]`.
///
/// Sums the hypergeometric probabilities of every table with the observed
/// margins that is no more likely than the observed table.
pub fn fisher_exact_two_sided(a: u64, b: u64, c: u64, d: u64) -> f64 {
    let row1 = a + b;
    let row2 = c + d;
    let col1 = a + c;
    let col2 = b + d;
    let n = row1 + row2;
    if n == 0 {
        return 1.0;
    }

    let ln_margins = ln_factorial(row1) + ln_factorial(row2) + ln_factorial(col1)
        + ln_factorial(col2)
        - ln_factorial(n);
    // Table probability given its top-left cell; the margins fix the rest.
    let ln_prob = |x: u64| {
        ln_margins
            - ln_factorial(x)
            - ln_factorial(row1 - x)
            - ln_factorial(col1 - x)
            - ln_factorial(row2 + x - col1)
    };

    let observed = ln_prob(a).exp();
    let cutoff = observed * (1.0 + FISHER_REL_TOLERANCE);
    let lo = col1.saturating_sub(row2);
    let hi = row1.min(col1);

    let p: f64 = (lo..=hi)
        .map(|x| ln_prob(x).exp())
        .filter(|&prob| prob <= cutoff)
        .sum();
    p.min(1.0)
}

/// Convert an error probability to a phred score, capped at [`MAX_PHRED`].
pub fn error_prob_to_phred(prob: f64) -> f64 {
    let score = (-10.0 * prob.log10()).min(MAX_PHRED);
    if score > 0.0 {
        score
    } else {
        0.0
    }
}

/// Phred-scaled Fisher strand bias over
/// `[[ref_fwd, indel_fwd], [ref_rev, indel_rev]]`.
pub fn strand_bias_phred(evidence: &TieredSampleEvidence) -> f64 {
    error_prob_to_phred(fisher_exact_two_sided(
        u64::from(evidence.ref_reads_fwd),
        u64::from(evidence.indel_reads_fwd),
        u64::from(evidence.ref_reads_rev),
        u64::from(evidence.indel_reads_rev),
    ))
}

/// Derived per-tier statistics for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStatistics {
    /// Indel allele fraction (AF).
    pub allele_fraction: TierPair<f64>,
    /// Strand odds ratio, log10 scale (SOR).
    pub strand_odds_ratio: TierPair<f64>,
    /// Fisher strand bias, phred scale (FS).
    pub strand_bias: TierPair<f64>,
    /// Read-position rank-sum, passed through (RR).
    pub read_pos_ranksum: TierPair<f64>,
}

impl SampleStatistics {
    /// Compute every statistic for both tiers of one sample.
    pub fn compute(evidence: &TierPair<TieredSampleEvidence>) -> Self {
        Self {
            allele_fraction: evidence.map(allele_fraction),
            strand_odds_ratio: evidence.map(strand_odds_ratio),
            strand_bias: evidence.map(strand_bias_phred),
            read_pos_ranksum: evidence.map(|e| e.read_pos_ranksum),
        }
    }
}
