//! Parse written indel records back into numeric features.
//!
//! Used to inspect or post-process output (e.g. for downstream classifiers)
//! without depending on a VCF library.

use std::collections::BTreeMap;
use std::str::FromStr;

use thiserror::Error;

use crate::genomics::vcf::FORMAT_KEYS;
use crate::genomics::{IndelFilter, TierPair, FILTER_SEPARATOR, PASS};

const COLUMN_COUNT: usize = 11;

/// Errors while parsing a record line.
#[derive(Debug, Error, PartialEq)]
pub enum FeatureParseError {
    /// Wrong number of tab-separated columns.
    #[error("expected {expected} columns, found {found}")]
    ColumnCount {
        /// Required column count.
        expected: usize,
        /// Columns present.
        found: usize,
    },

    /// FORMAT column differs from the one this crate writes.
    #[error("unexpected FORMAT column '{0}'")]
    FormatMismatch(String),

    /// Sample column has the wrong number of colon-separated fields.
    #[error("sample column has {found} fields, expected {expected}")]
    SampleFieldCount {
        /// Required field count.
        expected: usize,
        /// Fields present.
        found: usize,
    },

    /// A field failed to parse.
    #[error("invalid {field} value '{value}'")]
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// Offending text.
        value: String,
    },

    /// FILTER names a filter this crate does not write.
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),
}

fn parse_value<T: FromStr>(field: &'static str, value: &str) -> Result<T, FeatureParseError> {
    value.parse().map_err(|_| FeatureParseError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

fn parse_pair<T: FromStr>(field: &'static str, value: &str) -> Result<TierPair<T>, FeatureParseError> {
    let (tier1, tier2) = value
        .split_once(',')
        .ok_or_else(|| FeatureParseError::InvalidValue {
            field,
            value: value.to_string(),
        })?;
    Ok(TierPair::new(parse_value(field, tier1)?, parse_value(field, tier2)?))
}

/// Sample column values, in FORMAT order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFeatures {
    /// DP: tier 1 depth.
    pub depth: u32,
    /// DP2: tier 2 depth.
    pub depth2: u32,
    /// TAR: reference plus other-alternate reads.
    pub tar: TierPair<u64>,
    /// TIR: indel reads.
    pub tir: TierPair<u32>,
    /// TOR: reads supporting neither allele.
    pub tor: TierPair<u32>,
    /// DP50: used plus filtered window average.
    pub dp50: f64,
    /// FDP50: filtered window average.
    pub fdp50: f64,
    /// SUBDP50: sub-mapped window average.
    pub subdp50: f64,
    /// AF: allele fraction.
    pub af: TierPair<f64>,
    /// SOR: log10 strand odds ratio.
    pub sor: TierPair<f64>,
    /// FS: phred Fisher strand bias.
    pub fs: TierPair<f64>,
    /// RR: read-position rank-sum.
    pub rr: TierPair<f64>,
    /// MQ: mean mapping quality.
    pub mq: TierPair<f64>,
    /// MQ0: mapping quality zero fraction.
    pub mq0: TierPair<f64>,
}

impl FromStr for SampleFeatures {
    type Err = FeatureParseError;

    fn from_str(block: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = block.split(':').collect();
        let expected = FORMAT_KEYS.split(':').count();
        if fields.len() != expected {
            return Err(FeatureParseError::SampleFieldCount {
                expected,
                found: fields.len(),
            });
        }

        Ok(Self {
            depth: parse_value("DP", fields[0])?,
            depth2: parse_value("DP2", fields[1])?,
            tar: parse_pair("TAR", fields[2])?,
            tir: parse_pair("TIR", fields[3])?,
            tor: parse_pair("TOR", fields[4])?,
            dp50: parse_value("DP50", fields[5])?,
            fdp50: parse_value("FDP50", fields[6])?,
            subdp50: parse_value("SUBDP50", fields[7])?,
            af: parse_pair("AF", fields[8])?,
            sor: parse_pair("SOR", fields[9])?,
            fs: parse_pair("FS", fields[10])?,
            rr: parse_pair("RR", fields[11])?,
            mq: parse_pair("MQ", fields[12])?,
            mq0: parse_pair("MQ0", fields[13])?,
        })
    }
}

/// One parsed record line.
#[derive(Debug, Clone, PartialEq)]
pub struct IndelFeatures {
    /// CHROM.
    pub chrom: String,
    /// POS, one-based as written.
    pub pos: u32,
    /// REF.
    pub ref_seq: String,
    /// ALT.
    pub alt_seq: String,
    /// Active filters; empty for PASS.
    pub filters: Vec<IndelFilter>,
    /// INFO entries. Flags map to `None`.
    pub info: BTreeMap<String, Option<String>>,
    /// NORMAL column.
    pub normal: SampleFeatures,
    /// TUMOR column.
    pub tumor: SampleFeatures,
}

/// Column names of [`IndelFeatures::to_tsv_row`].
pub const FEATURE_COLUMNS: &[&str] = &[
    "CHROM", "POS", "REF", "ALT", "FILTER", "NT", "QSI", "QSI_NT", "IHP", "N_DP", "T_DP",
    "N_DP50", "N_FDP50", "T_DP50", "T_FDP50", "T_SUBDP50", "N_AF", "T_AF", "T_SOR", "T_FS",
    "T_RR", "T_MQ", "T_MQ0",
];

impl IndelFeatures {
    /// Parse one record line; a trailing newline is ignored.
    pub fn parse_line(line: &str) -> Result<Self, FeatureParseError> {
        let columns: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if columns.len() != COLUMN_COUNT {
            return Err(FeatureParseError::ColumnCount {
                expected: COLUMN_COUNT,
                found: columns.len(),
            });
        }
        if columns[8] != FORMAT_KEYS {
            return Err(FeatureParseError::FormatMismatch(columns[8].to_string()));
        }

        let filters = if columns[6] == PASS {
            Vec::new()
        } else {
            columns[6]
                .split(FILTER_SEPARATOR)
                .map(|name| {
                    IndelFilter::from_label(name)
                        .ok_or_else(|| FeatureParseError::UnknownFilter(name.to_string()))
                })
                .collect::<Result<_, _>>()?
        };

        let info = columns[7]
            .split(';')
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once('=') {
                Some((key, value)) => (key.to_string(), Some(value.to_string())),
                None => (entry.to_string(), None),
            })
            .collect();

        Ok(Self {
            chrom: columns[0].to_string(),
            pos: parse_value("POS", columns[1])?,
            ref_seq: columns[3].to_string(),
            alt_seq: columns[4].to_string(),
            filters,
            info,
            normal: columns[9].parse()?,
            tumor: columns[10].parse()?,
        })
    }

    /// Value of an INFO key; `None` for absent keys and flags.
    pub fn info_value(&self, key: &str) -> Option<&str> {
        self.info.get(key).and_then(|value| value.as_deref())
    }

    /// Whether an INFO key (value or flag) is present.
    pub fn has_info(&self, key: &str) -> bool {
        self.info.contains_key(key)
    }

    /// True when no filter is active.
    pub fn is_pass(&self) -> bool {
        self.filters.is_empty()
    }

    /// Flat tab-separated row matching [`FEATURE_COLUMNS`]. Tier 1 values
    /// are used for paired fields.
    pub fn to_tsv_row(&self) -> String {
        let filter = if self.is_pass() {
            PASS.to_string()
        } else {
            let separator = FILTER_SEPARATOR.to_string();
            self.filters
                .iter()
                .map(|f| f.label())
                .collect::<Vec<_>>()
                .join(separator.as_str())
        };
        let info = |key: &str| self.info_value(key).unwrap_or(".").to_string();
        let (normal, tumor) = (&self.normal, &self.tumor);

        let fields = [
            self.chrom.clone(),
            self.pos.to_string(),
            self.ref_seq.clone(),
            self.alt_seq.clone(),
            filter,
            info("NT"),
            info("QSI"),
            info("QSI_NT"),
            info("IHP"),
            normal.depth.to_string(),
            tumor.depth.to_string(),
            format!("{:.2}", normal.dp50),
            format!("{:.2}", normal.fdp50),
            format!("{:.2}", tumor.dp50),
            format!("{:.2}", tumor.fdp50),
            format!("{:.2}", tumor.subdp50),
            format!("{:.2}", normal.af.tier1),
            format!("{:.2}", tumor.af.tier1),
            format!("{:.2}", tumor.sor.tier1),
            format!("{:.2}", tumor.fs.tier1),
            format!("{:.2}", tumor.rr.tier1),
            format!("{:.2}", tumor.mq.tier1),
            format!("{:.2}", tumor.mq0.tier1),
        ];
        fields.join("\t")
    }
}
