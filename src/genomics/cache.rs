use std::collections::BTreeMap;

use crate::genomics::{PendingRecord, Position};

/// Calls that have evidence but are still waiting for window statistics.
///
/// Each position holds its records in insertion order. An entry exists from
/// the first insertion at a position until it is taken for output.
#[derive(Debug, Default)]
pub struct PendingCallCache {
    entries: BTreeMap<Position, Vec<PendingRecord>>,
}

impl PendingCallCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record at `pos`. Never replaces earlier records; several
    /// alleles at one locus are kept side by side.
    pub fn insert(&mut self, pos: Position, record: PendingRecord) {
        self.entries.entry(pos).or_default().push(record);
    }

    /// Whether anything is pending at `pos`.
    pub fn contains(&self, pos: Position) -> bool {
        self.entries.contains_key(&pos)
    }

    /// Records pending at `pos`, if any.
    pub fn get(&self, pos: Position) -> Option<&[PendingRecord]> {
        self.entries.get(&pos).map(Vec::as_slice)
    }

    /// Remove and return every record at `pos`, in insertion order.
    pub fn take(&mut self, pos: Position) -> Option<Vec<PendingRecord>> {
        self.entries.remove(&pos)
    }

    /// Number of positions with pending records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pending positions in ascending order.
    pub fn positions(&self) -> Vec<Position> {
        self.entries.keys().copied().collect()
    }
}
