use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::genomics::vcf::{write_header, write_record, ResolvedRecord};
use crate::genomics::{FilterConfig, PendingCallCache, PendingRecord, Position, WindowNoiseStats};
use crate::WriterOptions;

/// Errors raised while writing somatic indel records.
#[derive(Debug, Error)]
pub enum IndelWriterError {
    /// Window statistics arrived for a position with no cached call. The
    /// caller delivered the two input streams out of order.
    #[error("window statistics for position {pos} have no cached indel call")]
    MissingPendingCall {
        /// Zero-based position of the window statistics.
        pos: Position,
    },

    /// The writer was finished while calls were still waiting for window
    /// statistics.
    #[error("indel calls still cached at positions {positions:?}")]
    UnflushedCalls {
        /// Zero-based positions left in the cache, ascending.
        positions: Vec<Position>,
    },

    /// Output stream failure.
    #[error("failed to write indel record: {0}")]
    Io(#[from] io::Error),
}

/// One arrival on either input stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WriterEvent {
    /// A scored call to cache.
    Call {
        /// Zero-based position.
        pos: Position,
        /// The call and its locus description.
        record: PendingRecord,
    },
    /// Window statistics that flush the position.
    Window {
        /// Zero-based position.
        pos: Position,
        /// Normal sample window averages.
        normal: WindowNoiseStats,
        /// Tumor sample window averages.
        tumor: WindowNoiseStats,
    },
}

/// Caches somatic indel calls until their window statistics arrive, then
/// filters, annotates and writes them.
///
/// One writer owns one output stream and serves one region; calls and window
/// statistics must arrive in non-decreasing position order, with all calls
/// at a position cached before its window statistics.
#[derive(Debug)]
pub struct SomaticIndelWriter<W: Write> {
    options: WriterOptions,
    filter_config: FilterConfig,
    cache: PendingCallCache,
    out: W,
}

impl<W: Write> SomaticIndelWriter<W> {
    /// Create a writer emitting to `out`.
    pub fn new(options: WriterOptions, out: W) -> Self {
        let filter_config = options.filter_config();
        Self {
            options,
            filter_config,
            cache: PendingCallCache::new(),
            out,
        }
    }

    /// Run configuration.
    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Write the header lines for this run.
    pub fn write_header(&mut self) -> Result<(), IndelWriterError> {
        write_header(&mut self.out, &self.options)?;
        Ok(())
    }

    /// Cache a call at `pos`. Calls already cached there are kept.
    pub fn cache_indel(&mut self, pos: Position, record: PendingRecord) {
        trace!(pos, ref_seq = %record.ref_seq, alt_seq = %record.alt_seq, "caching indel call");
        self.cache.insert(pos, record);
    }

    /// Whether calls are cached at `pos`.
    pub fn test_pos(&self, pos: Position) -> bool {
        self.cache.contains(pos)
    }

    /// Cached positions, ascending.
    pub fn pending_positions(&self) -> Vec<Position> {
        self.cache.positions()
    }

    /// Write every call cached at `pos` using the shared window statistics,
    /// then drop the position from the cache. Returns the number of records
    /// written.
    ///
    /// Fails with [`IndelWriterError::MissingPendingCall`] and writes
    /// nothing when no call is cached at `pos`. If the output stream fails,
    /// the calls stay cached at `pos`.
    pub fn add_window_stats(
        &mut self,
        pos: Position,
        normal: &WindowNoiseStats,
        tumor: &WindowNoiseStats,
    ) -> Result<usize, IndelWriterError> {
        let records = self
            .cache
            .get(pos)
            .ok_or(IndelWriterError::MissingPendingCall { pos })?;

        debug!(pos, records = records.len(), "flushing cached indel calls");
        // All lines for a locus go out in one write.
        let mut lines = Vec::new();
        for record in records {
            let filters = self.filter_config.evaluate(&record.call, normal, tumor);
            let resolved =
                ResolvedRecord::new(&self.options.chrom, pos, record, filters, normal, tumor);
            write_record(&mut lines, &resolved)?;
        }
        let written = records.len();

        self.out.write_all(&lines)?;
        self.cache.take(pos);
        Ok(written)
    }

    /// Dispatch one input event. Returns the number of records written.
    pub fn apply(&mut self, event: WriterEvent) -> Result<usize, IndelWriterError> {
        match event {
            WriterEvent::Call { pos, record } => {
                self.cache_indel(pos, record);
                Ok(0)
            }
            WriterEvent::Window { pos, normal, tumor } => {
                self.add_window_stats(pos, &normal, &tumor)
            }
        }
    }

    /// Borrow the output stream.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Flush the output stream and hand it back.
    ///
    /// Fails with [`IndelWriterError::UnflushedCalls`] if calls are still
    /// cached; the output written so far is flushed either way.
    pub fn finish(mut self) -> Result<W, IndelWriterError> {
        self.out.flush()?;
        if !self.cache.is_empty() {
            let positions = self.cache.positions();
            warn!(
                pending = positions.len(),
                "indel calls never received window statistics"
            );
            return Err(IndelWriterError::UnflushedCalls { positions });
        }
        Ok(self.out)
    }
}
