use std::collections::VecDeque;

use crate::genomics::{Position, WindowNoiseStats};

/// Average of per-position values over a fixed-width trailing window.
///
/// The window spans `2 * flank + 1` positions ending at the most recent
/// observation. Positions without an observation count as zero.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    width: u32,
    values: VecDeque<(Position, f64)>,
    sum: f64,
}

impl RollingWindow {
    /// Window covering `flank` positions either side of its center.
    pub fn new(flank: u32) -> Self {
        Self {
            width: 2 * flank + 1,
            values: VecDeque::new(),
            sum: 0.0,
        }
    }

    /// Number of positions covered.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Add `value` at `pos`. Repeated observations at the newest position
    /// accumulate. Positions must be non-decreasing.
    pub fn insert(&mut self, pos: Position, value: f64) {
        debug_assert!(
            self.values.back().map_or(true, |&(last, _)| last <= pos),
            "window positions must be non-decreasing"
        );
        self.sum += value;
        if let Some((last, total)) = self.values.back_mut() {
            if *last == pos {
                *total += value;
                return;
            }
        }
        self.values.push_back((pos, value));
        self.evict_before(pos);
    }

    /// Drop everything that has left the window ending at `pos`.
    fn evict_before(&mut self, pos: Position) {
        while let Some(&(oldest, value)) = self.values.front() {
            if u64::from(oldest) + u64::from(self.width) > u64::from(pos) {
                break;
            }
            self.sum -= value;
            self.values.pop_front();
        }
        if self.values.is_empty() {
            self.sum = 0.0;
        }
    }

    /// Mean over the full window width.
    pub fn avg(&self) -> f64 {
        self.sum / f64::from(self.width)
    }
}

/// Tracks the three noise windows for one sample.
///
/// Averages describe the locus at the window center, so statistics for
/// position `p` are complete once `p + flank` has been observed.
#[derive(Debug, Clone)]
pub struct WindowNoiseTracker {
    used: RollingWindow,
    filtered: RollingWindow,
    submapped: RollingWindow,
}

impl WindowNoiseTracker {
    /// Tracker with `flank` positions either side of the locus.
    pub fn new(flank: u32) -> Self {
        Self {
            used: RollingWindow::new(flank),
            filtered: RollingWindow::new(flank),
            submapped: RollingWindow::new(flank),
        }
    }

    /// Record basecall counts observed at `pos`.
    pub fn observe(&mut self, pos: Position, used: u32, filtered: u32, submapped: u32) {
        self.used.insert(pos, f64::from(used));
        self.filtered.insert(pos, f64::from(filtered));
        self.submapped.insert(pos, f64::from(submapped));
    }

    /// Snapshot of the current averages.
    pub fn stats(&self) -> WindowNoiseStats {
        WindowNoiseStats::new(self.used.avg(), self.filtered.avg(), self.submapped.avg())
    }
}
