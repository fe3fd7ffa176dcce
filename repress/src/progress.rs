//! Byte-weighted batch progress.
//!
//! Overall completion is proportional to cumulative byte size rather than
//! file count: each file's share of the bar equals its share of the
//! batch's bytes, so one huge file cannot make a crowd of small ones
//! appear to finish instantly (or vice versa).

/// Weighted progress state, owned exclusively by the batch orchestrator
/// and reset at the start of each run.
#[derive(Debug)]
pub struct BatchProgress {
    total_bytes: u64,
    completed_bytes: u64,
    current_file_bytes: u64,
    current_file_percent: u8,
    /// High-water mark; keeps the reported value monotone even if a
    /// caller misbehaves.
    reported: f64,
}

impl BatchProgress {
    pub fn new(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            completed_bytes: 0,
            current_file_bytes: 0,
            current_file_percent: 0,
            reported: 0.0,
        }
    }

    /// Begin the next file; its in-flight progress restarts at zero.
    pub fn start_file(&mut self, bytes: u64) {
        self.current_file_bytes = bytes;
        self.current_file_percent = 0;
        self.recompute();
    }

    /// Update the in-flight file's own 0-100 progress. Values above 100
    /// are clamped and regressions are ignored, so per-file progress is
    /// monotone by construction.
    pub fn file_progress(&mut self, percent: u8) {
        self.current_file_percent = self.current_file_percent.max(percent.min(100));
        self.recompute();
    }

    /// The in-flight file's own progress.
    pub fn file_percent(&self) -> u8 {
        self.current_file_percent
    }

    /// Fold the in-flight file's full weight into the completed total.
    /// Called on success AND failure: a skipped file's bytes are still
    /// accounted for, so the bar reaches 100 by the end of the batch.
    pub fn finish_file(&mut self) {
        self.completed_bytes += self.current_file_bytes;
        self.current_file_bytes = 0;
        self.current_file_percent = 100;
        self.recompute();
    }

    /// Overall weighted percentage, monotone non-decreasing in [0, 100].
    pub fn overall(&self) -> f64 {
        self.reported
    }

    fn recompute(&mut self) {
        if self.total_bytes == 0 {
            return;
        }
        let in_flight =
            self.current_file_percent as f64 / 100.0 * self.current_file_bytes as f64;
        let raw = (self.completed_bytes as f64 + in_flight) / self.total_bytes as f64 * 100.0;
        self.reported = self.reported.max(raw.min(100.0));
    }
}
