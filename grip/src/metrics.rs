use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::results::ScanOutcome;

/// Counters updated by every walk and scan task
#[derive(Debug, Clone)]
pub struct SearchStats {
    // Walk metrics
    dirs_walked: Arc<AtomicU64>,
    dirs_skipped: Arc<AtomicU64>,
    dirs_failed: Arc<AtomicU64>,

    // Scan metrics
    files_scanned: Arc<AtomicU64>,
    files_with_matches: Arc<AtomicU64>,
    total_matches: Arc<AtomicU64>,
    scan_errors: Arc<AtomicU64>,
}

impl SearchStats {
    /// Creates a new SearchStats instance
    pub fn new() -> Self {
        Self {
            dirs_walked: Arc::new(AtomicU64::new(0)),
            dirs_skipped: Arc::new(AtomicU64::new(0)),
            dirs_failed: Arc::new(AtomicU64::new(0)),
            files_scanned: Arc::new(AtomicU64::new(0)),
            files_with_matches: Arc::new(AtomicU64::new(0)),
            total_matches: Arc::new(AtomicU64::new(0)),
            scan_errors: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a directory whose entries were listed
    pub fn record_dir_walked(&self) {
        self.dirs_walked.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a hidden directory left out of the walk
    pub fn record_dir_skipped(&self) {
        self.dirs_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a directory that could not be listed
    pub fn record_dir_failed(&self) {
        self.dirs_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the outcome of one file scan
    pub fn record_scan(&self, outcome: &ScanOutcome) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
        match outcome {
            Ok(file) if file.has_matches() => {
                self.files_with_matches.fetch_add(1, Ordering::Relaxed);
                self.total_matches
                    .fetch_add(file.matches.len() as u64, Ordering::Relaxed);
            }
            Ok(_) => {}
            Err(_) => {
                self.scan_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Gets a point-in-time copy of the counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            dirs_walked: self.dirs_walked.load(Ordering::Relaxed),
            dirs_skipped: self.dirs_skipped.load(Ordering::Relaxed),
            dirs_failed: self.dirs_failed.load(Ordering::Relaxed),
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            files_with_matches: self.files_with_matches.load(Ordering::Relaxed),
            total_matches: self.total_matches.load(Ordering::Relaxed),
            scan_errors: self.scan_errors.load(Ordering::Relaxed),
        }
    }

    /// Logs the current counters
    pub fn log_stats(&self) {
        let stats = self.snapshot();
        info!(
            "Search stats:\n\
             Directories walked/skipped/failed: {}/{}/{}\n\
             Files scanned: {}\n\
             Files with matches: {}\n\
             Matching lines: {}\n\
             Scan errors: {}",
            stats.dirs_walked,
            stats.dirs_skipped,
            stats.dirs_failed,
            stats.files_scanned,
            stats.files_with_matches,
            stats.total_matches,
            stats.scan_errors
        );
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values at the time of [`SearchStats::snapshot`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub dirs_walked: u64,
    pub dirs_skipped: u64,
    pub dirs_failed: u64,
    pub files_scanned: u64,
    pub files_with_matches: u64,
    pub total_matches: u64,
    pub scan_errors: u64,
}
