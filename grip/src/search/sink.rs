use std::sync::Mutex;

use crate::errors::SearchError;
use crate::results::ScanOutcome;

/// Receives scan outcomes and walk diagnostics as tasks complete.
///
/// Called concurrently from worker threads, in no particular order. An implementation
/// that prints should emit each file's block in one go so files don't interleave.
pub trait Sink: Send + Sync {
    /// Called once per scanned file, whether or not it matched
    fn on_file(&self, outcome: ScanOutcome);

    /// Called when a directory (or one of its entries) could not be listed
    fn on_walk_error(&self, _error: SearchError) {}
}

/// Keeps every outcome and walk error in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    outcomes: Mutex<Vec<ScanOutcome>>,
    walk_errors: Mutex<Vec<SearchError>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected file outcomes and walk errors
    pub fn into_parts(self) -> (Vec<ScanOutcome>, Vec<SearchError>) {
        let outcomes = self
            .outcomes
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let walk_errors = self
            .walk_errors
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        (outcomes, walk_errors)
    }
}

impl Sink for CollectingSink {
    fn on_file(&self, outcome: ScanOutcome) {
        self.outcomes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(outcome);
    }

    fn on_walk_error(&self, error: SearchError) {
        self.walk_errors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(error);
    }
}
