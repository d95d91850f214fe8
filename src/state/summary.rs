use crate::state::{FrontierSnapshot, TaskOutcome};
use std::time::Duration;

/// Totals of a finished crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// URLs admitted to the frontier
    pub urls_seen: usize,
    /// URLs whose task was reported complete
    pub urls_completed: usize,
    /// Files written to the output directory
    pub files_saved: usize,
    /// Body bytes written across all files
    pub bytes_saved: u64,
    /// Non-text resources that were not saved
    pub skipped: usize,
    /// Fetches that failed (network errors, non-200 status)
    pub failed: usize,
    /// Wall-clock time from start to drain
    pub elapsed: Duration,
}

impl CrawlSummary {
    /// Folds one task outcome into the totals
    pub fn record(&mut self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Saved { bytes, .. } => {
                self.files_saved += 1;
                self.bytes_saved += bytes;
            }
            TaskOutcome::Skipped { .. } => self.skipped += 1,
            TaskOutcome::Failed { .. } => self.failed += 1,
            TaskOutcome::Pending => {}
        }
    }

    /// Copies the frontier counters into the summary
    pub fn set_frontier(&mut self, snapshot: FrontierSnapshot) {
        self.urls_seen = snapshot.seen;
        self.urls_completed = snapshot.completed;
    }
}
