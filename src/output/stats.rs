//! Crawl progress and summary reporting
//!
//! The coordinator hands a [`StatusReport`] to a [`StatusObserver`] at a
//! fixed interval and once more when it stops. A report pairs the frontier
//! counters with the resident memory of the process. The default observer
//! writes a debug log line; callers can register their own to feed a
//! progress bar or metrics system.

use crate::state::{CrawlSummary, FrontierSnapshot};
use std::sync::Arc;

const MIB: f64 = 1024.0 * 1024.0;

/// One status tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    /// Frontier counters at the time of the tick
    pub frontier: FrontierSnapshot,
    /// Resident memory of the process in bytes, if the platform reports it
    pub physical_mem: Option<usize>,
}

impl StatusReport {
    /// Pairs a frontier snapshot with the current process memory usage
    pub fn capture(frontier: FrontierSnapshot) -> Self {
        Self {
            frontier,
            physical_mem: memory_stats::memory_stats().map(|usage| usage.physical_mem),
        }
    }
}

/// Callback receiving periodic status reports
pub type StatusObserver = Arc<dyn Fn(StatusReport) + Send + Sync>;

/// Returns the observer that logs reports through `tracing`
pub fn logging_observer() -> StatusObserver {
    Arc::new(log_status)
}

/// Logs one status report at debug level
pub fn log_status(report: StatusReport) {
    let frontier = report.frontier;
    match report.physical_mem {
        Some(bytes) => tracing::debug!(
            "Frontier: {} seen, {} completed, {} ready, {} in flight; memory {:.1} MiB",
            frontier.seen,
            frontier.completed,
            frontier.ready,
            frontier.in_flight(),
            bytes as f64 / MIB
        ),
        None => tracing::debug!(
            "Frontier: {} seen, {} completed, {} ready, {} in flight",
            frontier.seen,
            frontier.completed,
            frontier.ready,
            frontier.in_flight()
        ),
    }
}

/// Prints a crawl summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Site-Mirror Crawl Summary ===\n");
    println!("URLs seen:        {}", summary.urls_seen);
    println!("URLs completed:   {}", summary.urls_completed);
    println!("Files saved:      {}", summary.files_saved);
    println!("Bytes saved:      {}", summary.bytes_saved);
    println!("Skipped (binary): {}", summary.skipped);
    println!("Failed fetches:   {}", summary.failed);
    println!("Elapsed:          {:.2?}", summary.elapsed);
}
