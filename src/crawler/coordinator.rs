//! Crawl coordinator
//!
//! The coordinator is the only owner of the [`Frontier`]. It runs as a
//! single tokio task and talks to the workers exclusively through two
//! bounded channels:
//! - the fetch channel, on which it dispatches [`Task`]s
//! - the report channel, on which workers return executed tasks
//!
//! It also feeds a [`StatusObserver`] on a fixed interval. When every
//! admitted URL has been reported it drops both channel ends it holds,
//! which is what tells the workers to exit.

use crate::config::FrontierOrder;
use crate::crawler::task::Task;
use crate::output::{StatusObserver, StatusReport};
use crate::state::{CrawlSummary, Frontier};
use crate::url::should_fetch;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use url::Url;

/// Frontier owner and task dispatcher
pub struct Coordinator {
    root: Url,
    out_dir: Arc<PathBuf>,
    frontier: Frontier,
    summary: CrawlSummary,
    observer: StatusObserver,
    status_interval: Duration,
}

impl Coordinator {
    /// Creates a coordinator for a crawl rooted at `root`
    pub fn new(
        root: Url,
        out_dir: PathBuf,
        order: FrontierOrder,
        observer: StatusObserver,
        status_interval: Duration,
    ) -> Self {
        Self {
            root,
            out_dir: Arc::new(out_dir),
            frontier: Frontier::new(order),
            summary: CrawlSummary::default(),
            observer,
            status_interval,
        }
    }

    /// Runs until the crawl is drained or every worker has gone away
    ///
    /// Consumes the fetch sender and the report receiver; both are dropped
    /// on return.
    pub async fn run(
        mut self,
        fetch_tx: mpsc::Sender<Task>,
        mut reports: mpsc::Receiver<Task>,
    ) -> CrawlSummary {
        let started = Instant::now();
        tracing::info!("Starting crawl at {}", self.root);
        self.frontier.admit(self.root.clone());

        let mut ticker = tokio::time::interval(self.status_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                permit = fetch_tx.reserve(), if self.frontier.has_ready() => {
                    let permit = match permit {
                        Ok(permit) => permit,
                        Err(_) => {
                            tracing::warn!("All workers exited before the crawl drained");
                            break;
                        }
                    };
                    if let Some(url) = self.frontier.take_ready() {
                        tracing::trace!("Dispatching {}", url);
                        permit.send(Task::new(url, self.out_dir.clone()));
                    }
                }
                report = reports.recv() => {
                    match report {
                        Some(task) => {
                            if self.on_report(task) {
                                tracing::info!("Frontier drained");
                                break;
                            }
                        }
                        None => {
                            tracing::warn!("Report channel closed before the crawl drained");
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    (self.observer)(StatusReport::capture(self.frontier.snapshot()));
                }
            }
        }

        drop(fetch_tx);
        drop(reports);

        let snapshot = self.frontier.snapshot();
        (self.observer)(StatusReport::capture(snapshot));

        self.summary.set_frontier(snapshot);
        self.summary.elapsed = started.elapsed();
        tracing::info!(
            "Crawl finished: {} URLs, {} saved, {} skipped, {} failed in {:.2?}",
            self.summary.urls_completed,
            self.summary.files_saved,
            self.summary.skipped,
            self.summary.failed,
            self.summary.elapsed
        );
        self.summary
    }

    /// Absorbs one executed task
    ///
    /// In-scope links are admitted before the task's own URL is marked
    /// complete, so the drain check never fires while new work is pending.
    /// Returns true when the crawl is drained.
    fn on_report(&mut self, task: Task) -> bool {
        let admitted = self.admit_links(task.links());
        tracing::debug!(
            "Completed {} ({}), {} new links",
            task.url(),
            task.outcome(),
            admitted
        );

        self.summary.record(task.outcome());
        let drained = self.frontier.mark_completed(task.url());
        debug_assert!(self.frontier.invariants_hold());
        drained
    }

    /// Admits every in-scope link not seen before; returns how many were new
    fn admit_links(&mut self, links: &[Url]) -> usize {
        let mut admitted = 0;
        for link in links {
            if should_fetch(link, &self.root) && self.frontier.admit(link.clone()) {
                admitted += 1;
            }
        }
        admitted
    }
}
