//! Frontier state owned by the crawl coordinator
//!
//! The frontier tracks every URL the crawl has admitted (`seen`), every URL
//! whose task has been reported back (`completed`) and the admitted URLs
//! still waiting for a worker (`ready`). It is a plain single-owner data
//! structure: the coordinator is the only code that ever holds it, so no
//! locking is involved.

use crate::config::FrontierOrder;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Read-only copy of the frontier counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierSnapshot {
    /// URLs ever admitted
    pub seen: usize,
    /// URLs whose task has been reported complete
    pub completed: usize,
    /// URLs admitted but not yet dispatched
    pub ready: usize,
}

impl FrontierSnapshot {
    /// Tasks dispatched to workers but not yet reported
    pub fn in_flight(&self) -> usize {
        self.seen
            .saturating_sub(self.completed)
            .saturating_sub(self.ready)
    }

    /// True when no work is queued or running
    pub fn is_drained(&self) -> bool {
        self.seen == self.completed
    }
}

/// Crawl frontier: seen, completed and ready URLs
#[derive(Debug)]
pub struct Frontier {
    seen: HashSet<String>,
    completed: HashSet<String>,
    ready: VecDeque<Url>,
    order: FrontierOrder,
}

impl Frontier {
    /// Creates an empty frontier dispatching in the given order
    pub fn new(order: FrontierOrder) -> Self {
        Self {
            seen: HashSet::new(),
            completed: HashSet::new(),
            ready: VecDeque::new(),
            order,
        }
    }

    /// Admits a URL unless it was seen before
    ///
    /// Returns true if the URL was new and is now waiting in the ready queue.
    pub fn admit(&mut self, url: Url) -> bool {
        if !self.seen.insert(url.as_str().to_string()) {
            return false;
        }
        self.ready.push_back(url);
        true
    }

    /// Removes and returns the next URL to dispatch
    pub fn take_ready(&mut self) -> Option<Url> {
        match self.order {
            FrontierOrder::DepthFirst => self.ready.pop_back(),
            FrontierOrder::BreadthFirst => self.ready.pop_front(),
        }
    }

    /// Records a reported task
    ///
    /// Returns true when every admitted URL has now completed, i.e. the
    /// crawl is drained.
    pub fn mark_completed(&mut self, url: &Url) -> bool {
        let key = url.as_str();
        if self.seen.contains(key) {
            self.completed.insert(key.to_string());
        } else {
            tracing::warn!("Completion reported for unknown URL {}", key);
        }
        self.is_drained()
    }

    /// True when every admitted URL has completed
    pub fn is_drained(&self) -> bool {
        self.seen.len() == self.completed.len()
    }

    /// Returns true if there is a URL waiting for dispatch
    pub fn has_ready(&self) -> bool {
        !self.ready.is_empty()
    }

    /// Current counters
    pub fn snapshot(&self) -> FrontierSnapshot {
        FrontierSnapshot {
            seen: self.seen.len(),
            completed: self.completed.len(),
            ready: self.ready.len(),
        }
    }

    /// Checks `completed ⊆ seen` and that no ready URL is already completed
    pub fn invariants_hold(&self) -> bool {
        self.completed.is_subset(&self.seen)
            && self
                .ready
                .iter()
                .all(|url| self.seen.contains(url.as_str()) && !self.completed.contains(url.as_str()))
    }
}
