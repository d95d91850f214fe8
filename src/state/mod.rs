//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Frontier`: seen/completed/ready URL sets owned by the coordinator
//! - `FrontierSnapshot`: read-only counters handed to status observers
//! - `TaskOutcome`: what happened to a single dispatched URL
//! - `CrawlSummary`: totals returned when the crawl drains

mod frontier;
mod outcome;
mod summary;

pub use frontier::{Frontier, FrontierSnapshot};
pub use outcome::TaskOutcome;
pub use summary::CrawlSummary;
