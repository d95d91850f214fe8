//! Crawler module: the crawl engine and the per-URL pipeline
//!
//! This module contains:
//! - HTTP fetching and Content-Type classification
//! - Streaming HTML link extraction
//! - The task pipeline (fetch, save, extract) run by each worker
//! - The coordinator that owns the frontier
//! - The engine that starts the coordinator and the worker pool

mod coordinator;
mod engine;
mod fetcher;
mod parser;
mod task;
mod worker;

pub use coordinator::Coordinator;
pub use engine::Engine;
pub use fetcher::{build_http_client, fetch_url, ContentKind, FetchResult};
pub use parser::{extract_links, extract_links_from_channel, LinkExtractor};
pub use task::Task;
pub use worker::{run_worker, SharedTaskReceiver};
