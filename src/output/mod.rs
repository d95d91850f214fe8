//! Output module for writing mirrored files and reporting progress
//!
//! This module handles:
//! - Mapping URLs to paths under the output directory
//! - Streaming response bodies to disk (optionally tee'd to a second reader)
//! - Periodic frontier status and the final crawl summary

mod path;
pub mod stats;
mod writer;

pub use path::output_path;
pub use stats::{log_status, logging_observer, print_summary, StatusObserver, StatusReport};
pub use writer::{save_stream, SavedBody};
