//! Site-Mirror: a single-site mirroring crawler
//!
//! This crate crawls one website from a root URL, saves every in-scope text
//! resource under an output directory and follows the links found in HTML
//! pages. A single coordinator owns the frontier while a bounded pool of
//! workers fetches, saves and parses pages.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Site-Mirror operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid root URL '{url}': {source}")]
    InvalidRootUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Crawl was never started")]
    NotStarted,

    #[error("Crawl task panicked: {0}")]
    TaskPanicked(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Site-Mirror operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Engine;
pub use output::StatusReport;
pub use state::{CrawlSummary, FrontierSnapshot, TaskOutcome};
pub use crate::url::should_fetch;
