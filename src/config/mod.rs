//! Configuration module for Site-Mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, and the command line may override the crawl root,
//! output directory, worker count and frontier order after loading.
//!
//! # Example
//!
//! ```no_run
//! use site_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Mirroring {} into {}", config.crawler.root_url, config.output.directory);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, CrawlerConfig, FrontierOrder, HttpConfig, OutputConfig, DEFAULT_OUTPUT_DIR,
    DEFAULT_ROOT_URL, DEFAULT_STATUS_INTERVAL_MS, DEFAULT_WORKERS,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
