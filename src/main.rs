//! Site-Mirror main entry point
//!
//! This is the command-line interface for the Site-Mirror crawler.

use anyhow::Context;
use clap::Parser;
use site_mirror::config::{load_config_with_hash, validate, Config, FrontierOrder};
use site_mirror::output::print_summary;
use site_mirror::Engine;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Mirror: mirror one website to a local directory
///
/// Site-Mirror crawls every page under a root URL, saves text resources
/// under the output directory and follows the links found in HTML pages.
/// Command-line flags override values from the configuration file.
#[derive(Parser, Debug)]
#[command(name = "site-mirror")]
#[command(version)]
#[command(about = "Mirror a single website to disk", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Root URL to crawl; only URLs under it are fetched
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Output directory
    #[arg(long, value_name = "DIR")]
    out: Option<String>,

    /// Number of concurrent fetch workers
    #[arg(short = 'n', long, value_name = "WORKERS")]
    workers: Option<usize>,

    /// Dispatch the oldest discovered URL first instead of the newest
    #[arg(long)]
    breadth_first: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    let mut engine = Engine::from_config(&config).context("Failed to set up crawl")?;
    engine.start();

    match engine.wait_until_drained().await {
        Ok(summary) => {
            if !cli.quiet {
                print_summary(&summary);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_mirror=info,warn"),
            1 => EnvFilter::new("site_mirror=debug,info"),
            2 => EnvFilter::new("site_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, if any, and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(url) = &cli.url {
        config.crawler.root_url = url.clone();
    }
    if let Some(out) = &cli.out {
        config.output.directory = out.clone();
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if cli.breadth_first {
        config.crawler.order = FrontierOrder::BreadthFirst;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}
