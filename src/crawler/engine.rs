//! Crawl engine: wires the coordinator and the worker pool together

use crate::config::{validate, Config, FrontierOrder, HttpConfig, DEFAULT_STATUS_INTERVAL_MS};
use crate::crawler::coordinator::Coordinator;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::task::Task;
use crate::crawler::worker::run_worker;
use crate::output::{logging_observer, StatusObserver, StatusReport};
use crate::state::CrawlSummary;
use crate::{ConfigError, CrawlError, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use url::Url;

/// Fetch channel capacity: at most one task waits ahead of the workers
const FETCH_CAPACITY: usize = 1;

/// Report channel capacity
const REPORT_CAPACITY: usize = 1;

/// Handles of a started crawl
struct Running {
    coordinator: JoinHandle<CrawlSummary>,
    workers: JoinSet<Result<()>>,
}

/// A single-site crawl
///
/// Build it with [`Engine::new`] or [`Engine::from_config`], call
/// [`Engine::start`] from within a tokio runtime and await
/// [`Engine::wait_until_drained`].
///
/// # Example
///
/// ```no_run
/// use site_mirror::Engine;
///
/// # async fn run() -> site_mirror::Result<()> {
/// let mut engine = Engine::new("https://example.com/pkg/", "/tmp/crawl", 16)?;
/// engine.start();
/// let summary = engine.wait_until_drained().await?;
/// println!("{} files saved", summary.files_saved);
/// # Ok(())
/// # }
/// ```
pub struct Engine {
    root: Url,
    out_dir: PathBuf,
    workers: usize,
    order: FrontierOrder,
    status_interval: Duration,
    observer: StatusObserver,
    client: Client,
    started: bool,
    running: Option<Running>,
}

impl Engine {
    /// Creates an engine with default HTTP settings and depth-first order
    ///
    /// Fails if `root` is not an absolute URL or `workers` is zero.
    pub fn new(root: &str, out_dir: impl Into<PathBuf>, workers: usize) -> Result<Self> {
        let root = parse_root(root)?;
        if workers == 0 {
            return Err(ConfigError::Validation("workers must be at least 1".to_string()).into());
        }

        Ok(Self {
            root,
            out_dir: out_dir.into(),
            workers,
            order: FrontierOrder::default(),
            status_interval: Duration::from_millis(DEFAULT_STATUS_INTERVAL_MS),
            observer: logging_observer(),
            client: build_http_client(&HttpConfig::default())?,
            started: false,
            running: None,
        })
    }

    /// Creates an engine from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        validate(config)?;

        Ok(Self {
            root: parse_root(&config.crawler.root_url)?,
            out_dir: PathBuf::from(&config.output.directory),
            workers: config.crawler.workers,
            order: config.crawler.order,
            status_interval: Duration::from_millis(config.crawler.status_interval_ms),
            observer: logging_observer(),
            client: build_http_client(&config.http)?,
            started: false,
            running: None,
        })
    }

    /// Replaces the status observer fed with periodic status reports
    pub fn with_status_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(StatusReport) + Send + Sync + 'static,
    {
        self.observer = Arc::new(observer);
        self
    }

    /// Root URL of the crawl
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Spawns the coordinator and the workers onto the current runtime
    ///
    /// Returns immediately. Calling it again is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(&mut self) {
        if self.started {
            tracing::warn!("Crawl of {} already started", self.root);
            return;
        }
        self.started = true;

        tracing::info!(
            "Mirroring {} into {} with {} workers",
            self.root,
            self.out_dir.display(),
            self.workers
        );

        let (fetch_tx, fetch_rx) = mpsc::channel::<Task>(FETCH_CAPACITY);
        let (report_tx, report_rx) = mpsc::channel::<Task>(REPORT_CAPACITY);
        let fetch_rx = Arc::new(Mutex::new(fetch_rx));

        let mut workers = JoinSet::new();
        for id in 0..self.workers {
            workers.spawn(run_worker(
                id,
                self.client.clone(),
                fetch_rx.clone(),
                report_tx.clone(),
            ));
        }
        // Workers hold the only report senders from here on.
        drop(report_tx);

        let coordinator = Coordinator::new(
            self.root.clone(),
            self.out_dir.clone(),
            self.order,
            self.observer.clone(),
            self.status_interval,
        );
        let coordinator = tokio::spawn(coordinator.run(fetch_tx, report_rx));

        self.running = Some(Running {
            coordinator,
            workers,
        });
    }

    /// Waits until the crawl is drained and returns its summary
    ///
    /// If a worker fails to write an output file, every remaining task is
    /// aborted and that error is returned.
    pub async fn wait_until_drained(&mut self) -> Result<CrawlSummary> {
        let Running {
            coordinator,
            mut workers,
        } = self.running.take().ok_or(CrawlError::NotStarted)?;

        while let Some(joined) = workers.join_next().await {
            let failure = match joined {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(e) => CrawlError::TaskPanicked(e.to_string()),
            };

            tracing::error!("Stopping crawl: {}", failure);
            workers.abort_all();
            coordinator.abort();
            return Err(failure);
        }

        coordinator
            .await
            .map_err(|e| CrawlError::TaskPanicked(e.to_string()))
    }
}

fn parse_root(root: &str) -> Result<Url> {
    Url::parse(root).map_err(|source| CrawlError::InvalidRootUrl {
        url: root.to_string(),
        source,
    })
}
