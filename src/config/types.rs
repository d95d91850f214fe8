use serde::Deserialize;

/// Default root URL when neither the config file nor the CLI provides one
pub const DEFAULT_ROOT_URL: &str = "https://golang.org/pkg/";

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "/tmp/crawl";

/// Default number of download workers
pub const DEFAULT_WORKERS: usize = 16;

/// Default interval between frontier status reports (milliseconds)
pub const DEFAULT_STATUS_INTERVAL_MS: u64 = 500;

/// Main configuration structure for Site-Mirror
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from; also defines the crawl scope
    #[serde(rename = "root-url", default = "default_root_url")]
    pub root_url: String,

    /// Number of concurrent download workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Order in which ready URLs are dispatched
    #[serde(default)]
    pub order: FrontierOrder,

    /// Interval between frontier status reports (milliseconds)
    #[serde(rename = "status-interval-ms", default = "default_status_interval")]
    pub status_interval_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            workers: DEFAULT_WORKERS,
            order: FrontierOrder::default(),
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
        }
    }
}

/// Dispatch order of the ready queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrontierOrder {
    /// Most recently discovered URL first (stack)
    #[default]
    DepthFirst,
    /// Oldest discovered URL first (queue)
    BreadthFirst,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the mirrored files are written under
    #[serde(default = "default_output_dir")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds; no timeout when absent
    #[serde(rename = "timeout-secs", default)]
    pub timeout_secs: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

fn default_root_url() -> String {
    DEFAULT_ROOT_URL.to_string()
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_status_interval() -> u64 {
    DEFAULT_STATUS_INTERVAL_MS
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
