use serde::Deserialize;

/// Main configuration structure for dredge
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URLs to start crawling from
    pub seeds: Vec<String>,

    /// Maximum link depth from the seeds (seeds are depth 0); unset = unbounded
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Maximum number of pages to fetch; unset = unbounded
    #[serde(rename = "max-crawled")]
    pub max_crawled: Option<u64>,

    /// Maximum number of items to scrape; unset = unbounded
    #[serde(rename = "max-scraped")]
    pub max_scraped: Option<u64>,

    /// Maximum run duration in seconds; unset = unbounded
    #[serde(rename = "max-time-secs")]
    pub max_time_secs: Option<u64>,

    /// Only follow links whose host matches a seed host
    #[serde(rename = "same-site-only", default = "default_same_site")]
    pub same_site_only: bool,

    /// Number of concurrent crawl workers
    #[serde(rename = "worker-count", default = "default_worker_count")]
    pub worker_count: u32,

    /// URL patterns a discovered link must match to be followed ("*" wildcards)
    #[serde(default)]
    pub include: Vec<String>,

    /// URL patterns that disqualify a discovered link ("*" wildcards)
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total number of attempts per URL (first try included)
    #[serde(rename = "retry-count", default = "default_retry_count")]
    pub retry_count: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Status codes that trigger a retry
    #[serde(rename = "retry-on", default = "default_retry_on")]
    pub retry_on: Vec<u16>,

    /// Pick a random browser user-agent per attempt
    #[serde(rename = "randomize-user-agent", default = "default_randomize_user_agent")]
    pub randomize_user_agent: bool,

    /// Fixed user-agent string; overrides randomization when set
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Optional path for scraped items as JSON lines
    #[serde(rename = "items-path")]
    pub items_path: Option<String>,
}

/// Status codes worth retrying: rate limiting and transient server errors.
pub const DEFAULT_RETRY_ON: &[u16] = &[429, 500, 502, 503, 504];

fn default_same_site() -> bool {
    true
}

fn default_worker_count() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_retry_on() -> Vec<u16> {
    DEFAULT_RETRY_ON.to_vec()
}

fn default_randomize_user_agent() -> bool {
    true
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_on: default_retry_on(),
            randomize_user_agent: default_randomize_user_agent(),
            user_agent: None,
        }
    }
}

impl Config {
    /// A minimal config for the given seeds, defaults everywhere else.
    pub fn with_seeds(seeds: Vec<String>) -> Self {
        Self {
            crawler: CrawlerConfig {
                seeds,
                max_depth: None,
                max_crawled: None,
                max_scraped: None,
                max_time_secs: None,
                same_site_only: true,
                worker_count: default_worker_count(),
                include: Vec::new(),
                exclude: Vec::new(),
            },
            fetch: FetchConfig::default(),
            output: OutputConfig::default(),
        }
    }
}
