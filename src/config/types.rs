use serde::Deserialize;

/// Main configuration structure for Scopecrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub scope: ScopeConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    /// Seed URLs the frontier starts from
    #[serde(default)]
    pub seeds: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent fetch workers
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Minimum time between requests to the same host (milliseconds)
    #[serde(rename = "politeness-delay-ms", default = "default_politeness_delay")]
    pub politeness_delay_ms: u64,

    /// Visits to one URL pattern before it is flagged as a crawl trap
    #[serde(rename = "trap-threshold", default = "default_trap_threshold")]
    pub trap_threshold: u32,

    /// Minimum extracted word count for a page to carry enough information
    #[serde(rename = "min-word-count", default = "default_min_word_count")]
    pub min_word_count: usize,

    /// Starting backoff delay after a fetch-layer infrastructure error (milliseconds)
    #[serde(rename = "backoff-floor-ms", default = "default_backoff_floor")]
    pub backoff_floor_ms: u64,

    /// Upper bound on the backoff delay (milliseconds)
    #[serde(rename = "backoff-cap-ms", default = "default_backoff_cap")]
    pub backoff_cap_ms: u64,

    /// Request timeout for the HTTP fetch layer (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

/// Crawl scope configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeConfig {
    /// Host patterns the crawl is allowed to touch ("example.com" or "*.example.com")
    #[serde(rename = "allowed-domains")]
    pub allowed_domains: Vec<String>,

    /// Path extensions that mark non-text resources (images, archives, media)
    #[serde(rename = "excluded-extensions", default = "default_excluded_extensions")]
    pub excluded_extensions: Vec<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite frontier database file
    #[serde(rename = "frontier-path")]
    pub frontier_path: String,

    /// Path to the markdown crawl report
    #[serde(rename = "report-path")]
    pub report_path: String,
}

fn default_workers() -> u32 {
    8
}

fn default_politeness_delay() -> u64 {
    500
}

fn default_trap_threshold() -> u32 {
    10
}

fn default_min_word_count() -> usize {
    100
}

fn default_backoff_floor() -> u64 {
    1_000
}

fn default_backoff_cap() -> u64 {
    60_000
}

fn default_fetch_timeout() -> u64 {
    30
}

/// Extensions that mark resources with no crawlable text content
fn default_excluded_extensions() -> Vec<String> {
    [
        ".css", ".js", ".bmp", ".gif", ".jpe", ".jpeg", ".jpg", ".ico", ".png", ".tif", ".tiff",
        ".pdf", ".mp3", ".mp4", ".avi", ".mov", ".mpeg", ".tar", ".gz", ".zip", ".rar", ".swf",
        ".flv", ".wma", ".wmv",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
