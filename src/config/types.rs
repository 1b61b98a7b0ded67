use serde::Deserialize;
use std::fmt;

/// Main configuration structure for finn-scraper
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

/// Target site identification
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Domain every search and ad URL must belong to
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Path marker identifying the search endpoint
    #[serde(rename = "search-marker", default = "default_search_marker")]
    pub search_marker: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            search_marker: default_search_marker(),
        }
    }
}

/// Search query configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint URL, optionally carrying a query string
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Vehicle model filter codes, in the order they are appended
    #[serde(default)]
    pub models: Vec<String>,

    /// Additional named filters appended after the models
    #[serde(rename = "parameter", default)]
    pub parameters: Vec<QueryParameter>,

    /// Append the newest-first sort directive
    #[serde(rename = "sort-newest-first", default = "default_true")]
    pub sort_newest_first: bool,

    /// Maximum number of search pages to walk
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,
}

/// A single named filter parameter
#[derive(Debug, Clone, Deserialize)]
pub struct QueryParameter {
    pub name: String,
    pub value: ParameterValue,
}

/// A filter value as written in TOML; always sent as text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Integer(i64),
    Boolean(bool),
    Text(String),
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// HTTP behaviour and failure policy
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for 5xx responses and timeouts
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause between retries (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Pause between consecutive search pages (milliseconds)
    #[serde(rename = "delay-ms", default)]
    pub delay_ms: u64,

    /// Number of ad pages fetched at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Deadline for the whole link discovery crawl (seconds)
    #[serde(rename = "crawl-deadline-secs", default)]
    pub crawl_deadline_secs: Option<u64>,

    /// What to do when a single ad cannot be extracted
    #[serde(rename = "on-ad-error", default)]
    pub on_ad_error: FailurePolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            delay_ms: 0,
            concurrency: default_concurrency(),
            crawl_deadline_secs: None,
            on_ad_error: FailurePolicy::default(),
        }
    }
}

/// Policy applied when one ad in a batch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and continue with the remaining ads
    #[default]
    Skip,
    /// Abort the whole run on the first failure
    Abort,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the delimited ad records file
    #[serde(rename = "records-path")]
    pub records_path: String,

    /// Path to the postcode prefix to region table
    #[serde(rename = "postcodes-path")]
    pub postcodes_path: String,

    /// Optional SQLite database receiving the same records
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,
}

fn default_domain() -> String {
    "finn.no".to_string()
}

fn default_search_marker() -> String {
    "search.html".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> u32 {
    50
}

fn default_user_agent() -> String {
    format!("finn-scraper/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    5000
}

fn default_concurrency() -> usize {
    4
}
