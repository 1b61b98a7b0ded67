//! finn-scraper: a classified-ad harvester for finn.no vehicle listings
//!
//! This crate builds a search query for a set of vehicle models, walks the
//! paginated search results to collect ad links, extracts structured
//! attributes from every ad page and enriches the records with a region
//! derived from a postcode lookup table.

pub mod config;
pub mod crawler;
pub mod output;
pub mod region;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for finn-scraper operations
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid search query: {0}")]
    InvalidQuery(#[from] QueryError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to fetch search page {page}: {source}")]
    PageFetch {
        page: u32,
        #[source]
        source: crawler::FetchError,
    },

    #[error("Ad extraction failed: {0}")]
    Extract(#[from] crawler::ExtractError),

    #[error("Crawl deadline of {seconds}s exceeded")]
    Deadline { seconds: u64 },

    #[error("Region table error: {0}")]
    RegionTable(#[from] region::RegionTableError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

/// Errors raised while building a search query
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Failed to parse URL '{url}': {message}")]
    Parse { url: String, message: String },

    #[error("URL '{url}' is not on the {domain} domain")]
    WrongDomain { url: String, domain: String },

    #[error("URL '{url}' does not contain the search endpoint '{marker}'")]
    MissingSearchMarker { url: String, marker: String },
}

/// Result type alias for finn-scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for query construction
pub type QueryResult<T> = std::result::Result<T, QueryError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{AdRecord, Coordinator};
pub use output::RunReport;
pub use region::{enrich, RegionTable};
pub use state::{CrawlState, StopReason};
pub use url::{SearchQuery, SiteProfile};
