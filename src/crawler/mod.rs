//! Crawler module for search result walking and ad extraction
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing of result pages and ad pages
//! - Paginated link discovery
//! - Overall run coordination

mod coordinator;
mod discovery;
mod extractor;
mod fetcher;
mod parser;
mod record;

pub use coordinator::{build_query, dedup_links, enrich_records_file, Coordinator};
pub use discovery::{effective_depth, AdLinkSet, LinkDiscoveryCrawler, SERVER_MAX_PAGES};
pub use extractor::{clean_fact_value, parse_ad_page, parse_price, AdPageExtractor, ExtractError};
pub use fetcher::{build_http_client, FetchError, Fetcher};
pub use parser::{extract_ad_links, AdDocument, PageAdLinks};
pub use record::{AdRecord, KEY_FACT_LABELS};

use crate::config::Config;
use crate::output::RunReport;
use crate::ScraperError;

/// Runs a complete scrape
///
/// This is the main entry point for a run. It will:
/// 1. Build the search query
/// 2. Walk the result pages for ad links
/// 3. Extract every ad
/// 4. Attach postcode regions
/// 5. Write the records
pub async fn scrape(config: Config, config_hash: &str) -> Result<RunReport, ScraperError> {
    Coordinator::new(config, config_hash)?.run().await
}
