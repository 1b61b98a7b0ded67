//! URL handling module for finn-scraper
//!
//! This module provides the target site profile, domain matching and the
//! search query builder.

mod domain;
mod query;

use crate::config::SiteConfig;
use ::url::Url;

// Re-export main functions
pub use domain::{extract_domain, host_matches};
pub use query::{SearchQuery, MODEL_PARAM, PAGE_PARAM, SORT_NEWEST_FIRST, SORT_PARAM};

/// The site being scraped: its domain and search endpoint marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    /// Domain every search and ad URL must belong to
    pub domain: String,

    /// Path fragment identifying the search endpoint
    pub search_marker: String,
}

impl SiteProfile {
    /// Creates a profile for an arbitrary domain
    pub fn new(domain: &str, search_marker: &str) -> Self {
        Self {
            domain: domain.to_lowercase(),
            search_marker: search_marker.to_string(),
        }
    }

    /// Returns true if the URL's host belongs to this site
    pub fn owns(&self, url: &Url) -> bool {
        extract_domain(url)
            .map(|host| host_matches(&self.domain, &host))
            .unwrap_or(false)
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::new("finn.no", "search.html")
    }
}

impl From<&SiteConfig> for SiteProfile {
    fn from(config: &SiteConfig) -> Self {
        Self::new(&config.domain, &config.search_marker)
    }
}
