//! Paginated ad link discovery
//!
//! Walks search result pages one at a time. Each page must be inspected
//! before deciding whether the next one is requested, so pages are never
//! fetched in parallel.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::extract_ad_links;
use crate::state::{CrawlState, StopReason};
use crate::url::{SearchQuery, SiteProfile};
use crate::ScraperError;
use std::time::Duration;
use url::Url;

/// Pages the site serves per search at most
pub const SERVER_MAX_PAGES: u32 = 50;

/// Ad links found by one crawl, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdLinkSet {
    /// Ad URLs on the target domain; duplicates are kept
    pub links: Vec<String>,

    /// Number of result pages requested
    pub pages_fetched: u32,

    /// Why the crawl stopped
    pub stop_reason: StopReason,
}

impl AdLinkSet {
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Collects ad links from paginated search results
#[derive(Debug, Clone)]
pub struct LinkDiscoveryCrawler {
    fetcher: Fetcher,
    site: SiteProfile,
    page_delay: Duration,
}

impl LinkDiscoveryCrawler {
    pub fn new(fetcher: Fetcher, site: SiteProfile) -> Self {
        Self {
            fetcher,
            site,
            page_delay: Duration::ZERO,
        }
    }

    /// Pause between consecutive result pages
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Walks result pages starting at page 1
    ///
    /// Stops when a page carries at most one ad anchor (that page's link is
    /// discarded) or after page `max_depth`. `max_depth` above
    /// [`SERVER_MAX_PAGES`] is clamped; zero is rejected before any request.
    /// A failed page fetch ends the crawl with [`ScraperError::PageFetch`].
    pub async fn discover(
        &self,
        query: &SearchQuery,
        max_depth: u32,
    ) -> Result<AdLinkSet, ScraperError> {
        let max_depth = effective_depth(max_depth)?;

        let mut links: Vec<String> = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        let mut pages_fetched = 0;
        let mut state = CrawlState::start();

        let stop_reason = loop {
            if let Some(reason) = state.stop_reason() {
                break reason;
            }

            state = match state {
                CrawlState::Fetching { page } => {
                    if page > 1 && !self.page_delay.is_zero() {
                        tokio::time::sleep(self.page_delay).await;
                    }

                    let page_url = query.page_url(page);
                    tracing::info!("Searching for ads on page {}", page);

                    let html = self
                        .fetcher
                        .fetch_html(page_url.as_str())
                        .await
                        .map_err(|source| ScraperError::PageFetch { page, source })?;
                    pages_fetched += 1;

                    let found = extract_ad_links(&html, &page_url);
                    tracing::debug!(
                        "Page {} has {} ad anchors, {} usable links",
                        page,
                        found.marker_count,
                        found.links.len()
                    );

                    // Exhaustion is judged on marker anchors, not on resolved hrefs
                    let next = state.on_page_fetched(found.marker_count);
                    if matches!(next, CrawlState::Accumulating { .. }) {
                        pending = found.links;
                    }
                    next
                }
                CrawlState::Accumulating { .. } => {
                    links.append(&mut pending);
                    state.on_links_stored(max_depth)
                }
                CrawlState::Done(_) => state,
            };
            if state.is_terminal() {
                tracing::debug!("Crawl {}", state);
            }
        };

        match stop_reason {
            StopReason::Exhausted { page } => tracing::info!(
                "Reached end of ads on page {}. {} ads found.",
                page,
                links.len()
            ),
            StopReason::DepthReached { max_depth } => tracing::info!(
                "Reached max depth of {} pages. {} ads found.",
                max_depth,
                links.len()
            ),
        }

        let before = links.len();
        links.retain(|link| self.is_site_link(link));
        if links.len() < before {
            tracing::debug!(
                "Dropped {} links outside {}",
                before - links.len(),
                self.site.domain
            );
        }

        Ok(AdLinkSet {
            links,
            pages_fetched,
            stop_reason,
        })
    }

    fn is_site_link(&self, link: &str) -> bool {
        Url::parse(link)
            .map(|url| self.site.owns(&url))
            .unwrap_or(false)
    }
}

/// Validates a requested depth and clamps it to the server cap
pub fn effective_depth(max_depth: u32) -> Result<u32, ScraperError> {
    if max_depth < 1 {
        return Err(ScraperError::InvalidArgument(format!(
            "max_depth must be at least 1, got {}",
            max_depth
        )));
    }

    if max_depth > SERVER_MAX_PAGES {
        tracing::warn!(
            "max_depth {} exceeds the server limit; using {}",
            max_depth,
            SERVER_MAX_PAGES
        );
        return Ok(SERVER_MAX_PAGES);
    }

    Ok(max_depth)
}
