//! Search query construction and validation
//!
//! A [`SearchQuery`] is the reusable part of a search URL: the endpoint plus
//! its filter parameters. The page number is never part of it; the crawler
//! injects one per results page through [`SearchQuery::page_url`].

use crate::url::domain::{extract_domain, host_matches};
use crate::url::SiteProfile;
use crate::{QueryError, QueryResult};
use ::url::Url;
use std::fmt;

/// Query parameter carrying the results page number
pub const PAGE_PARAM: &str = "page";

/// Query parameter carrying one vehicle model code
pub const MODEL_PARAM: &str = "model";

/// Query parameter carrying the sort directive
pub const SORT_PARAM: &str = "sort";

/// Sort directive ordering results by publish time, newest first
pub const SORT_NEWEST_FIRST: &str = "PUBLISHED_DESC";

/// A validated search endpoint with ordered filter parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Endpoint without query string or fragment
    base: Url,

    /// Filter parameters in the order they were added
    params: Vec<(String, String)>,
}

impl SearchQuery {
    /// Parses and validates a search URL
    ///
    /// The URL must be on the profile's domain and its path must contain the
    /// search endpoint marker. Parameters already present in the URL are kept
    /// in order, except any page number, which is stripped and logged.
    ///
    /// # Examples
    ///
    /// ```
    /// use finn_scraper::url::{SearchQuery, SiteProfile};
    ///
    /// let site = SiteProfile::default();
    /// let mut query = SearchQuery::parse("https://www.finn.no/car/used/search.html?", &site).unwrap();
    /// query.add_models(["1.817.1444"]).add_parameter("sales_form", 1).sort_newest_first();
    /// assert_eq!(
    ///     query.as_url().as_str(),
    ///     "https://www.finn.no/car/used/search.html?model=1.817.1444&sales_form=1&sort=PUBLISHED_DESC"
    /// );
    /// ```
    pub fn parse(raw: &str, site: &SiteProfile) -> QueryResult<Self> {
        let url = Url::parse(raw.trim()).map_err(|e| QueryError::Parse {
            url: raw.to_string(),
            message: e.to_string(),
        })?;

        let on_site = extract_domain(&url)
            .map(|host| host_matches(&site.domain, &host))
            .unwrap_or(false);
        if !on_site {
            return Err(QueryError::WrongDomain {
                url: raw.to_string(),
                domain: site.domain.clone(),
            });
        }

        if !url.path().contains(&site.search_marker) {
            return Err(QueryError::MissingSearchMarker {
                url: raw.to_string(),
                marker: site.search_marker.clone(),
            });
        }

        let mut params = Vec::new();
        for (name, value) in url.query_pairs() {
            if name == PAGE_PARAM {
                tracing::warn!("Removing {}={} from input URL", name, value);
                continue;
            }
            params.push((name.into_owned(), value.into_owned()));
        }

        let mut base = url;
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self { base, params })
    }

    /// Appends one model filter per code, preserving the given order
    pub fn add_models<I, S>(&mut self, models: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for model in models {
            self.params
                .push((MODEL_PARAM.to_string(), model.as_ref().to_string()));
        }
        self
    }

    /// Appends `name=value`, with the value rendered as text
    ///
    /// A page number is refused here too; pages belong to the crawler.
    pub fn add_parameter(&mut self, name: &str, value: impl ToString) -> &mut Self {
        if name == PAGE_PARAM {
            tracing::warn!("Ignoring {} parameter; pages are set per crawl step", name);
            return self;
        }
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    /// Appends the newest-first sort directive
    ///
    /// The site serves at most 50 pages per search, so sorting by publish
    /// time keeps the most recent ads inside that window.
    pub fn sort_newest_first(&mut self) -> &mut Self {
        self.add_parameter(SORT_PARAM, SORT_NEWEST_FIRST)
    }

    /// Returns the filter parameters in order
    pub fn parameters(&self) -> &[(String, String)] {
        &self.params
    }

    /// Returns true if any parameter has the given name
    pub fn has_parameter(&self, name: &str) -> bool {
        self.params.iter().any(|(n, _)| n == name)
    }

    /// Renders the query without a page number
    pub fn as_url(&self) -> Url {
        self.render(None)
    }

    /// Renders the query for one results page
    pub fn page_url(&self, page: u32) -> Url {
        self.render(Some(page))
    }

    fn render(&self, page: Option<u32>) -> Url {
        let mut url = self.base.clone();
        if self.params.is_empty() && page.is_none() {
            return url;
        }

        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.params {
                pairs.append_pair(name, value);
            }
            if let Some(page) = page {
                pairs.append_pair(PAGE_PARAM, &page.to_string());
            }
        }
        url
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_url())
    }
}
