//! HTML parser for search result pages and ad pages
//!
//! This module handles parsing HTML content to extract:
//! - Ad links from a search results page
//! - The individual fields of an ad page, each as an independent lookup

use scraper::{Html, Selector};
use url::Url;

/// Anchors pointing at individual ads on a results page
pub const AD_LINK_SELECTOR: &str = "a.ads__unit__link[href]";

/// Price display on an ad page
pub const PRICE_SELECTOR: &str = "span.u-t3";

/// Address markers; the tag differs between ad templates
pub const ADDRESS_SELECTORS: [&str; 2] = ["span.u-mh16", "p.u-mh16"];

/// Breadcrumb entry holding the brand
pub const BRAND_SELECTOR: &str = r#"a[data-controller="trackCrumbTrailAttribute1"]"#;

/// Breadcrumb entry holding the model
pub const MODEL_SELECTOR: &str = r#"a[data-controller="trackCrumbTrailAttribute2"]"#;

/// Labeled key fact values, in display order
pub const KEY_FACT_SELECTOR: &str = ".media__body .u-strong";

/// Ad anchors found on one results page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageAdLinks {
    /// Anchors carrying the ad link marker, usable href or not
    pub marker_count: usize,

    /// Marker hrefs that resolved to HTTP(S) URLs, in document order
    pub links: Vec<String>,
}

/// Extracts ad links from a search results page
///
/// Every anchor carrying the ad link marker is counted. Its href is
/// resolved against the page URL and kept when it is an HTTP(S) URL.
/// No domain filtering happens here.
///
/// # Example
///
/// ```
/// use finn_scraper::crawler::extract_ad_links;
/// use url::Url;
///
/// let html = r##"
///     <a class="ads__unit__link" href="/car/used/ad.html?finnkode=1">Ad</a>
///     <a class="ads__unit__link" href="#">Placeholder</a>
/// "##;
/// let page = Url::parse("https://www.finn.no/car/used/search.html?page=1").unwrap();
/// let found = extract_ad_links(html, &page);
/// assert_eq!(found.marker_count, 2);
/// assert_eq!(
///     found.links,
///     vec!["https://www.finn.no/car/used/ad.html?finnkode=1".to_string()]
/// );
/// ```
pub fn extract_ad_links(html: &str, page_url: &Url) -> PageAdLinks {
    let document = Html::parse_document(html);
    let mut found = PageAdLinks::default();

    for element in document.select(&selector(AD_LINK_SELECTOR)) {
        found.marker_count += 1;
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_link(href, page_url) {
                found.links.push(absolute_url);
            }
        }
    }

    found
}

/// Parses one of the selector constants above
fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector '{}': {:?}", css, e))
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// A parsed ad page offering one lookup per field
///
/// Each lookup returns `None` when its element is absent, so a missing
/// field never prevents the others from being read.
pub struct AdDocument {
    document: Html,
}

impl AdDocument {
    /// Parses an ad page
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Raw text of the price display
    pub fn price_text(&self) -> Option<String> {
        self.first_text(PRICE_SELECTOR)
    }

    /// Address text, from whichever address marker the template uses
    pub fn address(&self) -> Option<String> {
        ADDRESS_SELECTORS
            .iter()
            .find_map(|css| self.first_text(css))
    }

    /// Brand from the breadcrumb trail
    pub fn brand(&self) -> Option<String> {
        self.first_text(BRAND_SELECTOR)
    }

    /// Model from the breadcrumb trail
    pub fn model(&self) -> Option<String> {
        self.first_text(MODEL_SELECTOR)
    }

    /// Raw key fact values in display order
    pub fn key_fact_values(&self) -> Vec<String> {
        self.document
            .select(&selector(KEY_FACT_SELECTOR))
            .map(|element| element.text().collect::<String>().trim().to_string())
            .collect()
    }

    /// Trimmed text of the first element matching `css`, if non-empty
    fn first_text(&self, css: &str) -> Option<String> {
        self.document
            .select(&selector(css))
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
