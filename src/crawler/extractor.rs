//! Ad page extraction
//!
//! Turns one ad page into an [`AdRecord`]. Only the price is required;
//! every other field falls back to "absent" on its own.

use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::parser::AdDocument;
use crate::crawler::record::{AdRecord, KEY_FACT_LABELS};
use thiserror::Error;

/// Errors that fail a single ad
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Required field '{field}' missing on {url}")]
    RequiredFieldMissing { url: String, field: &'static str },

    #[error("Unreadable price '{raw}' on {url}")]
    InvalidPrice { url: String, raw: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ExtractError {
    /// The ad URL that failed
    pub fn url(&self) -> &str {
        match self {
            Self::RequiredFieldMissing { url, .. } | Self::InvalidPrice { url, .. } => url,
            Self::Fetch(e) => e.url(),
        }
    }
}

/// Fetches ad pages and extracts their records
#[derive(Debug, Clone)]
pub struct AdPageExtractor {
    fetcher: Fetcher,
}

impl AdPageExtractor {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Fetches one ad page and extracts its record
    pub async fn extract(&self, ad_url: &str) -> Result<AdRecord, ExtractError> {
        tracing::debug!("Fetching ad page {}", ad_url);
        let html = self.fetcher.fetch_html(ad_url).await?;
        parse_ad_page(&html, ad_url)
    }
}

/// Extracts a record from ad page HTML
///
/// Fails only when the price is missing or unreadable; a listing without a
/// price has been removed or is malformed.
pub fn parse_ad_page(html: &str, ad_url: &str) -> Result<AdRecord, ExtractError> {
    let document = AdDocument::parse(html);

    let raw_price = document
        .price_text()
        .ok_or_else(|| ExtractError::RequiredFieldMissing {
            url: ad_url.to_string(),
            field: "price",
        })?;
    let price = parse_price(&raw_price).ok_or_else(|| ExtractError::InvalidPrice {
        url: ad_url.to_string(),
        raw: raw_price.clone(),
    })?;

    let mut record = AdRecord::new(ad_url, price);
    record.address = document.address();
    record.brand = document.brand();
    record.model = document.model();

    // Facts are positional; a page listing fewer values leaves the rest absent
    for (label, raw) in KEY_FACT_LABELS.iter().zip(document.key_fact_values()) {
        let value = clean_fact_value(&raw);
        if !value.is_empty() {
            record.set_key_fact(label, value);
        }
    }

    if record.address.is_none() {
        tracing::debug!("No address on {}", ad_url);
    }

    Ok(record)
}

/// Parses a displayed price such as `"350 000 kr"` into whole units
///
/// Thousands separators (plain, non-breaking or narrow spaces), the `kr`
/// suffix and a trailing `,-` are removed.
///
/// # Examples
///
/// ```
/// use finn_scraper::crawler::parse_price;
///
/// assert_eq!(parse_price("350 000 kr"), Some(350000));
/// assert_eq!(parse_price("89\u{a0}900 kr"), Some(89900));
/// assert_eq!(parse_price("Solgt"), None);
/// ```
pub fn parse_price(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix("kr").unwrap_or(trimmed).trim_end();
    let trimmed = trimmed.strip_suffix(",-").unwrap_or(trimmed);

    let digits: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

/// Cleans a key fact value
///
/// A trailing `km` unit is dropped, and whitespace is removed only when
/// what remains is a plain number, so `"150 000 km"` becomes `"150000"`
/// while `"Plug-in hybrid"` keeps its space.
pub fn clean_fact_value(raw: &str) -> String {
    let value = raw.trim();
    let value = value.strip_suffix("km").map(str::trim_end).unwrap_or(value);

    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if !compact.is_empty() && compact.chars().all(|c| c.is_ascii_digit()) {
        compact
    } else {
        value.to_string()
    }
}
