//! Postcode and region enrichment

use crate::crawler::AdRecord;
use crate::region::table::RegionTable;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A Norwegian postcode is four consecutive digits
const POSTCODE_PATTERN: &str = r"[0-9]{4}";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnrichError {
    #[error("No postcode in address '{address}'")]
    MalformedRecord { address: String },
}

fn postcode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(POSTCODE_PATTERN).expect("postcode pattern must compile"))
}

/// Returns the first run of four digits in an address
///
/// # Examples
///
/// ```
/// use finn_scraper::region::extract_postcode;
///
/// assert_eq!(extract_postcode("Osloveien 1, 0150 Oslo").unwrap(), "0150");
/// assert!(extract_postcode("Ukjent adresse").is_err());
/// ```
pub fn extract_postcode(address: &str) -> Result<String, EnrichError> {
    postcode_pattern()
        .find(address)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| EnrichError::MalformedRecord {
            address: address.to_string(),
        })
}

/// Attaches postcode and region to every record
///
/// Records keep their order. Postcode and region are recomputed from the
/// address each time, so enriching an already enriched batch changes
/// nothing. A record without a usable address ends up with neither.
pub fn enrich(records: Vec<AdRecord>, table: &RegionTable) -> Vec<AdRecord> {
    records
        .into_iter()
        .map(|record| enrich_record(record, table))
        .collect()
}

/// Attaches postcode and region to a single record
pub fn enrich_record(mut record: AdRecord, table: &RegionTable) -> AdRecord {
    record.postcode = None;
    record.region = None;

    let Some(address) = record.address.as_deref() else {
        return record;
    };

    match extract_postcode(address) {
        Ok(postcode) => {
            record.region = table.region_for_postcode(&postcode).map(str::to_string);
            if record.region.is_none() {
                tracing::debug!("No region for postcode {} ({})", postcode, record.url);
            }
            record.postcode = Some(postcode);
        }
        Err(e) => tracing::debug!("{} ({})", e, record.url),
    }

    record
}
