//! Postcode region lookup
//!
//! Loads the prefix-to-region table and attaches postcode and region to
//! extracted ad records.

mod enrich;
mod table;

pub use enrich::{enrich, enrich_record, extract_postcode, EnrichError};
pub use table::{RegionTable, RegionTableError};
