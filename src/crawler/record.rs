//! The ad record produced for every extracted ad
//!
//! Optional attributes are `Option`s rather than sentinel strings; the
//! tabular output renders an absent value as an empty cell.

use serde::{Deserialize, Serialize};

/// Labels of the key facts, in the order the ad page lists them
pub const KEY_FACT_LABELS: [&str; 4] = ["Year", "Mileage", "Gearbox", "Fuel"];

/// One row of output per ad
///
/// The serde names double as the canonical column set of the records file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRecord {
    /// Source URL; unique within a run
    #[serde(rename = "URL")]
    pub url: String,

    /// Asking price in whole currency units
    #[serde(rename = "Price")]
    pub price: u64,

    #[serde(rename = "Address")]
    pub address: Option<String>,

    #[serde(rename = "Brand")]
    pub brand: Option<String>,

    #[serde(rename = "Model")]
    pub model: Option<String>,

    #[serde(rename = "Year")]
    pub year: Option<String>,

    #[serde(rename = "Mileage")]
    pub mileage: Option<String>,

    #[serde(rename = "Gearbox")]
    pub gearbox: Option<String>,

    #[serde(rename = "Fuel")]
    pub fuel: Option<String>,

    /// Four-digit postcode found in the address, set by enrichment
    #[serde(rename = "Postcode")]
    pub postcode: Option<String>,

    /// Region looked up from the postcode prefix, set by enrichment
    #[serde(rename = "Region")]
    pub region: Option<String>,
}

impl AdRecord {
    /// Creates a record with only the required fields set
    pub fn new(url: impl Into<String>, price: u64) -> Self {
        Self {
            url: url.into(),
            price,
            address: None,
            brand: None,
            model: None,
            year: None,
            mileage: None,
            gearbox: None,
            fuel: None,
            postcode: None,
            region: None,
        }
    }

    /// Sets a key fact by its label; unknown labels are ignored
    pub fn set_key_fact(&mut self, label: &str, value: String) {
        match label {
            "Year" => self.year = Some(value),
            "Mileage" => self.mileage = Some(value),
            "Gearbox" => self.gearbox = Some(value),
            "Fuel" => self.fuel = Some(value),
            _ => {}
        }
    }

    /// Returns the key facts that were found, keyed by label
    pub fn key_facts(&self) -> Vec<(&'static str, &str)> {
        [
            (KEY_FACT_LABELS[0], &self.year),
            (KEY_FACT_LABELS[1], &self.mileage),
            (KEY_FACT_LABELS[2], &self.gearbox),
            (KEY_FACT_LABELS[3], &self.fuel),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }

    /// Returns true when a region has been attached
    pub fn has_region(&self) -> bool {
        self.region.is_some()
    }
}
