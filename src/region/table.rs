use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a region table
#[derive(Debug, Error)]
pub enum RegionTableError {
    #[error("Failed to open region table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read region table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Region table line {line} needs a prefix and a region")]
    MalformedRow { line: u64 },
}

/// Maps two-digit postcode prefixes to region names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTable {
    regions: HashMap<String, String>,
}

impl RegionTable {
    /// Loads a table from a delimited file
    ///
    /// The first line is a header and is discarded. Each following line is
    /// `prefix,region`; a later line for the same prefix replaces an
    /// earlier one.
    pub fn load(path: &Path) -> Result<Self, RegionTableError> {
        let file = File::open(path).map_err(|source| RegionTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        tracing::info!(
            "Loaded {} postcode regions from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Reads a table from any reader holding the delimited text
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RegionTableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut regions = HashMap::new();
        for row in csv_reader.records() {
            let row = row?;
            let (Some(prefix), Some(region)) = (row.get(0), row.get(1)) else {
                return Err(RegionTableError::MalformedRow {
                    line: row.position().map(|p| p.line()).unwrap_or(0),
                });
            };

            if prefix.chars().count() != 2 {
                tracing::warn!("Postcode prefix '{}' is not two characters", prefix);
            }
            regions.insert(prefix.to_string(), region.to_string());
        }

        Ok(Self { regions })
    }

    /// Builds a table from prefix/region pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            regions: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Region for a two-character prefix
    pub fn region_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.regions.get(prefix).map(String::as_str)
    }

    /// Region for a full postcode, looked up by its first two characters
    pub fn region_for_postcode(&self, postcode: &str) -> Option<&str> {
        let prefix: String = postcode.chars().take(2).collect();
        if prefix.chars().count() < 2 {
            return None;
        }
        self.region_for_prefix(&prefix)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
