//! Delimited-text records file
//!
//! Every file carries the full column set, even when no record has a value
//! for some column. Absent values are empty cells.

use crate::crawler::AdRecord;
use crate::output::traits::{OutputError, OutputResult, RecordSink};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Column order of the records file
pub const CSV_COLUMNS: [&str; 11] = [
    "URL", "Price", "Address", "Brand", "Model", "Year", "Mileage", "Gearbox", "Fuel",
    "Postcode", "Region",
];

/// Writes ad records to a CSV file
pub struct CsvSink {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows_written: usize,
}

impl CsvSink {
    /// Creates (or truncates) the file at `path` and writes the header
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path).map_err(|source| OutputError::Open {
            path: path.display().to_string(),
            source,
        })?;

        // The header is written by hand so an empty run still has one
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(CSV_COLUMNS)?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            rows_written: 0,
        })
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

impl RecordSink for CsvSink {
    fn write_records(&mut self, records: &[AdRecord]) -> OutputResult<()> {
        for record in records {
            self.writer.serialize(record)?;
        }
        self.rows_written += records.len();
        Ok(())
    }

    fn finalize(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        tracing::info!(
            "Wrote {} records to {}",
            self.rows_written,
            self.path.display()
        );
        Ok(())
    }
}

/// Reads a records file written by [`CsvSink`]
///
/// Empty cells come back as absent values.
pub fn read_records_csv(path: &Path) -> OutputResult<Vec<AdRecord>> {
    let file = File::open(path).map_err(|source| OutputError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let mut reader = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: AdRecord = row?;
        records.push(record);
    }

    Ok(records)
}
