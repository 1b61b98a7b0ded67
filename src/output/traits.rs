//! Record sink trait and output errors

use crate::crawler::AdRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Price {price} of {url} does not fit in the database")]
    PriceOutOfRange { url: String, price: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for extracted ad records
///
/// A sink may be written to several times; nothing is guaranteed to be
/// durable until [`RecordSink::finalize`] returns.
pub trait RecordSink {
    /// Appends a batch of records
    fn write_records(&mut self, records: &[AdRecord]) -> OutputResult<()>;

    /// Flushes buffered output and closes the run
    fn finalize(&mut self) -> OutputResult<()>;
}
