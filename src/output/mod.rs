//! Output module for persisting records and reporting on runs
//!
//! This module handles:
//! - Writing ad records to the CSV records file
//! - Optionally storing them in a SQLite database
//! - Summarizing a run for the command line

mod csv_output;
mod sqlite_output;
pub mod stats;
mod traits;

pub use csv_output::{read_records_csv, CsvSink, CSV_COLUMNS};
pub use sqlite_output::{SqliteSink, SCHEMA_SQL};
pub use stats::{print_report, RunReport};
pub use traits::{OutputError, OutputResult, RecordSink};
