//! SQLite-backed record sink
//!
//! Each run gets a row in `runs`; its ads are stored in `ads` keyed by run
//! and URL, so re-running never overwrites an earlier run's rows.

use crate::crawler::AdRecord;
use crate::output::traits::{OutputError, OutputResult, RecordSink};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQL schema for the records database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    ad_count INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS ads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    price INTEGER NOT NULL,
    address TEXT,
    brand TEXT,
    model TEXT,
    year TEXT,
    mileage TEXT,
    gearbox TEXT,
    fuel TEXT,
    postcode TEXT,
    region TEXT,
    UNIQUE(run_id, url)
);

CREATE INDEX IF NOT EXISTS idx_ads_run ON ads(run_id);
CREATE INDEX IF NOT EXISTS idx_ads_region ON ads(region);
"#;

/// Stores records of one run in SQLite
pub struct SqliteSink {
    conn: Connection,
    run_id: i64,
    ad_count: u64,
}

impl SqliteSink {
    /// Opens (or creates) the database and starts a new run
    pub fn open(path: &Path, config_hash: &str) -> OutputResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        Self::start_run(conn, config_hash)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory(config_hash: &str) -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::start_run(conn, config_hash)
    }

    fn start_run(conn: Connection, config_hash: &str) -> OutputResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO runs (started_at, config_hash) VALUES (?1, ?2)",
            params![now, config_hash],
        )?;
        let run_id = conn.last_insert_rowid();
        tracing::debug!("Started database run {}", run_id);

        Ok(Self {
            conn,
            run_id,
            ad_count: 0,
        })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }
}

impl RecordSink for SqliteSink {
    fn write_records(&mut self, records: &[AdRecord]) -> OutputResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO ads
                 (run_id, url, price, address, brand, model, year, mileage, gearbox, fuel, postcode, region)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;

            for record in records {
                let price =
                    i64::try_from(record.price).map_err(|_| OutputError::PriceOutOfRange {
                        url: record.url.clone(),
                        price: record.price,
                    })?;

                stmt.execute(params![
                    self.run_id,
                    record.url,
                    price,
                    record.address,
                    record.brand,
                    record.model,
                    record.year,
                    record.mileage,
                    record.gearbox,
                    record.fuel,
                    record.postcode,
                    record.region,
                ])?;
            }
        }
        tx.commit()?;

        self.ad_count += records.len() as u64;
        Ok(())
    }

    fn finalize(&mut self) -> OutputResult<()> {
        let now = Utc::now().to_rfc3339();
        let ad_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM ads WHERE run_id = ?1",
            params![self.run_id],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "UPDATE runs SET finished_at = ?1, ad_count = ?2 WHERE id = ?3",
            params![now, ad_count, self.run_id],
        )?;
        tracing::info!(
            "Stored {} ads in database run {} ({} rows written)",
            ad_count,
            self.run_id,
            self.ad_count
        );
        Ok(())
    }
}
