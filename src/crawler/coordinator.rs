//! Crawler coordinator - end-to-end scrape orchestration
//!
//! This module wires the stages of a run together:
//! - Building the search query from configuration
//! - Walking the result pages for ad links
//! - Extracting every ad with bounded parallelism
//! - Enriching records with regions and writing them out

use crate::config::{Config, FailurePolicy, OutputConfig, SearchConfig};
use crate::crawler::discovery::{effective_depth, AdLinkSet, LinkDiscoveryCrawler};
use crate::crawler::extractor::AdPageExtractor;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::record::AdRecord;
use crate::output::{read_records_csv, CsvSink, RecordSink, RunReport, SqliteSink};
use crate::region::{enrich, RegionTable};
use crate::url::{SearchQuery, SiteProfile};
use crate::{QueryResult, ScraperError};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

/// Ads between progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// Main scrape coordinator
pub struct Coordinator {
    config: Config,
    site: SiteProfile,
    fetcher: Fetcher,
    config_hash: String,
}

impl Coordinator {
    /// Creates a coordinator for a validated configuration
    ///
    /// `config_hash` identifies the configuration in the database, when one
    /// is configured.
    pub fn new(config: Config, config_hash: impl Into<String>) -> Result<Self, ScraperError> {
        let fetcher = Fetcher::new(&config.fetch)?;
        let site = SiteProfile::from(&config.site);

        Ok(Self {
            config,
            site,
            fetcher,
            config_hash: config_hash.into(),
        })
    }

    /// Runs the whole pipeline and reports on it
    pub async fn run(&self) -> Result<RunReport, ScraperError> {
        let started = Instant::now();

        let query = build_query(&self.config.search, &self.site)?;
        tracing::info!("Search URL: {}", query);

        // Load before crawling so a bad table fails the run early
        let table = RegionTable::load(Path::new(&self.config.output.postcodes_path))?;

        let link_set = self.discover_links(&query).await?;
        let links_discovered = link_set.len();
        let (links, duplicates_dropped) = dedup_links(link_set.links);
        if duplicates_dropped > 0 {
            tracing::info!("Dropped {} duplicate ad links", duplicates_dropped);
        }

        let (records, ads_skipped) = self.extract_ads(&links).await?;
        let records = enrich(records, &table);
        let records_with_region = records.iter().filter(|r| r.has_region()).count();

        self.write_outputs(&records)?;

        Ok(RunReport {
            pages_fetched: link_set.pages_fetched,
            links_discovered,
            duplicates_dropped,
            ads_extracted: records.len(),
            ads_skipped,
            records_with_region,
            stop_reason: link_set.stop_reason,
            elapsed: started.elapsed(),
        })
    }

    /// Walks the result pages, bounded by the crawl deadline if one is set
    pub async fn discover_links(&self, query: &SearchQuery) -> Result<AdLinkSet, ScraperError> {
        let max_depth = effective_depth(self.config.search.max_depth)?;
        let crawler = LinkDiscoveryCrawler::new(self.fetcher.clone(), self.site.clone())
            .with_page_delay(Duration::from_millis(self.config.fetch.delay_ms));

        match self.config.fetch.crawl_deadline_secs {
            Some(seconds) => {
                tokio::time::timeout(
                    Duration::from_secs(seconds),
                    crawler.discover(query, max_depth),
                )
                .await
                .map_err(|_| ScraperError::Deadline { seconds })?
            }
            None => crawler.discover(query, max_depth).await,
        }
    }

    /// Extracts a record from every link, in link order
    ///
    /// Up to `concurrency` ad pages are in flight at once. Returns the
    /// records and the number of ads skipped under the skip policy.
    pub async fn extract_ads(
        &self,
        links: &[String],
    ) -> Result<(Vec<AdRecord>, usize), ScraperError> {
        let total = links.len();
        let policy = self.config.fetch.on_ad_error;
        let extractor = AdPageExtractor::new(self.fetcher.clone());

        tracing::info!(
            "Extracting {} ads ({} at a time)",
            total,
            self.config.fetch.concurrency
        );

        let mut results = stream::iter(links)
            .map(|link| extractor.extract(link))
            .buffered(self.config.fetch.concurrency.max(1));

        let mut records = Vec::with_capacity(total);
        let mut skipped = 0;
        let mut processed = 0;

        while let Some(result) = results.next().await {
            processed += 1;

            match result {
                Ok(record) => records.push(record),
                Err(e) => match policy {
                    FailurePolicy::Skip => {
                        tracing::warn!("Skipping ad: {}", e);
                        skipped += 1;
                    }
                    FailurePolicy::Abort => {
                        tracing::error!("Aborting run: {}", e);
                        return Err(e.into());
                    }
                },
            }

            if processed % PROGRESS_INTERVAL == 0 {
                tracing::info!("Processed {}/{} ads", processed, total);
            }
        }

        tracing::info!(
            "Extracted {} ads, skipped {}",
            records.len(),
            skipped
        );

        Ok((records, skipped))
    }

    fn write_outputs(&self, records: &[AdRecord]) -> Result<(), ScraperError> {
        let output = &self.config.output;
        let mut sinks: Vec<Box<dyn RecordSink>> =
            vec![Box::new(CsvSink::create(Path::new(&output.records_path))?)];

        if let Some(database_path) = &output.database_path {
            sinks.push(Box::new(SqliteSink::open(
                Path::new(database_path),
                &self.config_hash,
            )?));
        }

        for sink in &mut sinks {
            sink.write_records(records)?;
            sink.finalize()?;
        }

        Ok(())
    }
}

/// Composes the search query from configuration
///
/// Model filters come first in configured order, then the named parameters,
/// then the sort directive when enabled.
pub fn build_query(search: &SearchConfig, site: &SiteProfile) -> QueryResult<SearchQuery> {
    let mut query = SearchQuery::parse(&search.base_url, site)?;
    query.add_models(&search.models);

    for parameter in &search.parameters {
        query.add_parameter(&parameter.name, &parameter.value);
    }

    if search.sort_newest_first {
        query.sort_newest_first();
    }

    Ok(query)
}

/// Removes repeated URLs, keeping the first occurrence of each
///
/// Returns the unique links in their original order and the number dropped.
pub fn dedup_links(links: Vec<String>) -> (Vec<String>, usize) {
    let before = links.len();
    let mut seen = HashSet::with_capacity(before);
    let unique: Vec<String> = links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect();
    let dropped = before - unique.len();
    (unique, dropped)
}

/// Re-runs region enrichment on an existing records file
///
/// The file is rewritten in place. Returns the number of records and how
/// many of them have a region.
pub fn enrich_records_file(output: &OutputConfig) -> Result<(usize, usize), ScraperError> {
    let records_path = Path::new(&output.records_path);
    let table = RegionTable::load(Path::new(&output.postcodes_path))?;

    let records = enrich(read_records_csv(records_path)?, &table);
    let with_region = records.iter().filter(|r| r.has_region()).count();

    let mut sink = CsvSink::create(records_path)?;
    sink.write_records(&records)?;
    sink.finalize()?;

    Ok((records.len(), with_region))
}
