//! Run statistics
//!
//! This module provides the summary of a completed scraping run and
//! prints it for the command line.

use crate::state::StopReason;
use std::time::Duration;

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Search result pages requested
    pub pages_fetched: u32,

    /// Ad links kept after the domain filter, duplicates included
    pub links_discovered: usize,

    /// Links dropped because their URL had already been seen
    pub duplicates_dropped: usize,

    /// Ads turned into records
    pub ads_extracted: usize,

    /// Ads that failed and were skipped
    pub ads_skipped: usize,

    /// Records that ended up with a region
    pub records_with_region: usize,

    /// Why link discovery stopped
    pub stop_reason: StopReason,

    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl RunReport {
    /// Share of extracted records that have a region, as a percentage
    pub fn region_coverage(&self) -> f64 {
        if self.ads_extracted == 0 {
            return 0.0;
        }
        (self.records_with_region as f64 / self.ads_extracted as f64) * 100.0
    }

    /// Share of unique links that became records, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.ads_extracted + self.ads_skipped;
        if attempted == 0 {
            return 0.0;
        }
        (self.ads_extracted as f64 / attempted as f64) * 100.0
    }
}

/// Prints a run report to stdout in a formatted manner
pub fn print_report(report: &RunReport) {
    println!("=== Scrape Report ===\n");

    println!("Search:");
    println!("  Pages fetched: {}", report.pages_fetched);
    println!("  Stopped: {}", report.stop_reason);
    println!("  Ad links found: {}", report.links_discovered);
    if report.duplicates_dropped > 0 {
        println!("  Duplicate links dropped: {}", report.duplicates_dropped);
    }
    println!();

    println!("Ads:");
    println!("  Extracted: {}", report.ads_extracted);
    println!("  Skipped: {}", report.ads_skipped);
    println!(
        "  With region: {} ({:.1}%)",
        report.records_with_region,
        report.region_coverage()
    );
    println!();

    println!(
        "Success Rate: {:.1}% in {:.1}s",
        report.success_rate(),
        report.elapsed.as_secs_f64()
    );
}
