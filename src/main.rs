//! finn-scraper main entry point
//!
//! This is the command-line interface for the finn.no vehicle ad scraper.

use anyhow::Context;
use clap::Parser;
use finn_scraper::config::{load_config_with_hash, Config};
use finn_scraper::crawler::{build_query, effective_depth, enrich_records_file, scrape};
use finn_scraper::output::print_report;
use finn_scraper::url::SiteProfile;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// finn-scraper: harvests vehicle ads from finn.no
///
/// Walks the search results for the configured models, extracts price,
/// address and key facts from every ad, attaches a region from the
/// postcode table and writes the records to CSV.
#[derive(Parser, Debug)]
#[command(name = "finn-scraper")]
#[command(version)]
#[command(about = "Harvests vehicle ads from finn.no", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the search that would run, without network access
    #[arg(long, conflicts_with = "enrich_only")]
    dry_run: bool,

    /// Re-run region enrichment on the existing records file and exit
    #[arg(long, conflicts_with = "dry_run")]
    enrich_only: bool,

    /// Override the configured number of search pages to walk
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(max_depth) = cli.max_depth {
        tracing::info!("Overriding max depth with {}", max_depth);
        config.search.max_depth = max_depth;
    }

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.enrich_only {
        handle_enrich_only(&config)
    } else {
        handle_scrape(config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("finn_scraper=info,warn"),
            1 => EnvFilter::new("finn_scraper=debug,info"),
            2 => EnvFilter::new("finn_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be scraped
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let site = SiteProfile::from(&config.site);
    let query = build_query(&config.search, &site).context("invalid search query")?;
    let max_depth = effective_depth(config.search.max_depth)?;

    println!("=== finn-scraper Dry Run ===\n");

    println!("Search:");
    println!("  Site: {} ({})", site.domain, site.search_marker);
    println!("  URL: {}", query);
    println!("  Models: {}", config.search.models.len());
    println!("  Max depth: {} pages", max_depth);
    println!("  First page: {}", query.page_url(1));

    println!("\nFetch:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!(
        "  Retries: {} ({}ms apart)",
        config.fetch.max_retries, config.fetch.retry_delay_ms
    );
    println!("  Page delay: {}ms", config.fetch.delay_ms);
    println!("  Concurrency: {}", config.fetch.concurrency);
    if let Some(deadline) = config.fetch.crawl_deadline_secs {
        println!("  Crawl deadline: {}s", deadline);
    }
    println!("  On ad error: {:?}", config.fetch.on_ad_error);

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);
    println!("  Postcodes: {}", config.output.postcodes_path);
    if let Some(database_path) = &config.output.database_path {
        println!("  Database: {}", database_path);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --enrich-only mode: rewrites the records file with fresh regions
fn handle_enrich_only(config: &Config) -> anyhow::Result<()> {
    let (total, with_region) = enrich_records_file(&config.output)
        .with_context(|| format!("failed to enrich {}", config.output.records_path))?;

    println!(
        "✓ Enriched {} records ({} with region) in {}",
        total, with_region, config.output.records_path
    );

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(config: Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Searching {} models, up to {} pages",
        config.search.models.len(),
        config.search.max_depth
    );

    match scrape(config, config_hash).await {
        Ok(report) => {
            tracing::info!("Scrape completed successfully");
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
