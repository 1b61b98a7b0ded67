//! Integration tests for the scraper
//!
//! These tests use wiremock to serve search result pages and ad pages and
//! exercise link discovery, extraction and the full pipeline end-to-end.

use finn_scraper::config::parse_config;
use finn_scraper::crawler::{
    enrich_records_file, AdPageExtractor, Coordinator, ExtractError, FetchError, Fetcher,
    LinkDiscoveryCrawler,
};
use finn_scraper::output::{read_records_csv, CsvSink, RecordSink};
use finn_scraper::{AdRecord, ScraperError, SearchQuery, SiteProfile, StopReason};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/car/used/search.html";
const AD_PATH: &str = "/car/used/ad.html";

fn site() -> SiteProfile {
    SiteProfile::new("127.0.0.1", "search.html")
}

fn fetcher() -> Fetcher {
    Fetcher::with_client(reqwest::Client::new(), 0, Duration::ZERO)
}

fn search_query(server: &MockServer) -> SearchQuery {
    SearchQuery::parse(&format!("{}{}", server.uri(), SEARCH_PATH), &site())
        .expect("Failed to parse search URL")
}

/// Renders a results page listing the given ad hrefs
fn search_page(hrefs: &[String]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a class="ads__unit__link" href="{}">Ad</a>"#, href))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

fn ad_href(code: u32) -> String {
    format!("{}?finnkode={}", AD_PATH, code)
}

fn ad_page(price: &str, address: &str) -> String {
    format!(
        r#"<html><body>
            <a data-controller="trackCrumbTrailAttribute1" href="/b">Volkswagen</a>
            <a data-controller="trackCrumbTrailAttribute2" href="/m">Transporter</a>
            <span class="u-t3">{}</span>
            <span class="u-mh16">{}</span>
            <div class="media__body"><div class="u-strong">2015</div></div>
            <div class="media__body"><div class="u-strong">150&nbsp;000 km</div></div>
            <div class="media__body"><div class="u-strong">Manuell</div></div>
            <div class="media__body"><div class="u-strong">Diesel</div></div>
        </body></html>"#,
        price, address
    )
}

async fn mount_search_page(server: &MockServer, page: u32, hrefs: &[String]) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(search_page(hrefs))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_ad_page(server: &MockServer, code: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(AD_PATH))
        .and(query_param("finnkode", code.to_string()))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn forbid_search_page(server: &MockServer, page: u32) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200))
        .expect(0) // Should never be requested
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_depth_limit_stops_after_last_page() {
    let server = MockServer::start().await;

    mount_search_page(&server, 1, &[ad_href(1), ad_href(2)]).await;
    mount_search_page(&server, 2, &[ad_href(3), ad_href(4)]).await;
    mount_search_page(&server, 3, &[ad_href(5), ad_href(6)]).await;
    forbid_search_page(&server, 4).await;

    let crawler = LinkDiscoveryCrawler::new(fetcher(), site());
    let result = crawler
        .discover(&search_query(&server), 3)
        .await
        .expect("Discovery failed");

    assert_eq!(result.pages_fetched, 3);
    assert_eq!(result.stop_reason, StopReason::DepthReached { max_depth: 3 });
    assert_eq!(result.len(), 6);
    assert_eq!(
        result.links[0],
        format!("{}{}", server.uri(), ad_href(1))
    );
    assert_eq!(
        result.links[5],
        format!("{}{}", server.uri(), ad_href(6))
    );
}

#[tokio::test]
async fn test_single_link_page_ends_crawl() {
    let server = MockServer::start().await;

    mount_search_page(&server, 1, &[ad_href(1), ad_href(2)]).await;
    mount_search_page(&server, 2, &[ad_href(3)]).await;
    forbid_search_page(&server, 3).await;

    let crawler = LinkDiscoveryCrawler::new(fetcher(), site());
    let result = crawler
        .discover(&search_query(&server), 50)
        .await
        .expect("Discovery failed");

    assert_eq!(result.pages_fetched, 2);
    assert_eq!(result.stop_reason, StopReason::Exhausted { page: 2 });
    // The lone link on the last page is discarded
    assert_eq!(result.len(), 2);
    assert!(result.links.iter().all(|link| !link.ends_with("finnkode=3")));
}

#[tokio::test]
async fn test_empty_first_page_yields_no_links() {
    let server = MockServer::start().await;

    mount_search_page(&server, 1, &[]).await;
    forbid_search_page(&server, 2).await;

    let crawler = LinkDiscoveryCrawler::new(fetcher(), site());
    let result = crawler
        .discover(&search_query(&server), 10)
        .await
        .expect("Discovery failed");

    assert!(result.is_empty());
    assert_eq!(result.stop_reason, StopReason::Exhausted { page: 1 });
}

#[tokio::test]
async fn test_placeholder_anchor_does_not_end_crawl() {
    let server = MockServer::start().await;

    // One real ad plus a marker anchor whose href resolves to nothing usable
    mount_search_page(&server, 1, &[ad_href(1), "#".to_string()]).await;
    mount_search_page(&server, 2, &[ad_href(2), ad_href(3)]).await;
    forbid_search_page(&server, 3).await;

    let crawler = LinkDiscoveryCrawler::new(fetcher(), site());
    let result = crawler
        .discover(&search_query(&server), 2)
        .await
        .expect("Discovery failed");

    assert_eq!(result.pages_fetched, 2);
    assert_eq!(result.stop_reason, StopReason::DepthReached { max_depth: 2 });
    assert_eq!(result.len(), 3);
}

#[tokio::test]
async fn test_page_delay_between_result_pages() {
    let server = MockServer::start().await;

    mount_search_page(&server, 1, &[ad_href(1), ad_href(2)]).await;
    mount_search_page(&server, 2, &[ad_href(3)]).await;

    let delay = Duration::from_millis(400);
    let crawler = LinkDiscoveryCrawler::new(fetcher(), site()).with_page_delay(delay);

    let started = std::time::Instant::now();
    let result = crawler
        .discover(&search_query(&server), 5)
        .await
        .expect("Discovery failed");

    assert_eq!(result.pages_fetched, 2);
    assert!(
        started.elapsed() >= delay,
        "second page fetched after {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_page_delay_not_applied_before_first_page() {
    let server = MockServer::start().await;
    mount_search_page(&server, 1, &[ad_href(1), ad_href(2)]).await;

    let crawler = LinkDiscoveryCrawler::new(fetcher(), site())
        .with_page_delay(Duration::from_secs(10));

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        crawler.discover(&search_query(&server), 1),
    )
    .await
    .expect("First page was delayed")
    .expect("Discovery failed");

    assert_eq!(result.len(), 2);
}

#[tokio::test]
async fn test_page_fetch_failure_names_the_page() {
    let server = MockServer::start().await;

    mount_search_page(&server, 1, &[ad_href(1), ad_href(2)]).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let crawler = LinkDiscoveryCrawler::new(fetcher(), site());
    let err = crawler
        .discover(&search_query(&server), 5)
        .await
        .expect_err("Discovery should fail");

    match err {
        ScraperError::PageFetch { page, source } => {
            assert_eq!(page, 2);
            assert!(matches!(source, FetchError::Status { status: 500, .. }));
        }
        other => panic!("Unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_zero_depth_rejected_without_requests() {
    let server = MockServer::start().await;
    forbid_search_page(&server, 1).await;

    let crawler = LinkDiscoveryCrawler::new(fetcher(), site());
    let err = crawler
        .discover(&search_query(&server), 0)
        .await
        .expect_err("Zero depth should be rejected");

    assert!(matches!(err, ScraperError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_foreign_links_are_filtered() {
    let server = MockServer::start().await;

    mount_search_page(
        &server,
        1,
        &[
            ad_href(1),
            "https://ads.partner.com/click?id=7".to_string(),
            ad_href(2),
        ],
    )
    .await;

    let crawler = LinkDiscoveryCrawler::new(fetcher(), site());
    let result = crawler
        .discover(&search_query(&server), 1)
        .await
        .expect("Discovery failed");

    assert_eq!(result.len(), 2);
    assert!(result.links.iter().all(|link| link.starts_with(&server.uri())));
}

#[tokio::test]
async fn test_extract_ad_page() {
    let server = MockServer::start().await;
    mount_ad_page(
        &server,
        1,
        ResponseTemplate::new(200).set_body_string(ad_page("350 000 kr", "Osloveien 1, 0150 Oslo")),
    )
    .await;

    let ad_url = format!("{}{}", server.uri(), ad_href(1));
    let record = AdPageExtractor::new(fetcher())
        .extract(&ad_url)
        .await
        .expect("Extraction failed");

    let mut expected = AdRecord::new(ad_url, 350000);
    expected.address = Some("Osloveien 1, 0150 Oslo".to_string());
    expected.brand = Some("Volkswagen".to_string());
    expected.model = Some("Transporter".to_string());
    expected.year = Some("2015".to_string());
    expected.mileage = Some("150000".to_string());
    expected.gearbox = Some("Manuell".to_string());
    expected.fuel = Some("Diesel".to_string());
    assert_eq!(record, expected);
}

#[tokio::test]
async fn test_extract_removed_ad() {
    let server = MockServer::start().await;
    mount_ad_page(&server, 9, ResponseTemplate::new(404)).await;

    let ad_url = format!("{}{}", server.uri(), ad_href(9));
    let err = AdPageExtractor::new(fetcher())
        .extract(&ad_url)
        .await
        .expect_err("Removed ad should fail");

    assert!(matches!(
        err,
        ExtractError::Fetch(FetchError::NotFound { .. })
    ));
    assert_eq!(err.url(), ad_url);
}

/// Writes a config and region table for a pipeline run against `server`
fn pipeline_config(server: &MockServer, dir: &TempDir, extra_fetch: &str) -> String {
    let postcodes = dir.path().join("postcodes.csv");
    std::fs::write(&postcodes, "Postnummer,Fylke\n01,Oslo\n50,Vestland\n")
        .expect("Failed to write region table");

    format!(
        r#"
        [site]
        domain = "127.0.0.1"

        [search]
        base-url = "{uri}{search}?"
        models = ["1.817.1444"]
        max-depth = 1

        [fetch]
        max-retries = 0
        retry-delay-ms = 0
        concurrency = 2
        {extra_fetch}

        [output]
        records-path = "{records}"
        postcodes-path = "{postcodes}"
        "#,
        uri = server.uri(),
        search = SEARCH_PATH,
        extra_fetch = extra_fetch,
        records = dir.path().join("ads.csv").display(),
        postcodes = postcodes.display(),
    )
}

/// One search page with a duplicate link and a removed ad
async fn mount_pipeline_site(server: &MockServer) {
    mount_search_page(server, 1, &[ad_href(1), ad_href(2), ad_href(1), ad_href(3)]).await;
    forbid_search_page(server, 2).await;

    mount_ad_page(
        server,
        1,
        ResponseTemplate::new(200).set_body_string(ad_page("189 000 kr", "Osloveien 1, 0150 Oslo")),
    )
    .await;
    mount_ad_page(server, 2, ResponseTemplate::new(404)).await;
    mount_ad_page(
        server,
        3,
        ResponseTemplate::new(200).set_body_string(ad_page("95 000 kr", "Storgata 2, 9008 Tromsø")),
    )
    .await;
}

#[tokio::test]
async fn test_full_pipeline_skips_failed_ads() {
    let server = MockServer::start().await;
    mount_pipeline_site(&server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = parse_config(&pipeline_config(&server, &dir, "")).expect("Invalid config");

    let coordinator = Coordinator::new(config, "test-hash").expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Run failed");

    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.links_discovered, 4);
    assert_eq!(report.duplicates_dropped, 1);
    assert_eq!(report.ads_extracted, 2);
    assert_eq!(report.ads_skipped, 1);
    assert_eq!(report.records_with_region, 1);
    assert_eq!(report.stop_reason, StopReason::DepthReached { max_depth: 1 });

    let records = read_records_csv(&dir.path().join("ads.csv")).expect("Failed to read records");
    assert_eq!(records.len(), 2);

    // Discovery order is kept despite parallel extraction
    assert!(records[0].url.ends_with("finnkode=1"));
    assert_eq!(records[0].price, 189000);
    assert_eq!(records[0].postcode.as_deref(), Some("0150"));
    assert_eq!(records[0].region.as_deref(), Some("Oslo"));

    assert!(records[1].url.ends_with("finnkode=3"));
    assert_eq!(records[1].postcode.as_deref(), Some("9008"));
    assert!(records[1].region.is_none());
}

#[tokio::test]
async fn test_full_pipeline_abort_policy() {
    let server = MockServer::start().await;
    mount_pipeline_site(&server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = parse_config(&pipeline_config(&server, &dir, r#"on-ad-error = "abort""#))
        .expect("Invalid config");

    let coordinator = Coordinator::new(config, "test-hash").expect("Failed to create coordinator");
    let err = coordinator.run().await.expect_err("Run should abort");

    assert!(matches!(
        err,
        ScraperError::Extract(ExtractError::Fetch(FetchError::NotFound { .. }))
    ));
    assert!(!dir.path().join("ads.csv").exists());
}

#[tokio::test]
async fn test_full_pipeline_writes_database() {
    let server = MockServer::start().await;
    mount_pipeline_site(&server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("ads.db");
    let toml = format!(
        "{}database-path = \"{}\"\n",
        pipeline_config(&server, &dir, ""),
        db_path.display()
    );
    let config = parse_config(&toml).expect("Invalid config");

    let coordinator = Coordinator::new(config, "test-hash").expect("Failed to create coordinator");
    coordinator.run().await.expect("Run failed");

    let conn = rusqlite::Connection::open(&db_path).expect("Failed to open DB");
    let (hash, ad_count): (String, i64) = conn
        .query_row("SELECT config_hash, ad_count FROM runs", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .expect("Failed to read run");
    assert_eq!(hash, "test-hash");
    assert_eq!(ad_count, 2);

    let oslo: i64 = conn
        .query_row("SELECT COUNT(*) FROM ads WHERE region = 'Oslo'", [], |row| {
            row.get(0)
        })
        .expect("Failed to count ads");
    assert_eq!(oslo, 1);
}

#[tokio::test]
async fn test_crawl_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(search_page(&[ad_href(1), ad_href(2)]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = parse_config(&pipeline_config(&server, &dir, "crawl-deadline-secs = 1"))
        .expect("Invalid config");

    let coordinator = Coordinator::new(config, "test-hash").expect("Failed to create coordinator");
    let err = coordinator.run().await.expect_err("Run should time out");

    assert!(matches!(err, ScraperError::Deadline { seconds: 1 }));
}

#[test]
fn test_enrich_existing_records_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let records_path = dir.path().join("ads.csv");
    let postcodes_path = dir.path().join("postcodes.csv");
    std::fs::write(&postcodes_path, "prefix,region\n50,Vestland\n").unwrap();

    let mut with_address = AdRecord::new("https://www.finn.no/ad/1", 250000);
    with_address.address = Some("Bryggen 1, 5003 Bergen".to_string());
    let without_address = AdRecord::new("https://www.finn.no/ad/2", 99000);

    let mut sink = CsvSink::create(&records_path).unwrap();
    sink.write_records(&[with_address, without_address]).unwrap();
    sink.finalize().unwrap();

    let config = parse_config(&format!(
        r#"
        [search]
        base-url = "https://www.finn.no/car/used/search.html"

        [output]
        records-path = "{}"
        postcodes-path = "{}"
        "#,
        records_path.display(),
        postcodes_path.display()
    ))
    .expect("Invalid config");

    let (total, with_region) = enrich_records_file(&config.output).expect("Enrichment failed");
    assert_eq!(total, 2);
    assert_eq!(with_region, 1);

    let records = read_records_csv(Path::new(&records_path)).unwrap();
    assert_eq!(records[0].postcode.as_deref(), Some("5003"));
    assert_eq!(records[0].region.as_deref(), Some("Vestland"));
    assert!(records[1].postcode.is_none());
    assert!(records[1].region.is_none());
}
