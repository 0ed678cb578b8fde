//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end: fetching, link extraction, scope
//! and limit enforcement, scraper dispatch, and cancellation.

use dredge::crawler::{Coordinator, ExceededLimit};
use dredge::scrape::{MemorySink, NullSink};
use dredge::{Config, Item, Page, ScrapeError, Scraper, ScraperRegistry, StopReason, UrlRecord};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with fast retries and the given seeds
fn create_test_config(seeds: Vec<String>) -> Config {
    let mut config = Config::with_seeds(seeds);
    config.crawler.worker_count = 2;
    config.fetch.timeout_secs = 5;
    config.fetch.retry_delay_ms = 10;
    config
}

fn html_page(links: &[String]) -> String {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">link</a>"#, l))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_same_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        html_page(&[
            format!("{}/page1", base),
            format!("{}/page2", base),
            "https://external.example/elsewhere".to_string(),
        ]),
    )
    .await;
    mount_html(&server, "/page1", html_page(&[])).await;
    mount_html(&server, "/page2", html_page(&[])).await;

    let config = create_test_config(vec![format!("{}/", base)]);
    let coordinator =
        Coordinator::new(config, ScraperRegistry::new(), Arc::new(NullSink))
            .expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    // Seed plus two same-site links; the external link is discarded.
    assert_eq!(report.crawled, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(report.links_enqueued, 2);
    assert_eq!(report.frontier_remaining, 0);
    assert_eq!(report.stop_reason, StopReason::Exhausted);
}

#[tokio::test]
async fn test_depth_limit_stops_descent() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(&server, "/", html_page(&[format!("{}/a", base)])).await;
    mount_html(&server, "/a", html_page(&[format!("{}/b", base)])).await;

    // The page beyond the depth ceiling must never be requested.
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(vec![format!("{}/", base)]);
    config.crawler.max_depth = Some(1);

    let coordinator =
        Coordinator::new(config, ScraperRegistry::new(), Arc::new(NullSink))
            .expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.crawled, 2);
    // A depth rejection is not a limit trip; the frontier simply drained.
    assert_eq!(report.stop_reason, StopReason::Exhausted);
}

#[tokio::test]
async fn test_max_crawled_fetches_exactly_one() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>ok</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let seeds: Vec<String> = (0..5).map(|i| format!("{}/seed{}", base, i)).collect();
    let mut config = create_test_config(seeds);
    config.crawler.worker_count = 4;
    config.crawler.max_crawled = Some(1);

    let coordinator =
        Coordinator::new(config, ScraperRegistry::new(), Arc::new(NullSink))
            .expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.crawled, 1);
    assert!(matches!(report.stop_reason, StopReason::LimitReached(_)));
    // Workers racing the latch may claim (and abandon) seeds, but never
    // fetch them.
    assert!(report.frontier_remaining >= 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_retry_exhaustion_records_failure() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Always 503: the fetcher should attempt exactly `retry-count` times.
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let mut config = create_test_config(vec![format!("{}/flaky", base)]);
    config.fetch.retry_count = 3;

    let coordinator =
        Coordinator::new(config, ScraperRegistry::new(), Arc::new(NullSink))
            .expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    // A failed page is not a crawl failure; the run still completes.
    assert_eq!(report.crawled, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(report.stop_reason, StopReason::Exhausted);
}

struct HostScraper {
    host: String,
}

impl Scraper for HostScraper {
    fn name(&self) -> &str {
        "host"
    }

    fn applicable(&self, url: &UrlRecord) -> bool {
        url.host() == self.host
    }

    fn scrape(&self, page: &Page) -> Result<Vec<Item>, ScrapeError> {
        Ok(vec![json!({ "url": page.url.as_str(), "status": page.status })])
    }
}

struct PanickyScraper;

impl Scraper for PanickyScraper {
    fn name(&self) -> &str {
        "panicky"
    }

    fn applicable(&self, _url: &UrlRecord) -> bool {
        true
    }

    fn scrape(&self, _page: &Page) -> Result<Vec<Item>, ScrapeError> {
        panic!("scraper bug");
    }
}

#[tokio::test]
async fn test_scraper_dispatch_and_isolation() {
    let server = MockServer::start().await;
    let base = server.uri();
    let host = url::Url::parse(&base).unwrap().host_str().unwrap().to_string();

    mount_html(&server, "/", html_page(&[])).await;

    let mut registry = ScraperRegistry::new();
    registry.register(Arc::new(HostScraper { host }));
    registry.register(Arc::new(PanickyScraper));

    let sink = Arc::new(MemorySink::new());
    let config = create_test_config(vec![format!("{}/", base)]);

    let coordinator = Coordinator::new(config, registry, sink.clone())
        .expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    // The panicking scraper is contained; the healthy one still produces.
    assert_eq!(report.crawled, 1);
    assert_eq!(report.scraped, 1);
    assert_eq!(report.scraper_failures.get("panicky"), Some(&1));

    let items = sink.take();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].0, "host");
    assert_eq!(items[0].1["status"], 200);
}

#[tokio::test]
async fn test_max_scraped_halts_run() {
    let server = MockServer::start().await;
    let base = server.uri();
    let host = url::Url::parse(&base).unwrap().host_str().unwrap().to_string();

    let links: Vec<String> = (0..10).map(|i| format!("{}/p{}", base, i)).collect();
    mount_html(&server, "/", html_page(&links)).await;
    for i in 0..10 {
        mount_html(&server, &format!("/p{}", i), html_page(&[])).await;
    }

    let mut registry = ScraperRegistry::new();
    registry.register(Arc::new(HostScraper { host }));

    let mut config = create_test_config(vec![format!("{}/", base)]);
    config.crawler.worker_count = 1;
    config.crawler.max_scraped = Some(1);

    let coordinator = Coordinator::new(config, registry, Arc::new(MemorySink::new()))
        .expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    // The first scraped item spends the budget; queued pages stay unfetched.
    assert_eq!(report.scraped, 1);
    assert!(matches!(report.stop_reason, StopReason::LimitReached(_)));
    assert!(report.frontier_remaining > 0);
}

#[tokio::test]
async fn test_max_time_halts_run() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: Vec<String> = (0..20).map(|i| format!("{}/p{}", base, i)).collect();
    mount_html(&server, "/", html_page(&links)).await;
    for i in 0..20 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body>slow</body></html>")
                    .set_delay(std::time::Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
    }

    let mut config = create_test_config(vec![format!("{}/", base)]);
    config.crawler.worker_count = 1;
    config.crawler.max_time_secs = Some(1);

    let coordinator = Coordinator::new(config, ScraperRegistry::new(), Arc::new(NullSink))
        .expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    assert!(matches!(
        report.stop_reason,
        StopReason::LimitReached(ExceededLimit::MaxTime(_))
    ));
    assert!(report.frontier_remaining > 0);
}

#[tokio::test]
async fn test_cancellation_stops_workers() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: Vec<String> = (0..20).map(|i| format!("{}/p{}", base, i)).collect();
    mount_html(&server, "/", html_page(&links)).await;
    for i in 0..20 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body>slow</body></html>")
                    .set_delay(std::time::Duration::from_millis(100)),
            )
            .mount(&server)
            .await;
    }

    let config = create_test_config(vec![format!("{}/", base)]);
    let coordinator =
        Coordinator::new(config, ScraperRegistry::new(), Arc::new(NullSink))
            .expect("Failed to create coordinator");
    let stop = coordinator.stop_handle();

    let run = tokio::spawn(coordinator.run());
    tokio::time::sleep(std::time::Duration::from_millis(250)).await;
    stop.stop();

    let report = run.await.expect("Join failed").expect("Crawl failed");
    assert_eq!(report.stop_reason, StopReason::Cancelled);
    assert!(report.frontier_remaining > 0);
}

#[tokio::test]
async fn test_stop_during_fetch_skips_extraction_and_dispatch() {
    let server = MockServer::start().await;
    let base = server.uri();
    let host = url::Url::parse(&base).unwrap().host_str().unwrap().to_string();

    // The seed is slow enough that the stop lands while its fetch is in
    // flight; its links and items must then be dropped with it.
    let links: Vec<String> = (0..5).map(|i| format!("{}/p{}", base, i)).collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page(&links))
                .set_delay(std::time::Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let mut registry = ScraperRegistry::new();
    registry.register(Arc::new(HostScraper { host }));

    let sink = Arc::new(MemorySink::new());
    let mut config = create_test_config(vec![format!("{}/", base)]);
    config.crawler.worker_count = 1;

    let coordinator =
        Coordinator::new(config, registry, sink.clone()).expect("Failed to create coordinator");
    let stop = coordinator.stop_handle();

    let run = tokio::spawn(coordinator.run());
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    stop.stop();

    let report = run.await.expect("Join failed").expect("Crawl failed");
    assert_eq!(report.stop_reason, StopReason::Cancelled);
    assert_eq!(report.links_enqueued, 0);
    assert_eq!(report.scraped, 0);
    assert!(sink.take().is_empty());
}
