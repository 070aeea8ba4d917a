//! Integration tests for the crawler
//!
//! These tests use wiremock to serve sitemap documents over HTTP and test
//! the full two-level crawl end-to-end, writing batches into a temp directory.

use sitemap_sieve::config::Config;
use sitemap_sieve::crawler::memory::sitemap_xml;
use sitemap_sieve::crawler::{run_crawl, Coordinator, CrawlMode, CrawlOutcome, HttpFetcher};
use sitemap_sieve::output::FileSink;
use sitemap_sieve::{FetchError, SieveError};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server's root sitemap
fn create_test_config(base_url: &str, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.sitemap.root_url = Some(format!("{}/sitemap.xml", base_url));
    config.sitemap.match_content = "post-sitemap".to_string();
    config.sitemap.match_url = "/2023/".to_string();
    config.fetcher.settle_delay = 0; // No settling needed for static documents
    config.fetcher.navigation_timeout = 5_000;
    config.output.directory = dir.path().join("results").display().to_string();
    config.output.input_directory = dir.path().join("input").display().to_string();
    config
}

/// Mounts a sitemap document at `route`
async fn mount_sitemap(server: &MockServer, route: &str, locations: &[String]) {
    let locations: Vec<&str> = locations.iter().map(String::as_str).collect();
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sitemap_xml(&locations))
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

fn csv_urls(file: &Path) -> Vec<String> {
    std::fs::read_to_string(file)
        .expect("Failed to read batch")
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_full_two_level_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_sitemap(
        &mock_server,
        "/sitemap.xml",
        &[
            format!("{}/post-sitemap1.xml", base_url),
            format!("{}/page-sitemap.xml", base_url),
            format!("{}/post-sitemap2.xml", base_url),
        ],
    )
    .await;
    mount_sitemap(
        &mock_server,
        "/post-sitemap1.xml",
        &[
            format!("{}/2023/01/first", base_url),
            format!("{}/2022/12/old", base_url),
        ],
    )
    .await;
    mount_sitemap(
        &mock_server,
        "/post-sitemap2.xml",
        &[format!("{}/2023/02/second", base_url)],
    )
    .await;

    // Filtered out archive (should never be called)
    Mock::given(method("GET"))
        .and(path("/page-sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &dir);
    let outcome = run_crawl(&config, &CrawlMode::Discover)
        .await
        .expect("Crawl failed");

    let report = match outcome {
        CrawlOutcome::Completed(report) => report,
        other => panic!("Expected a completed crawl, got {:?}", other),
    };

    assert_eq!(report.archives_total, 2);
    assert_eq!(report.articles_discovered, 3);
    assert_eq!(report.articles_kept, 2);
    assert_eq!(report.persisted.len(), 4);

    for file in &report.persisted {
        assert!(file.starts_with(&config.output.directory));
        assert_eq!(file.extension().unwrap(), "csv");
    }

    let archive_batch = &report.persisted[0];
    assert!(archive_batch
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("archive-urls-"));
    assert_eq!(csv_urls(archive_batch).len(), 2);

    let final_batch = report.persisted.last().unwrap();
    assert!(final_batch
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("filtered-article-urls-"));
    assert_eq!(
        csv_urls(final_batch),
        vec![
            format!("{}/2023/01/first", base_url),
            format!("{}/2023/02/second", base_url),
        ]
    );
}

#[tokio::test]
async fn test_failing_archive_does_not_abort_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_sitemap(
        &mock_server,
        "/sitemap.xml",
        &[
            format!("{}/post-sitemap-broken.xml", base_url),
            format!("{}/post-sitemap-empty.xml", base_url),
            format!("{}/post-sitemap-good.xml", base_url),
        ],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/post-sitemap-broken.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_sitemap(&mock_server, "/post-sitemap-empty.xml", &[]).await;
    mount_sitemap(
        &mock_server,
        "/post-sitemap-good.xml",
        &[format!("{}/2023/03/kept", base_url)],
    )
    .await;

    let config = create_test_config(&base_url, &dir);
    let outcome = run_crawl(&config, &CrawlMode::Discover)
        .await
        .expect("Crawl failed");

    let report = outcome.report().expect("Expected a report");
    assert!(matches!(outcome, CrawlOutcome::Completed(_)));
    assert_eq!(report.archives_failed, 1);
    assert_eq!(report.archives_empty, 1);
    assert_eq!(report.articles_kept, 1);
}

#[tokio::test]
async fn test_slow_archive_times_out_and_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_sitemap(
        &mock_server,
        "/sitemap.xml",
        &[
            format!("{}/post-sitemap-slow.xml", base_url),
            format!("{}/post-sitemap-fast.xml", base_url),
        ],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/post-sitemap-slow.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sitemap_xml(&["https://late.example.com/2023/x"]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;
    mount_sitemap(
        &mock_server,
        "/post-sitemap-fast.xml",
        &[format!("{}/2023/04/fast", base_url)],
    )
    .await;

    let mut config = create_test_config(&base_url, &dir);
    config.fetcher.navigation_timeout = 300;

    let outcome = run_crawl(&config, &CrawlMode::Discover)
        .await
        .expect("Crawl failed");

    let report = outcome.report().expect("Expected a report");
    assert_eq!(report.archives_failed, 1);
    assert_eq!(report.articles_kept, 1);
}

#[tokio::test]
async fn test_configured_headers_are_sent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .and(header("user-agent", "TestAgent/1.0"))
        .and(header("x-crawl-token", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_xml(&[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, &dir);
    config.fetcher.headers.clear();
    config
        .fetcher
        .headers
        .insert("User-Agent".to_string(), "TestAgent/1.0".to_string());
    config
        .fetcher
        .headers
        .insert("X-Crawl-Token".to_string(), "abc".to_string());

    let outcome = run_crawl(&config, &CrawlMode::Discover)
        .await
        .expect("Crawl failed");
    assert_eq!(outcome, CrawlOutcome::NoArchivesFound);
}

#[tokio::test]
async fn test_root_not_found_is_fatal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &dir);
    let result = run_crawl(&config, &CrawlMode::Discover).await;

    assert!(matches!(
        result,
        Err(SieveError::Fetch(FetchError::Status { status: 404, .. }))
    ));
    assert!(!Path::new(&config.output.directory).exists());
}

#[tokio::test]
async fn test_seeded_crawl_from_file() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    // The root sitemap is never consulted in seeded mode
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_sitemap(
        &mock_server,
        "/archive-2023.xml",
        &[
            format!("{}/2023/05/seeded", base_url),
            format!("{}/about", base_url),
        ],
    )
    .await;

    let config = create_test_config(&base_url, &dir);
    std::fs::create_dir_all(&config.output.input_directory).unwrap();
    std::fs::write(
        Path::new(&config.output.input_directory).join("archives.txt"),
        format!("{}/archive-2023.xml\n", base_url),
    )
    .unwrap();

    let fetcher = HttpFetcher::new(config.fetcher.clone());
    let coordinator = Coordinator::new(&config, fetcher, FileSink::new(&config.output.directory));
    let outcome = coordinator
        .run(&CrawlMode::Seeded {
            file_name: "archives.txt".to_string(),
        })
        .await
        .expect("Crawl failed");

    let report = outcome.report().expect("Expected a report");
    assert_eq!(report.articles_discovered, 2);
    assert_eq!(
        csv_urls(report.persisted.last().unwrap()),
        vec![format!("{}/2023/05/seeded", base_url)]
    );
}

#[tokio::test]
async fn test_empty_seed_file_makes_no_requests() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    let config = create_test_config(&base_url, &dir);
    std::fs::create_dir_all(&config.output.input_directory).unwrap();
    std::fs::write(Path::new(&config.output.input_directory).join("empty.txt"), "").unwrap();

    let outcome = run_crawl(
        &config,
        &CrawlMode::Seeded {
            file_name: "empty.txt".to_string(),
        },
    )
    .await
    .expect("Crawl failed");

    assert_eq!(outcome, CrawlOutcome::EmptySeed);
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}
