//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock career sites and test the
//! fetch, extraction and batch cycle end-to-end over real HTTP.

use jobsweep::config::{BrowserProfile, Config};
use jobsweep::crawler::{
    AvatureListingParser, Coordinator, Fetcher, HttpTransport, RetryPolicy, SiteExtractor,
    Transport,
};
use jobsweep::proxy::{ProxyPool, ProxyProvider};
use jobsweep::site::{AvatureSearchUrl, SiteTarget};
use jobsweep::state::StopReason;
use jobsweep::storage::{JsonFileStore, ProgressStore};
use jobsweep::{FetchError, SweepError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with fast retries and no politeness delay
fn create_test_config(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.output.jobs_path = dir.join("jobs.json").display().to_string();
    config.output.progress_path = dir.join("progress.json").display().to_string();
    config.batch.batch_size = 20;
    config.batch.save_every = 2;
    config.fetch.max_retries = 2;
    config.fetch.base_delay_ms = 1;
    config.fetch.jitter_min_ms = 0;
    config.fetch.jitter_max_ms = 0;
    config.fetch.timeout_secs = 5;
    config.fetch.per_page = 2;
    config
}

fn test_fetcher(config: &Config) -> Fetcher<HttpTransport> {
    let transport = HttpTransport::from_config(config, None).expect("Failed to build transport");
    Fetcher::new(transport, RetryPolicy::from_config(&config.fetch))
}

/// Renders an Avature-style results page with jobs numbered from `first`
fn listing_html(first: usize, count: usize, total: Option<usize>) -> String {
    let legend = match total {
        Some(total) => format!(
            r#"<div class="list-controls__text__legend">{}-{} of {} results</div>"#,
            first + 1,
            first + count,
            total
        ),
        None => String::new(),
    };

    let articles: String = (first..first + count)
        .map(|n| {
            format!(
                r#"<article class="article article--result">
                  <h3 class="article__header__text__title">
                    <a href="JobDetail/Role-{n}/{n}">Role {n}</a>
                  </h3>
                  <div class="article__header__text__subtitle">City {n}</div>
                </article>"#,
                n = n
            )
        })
        .collect();

    format!("<html><body>{}{}</body></html>", legend, articles)
}

/// Mounts one listing page of a site at `site_path`
async fn mount_page(server: &MockServer, site_path: &str, offset: usize, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("{}/SearchJobs/", site_path)))
        .and(query_param("jobOffset", offset.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_http_transport_returns_body() {
    let mock_server = MockServer::start().await;

    // only answers when the browser profile headers are present
    Mock::given(method("GET"))
        .and(path("/careers"))
        .and(header_exists("sec-ch-ua"))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(BrowserProfile::Chrome, Duration::from_secs(5), None)
        .expect("Failed to build transport");
    let body = transport
        .get(&format!("{}/careers", mock_server.uri()), None)
        .await
        .expect("Request failed");

    assert_eq!(body, "hello");
}

#[tokio::test]
async fn test_http_transport_reports_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(BrowserProfile::Firefox, Duration::from_secs(5), None)
        .expect("Failed to build transport");
    let err = transport
        .get(&mock_server.uri(), None)
        .await
        .expect_err("503 should fail the attempt");

    assert_eq!(err, FetchError::Status { status: 503 });
}

/// Proxy provider that counts how often the transport asks for an endpoint
struct CountingProvider {
    pool: ProxyPool,
    lookups: AtomicUsize,
}

impl ProxyProvider for CountingProvider {
    fn endpoints(&self) -> &[String] {
        self.pool.endpoints()
    }

    fn next_proxy(&self) -> Option<&str> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.pool.next_proxy()
    }
}

#[tokio::test]
async fn test_http_transport_routes_through_proxy() {
    // the mock server plays the forward proxy for a host that does not resolve
    let proxy_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/careers"))
        .and(header("host", "jobs.example.test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("via proxy"))
        .mount(&proxy_server)
        .await;

    let port = url::Url::parse(&proxy_server.uri())
        .ok()
        .and_then(|u| u.port())
        .expect("mock server has a port");
    let pool = ProxyPool::parse(&format!(
        "{}\n127.0.0.1:{}\n",
        proxy_server.uri(),
        port
    ))
    .expect("Failed to parse proxies");
    let provider = Arc::new(CountingProvider {
        pool,
        lookups: AtomicUsize::new(0),
    });

    let transport = HttpTransport::new(
        BrowserProfile::Chrome,
        Duration::from_secs(5),
        Some(provider.clone() as Arc<dyn ProxyProvider>),
    )
    .expect("Failed to build transport");

    for _ in 0..3 {
        let body = transport
            .get("http://jobs.example.test/careers", None)
            .await
            .expect("Proxied request failed");
        assert_eq!(body, "via proxy");
    }

    // one endpoint lookup per request
    assert_eq!(provider.lookups.load(Ordering::SeqCst), 3);

    let requests = proxy_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests
        .iter()
        .all(|r| r.url.host_str() == Some("jobs.example.test")));
}

#[tokio::test]
async fn test_fetcher_retries_server_errors() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path());

    // first attempt fails, the next one succeeds
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(&config);
    let body = fetcher.fetch(&mock_server.uri()).await.expect("Fetch failed");

    assert_eq!(body, "recovered");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_fetcher_gives_up_after_max_retries() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(&config);
    let err = fetcher
        .fetch(&mock_server.uri())
        .await
        .expect_err("every attempt fails");

    match err {
        SweepError::FetchExhausted { attempts, last, .. } => {
            assert_eq!(attempts, 2);
            assert_eq!(last, FetchError::Status { status: 500 });
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_extract_all_paginates_avature_listing() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path());

    mount_page(&mock_server, "/careers", 0, listing_html(0, 2, Some(5))).await;
    mount_page(&mock_server, "/careers", 2, listing_html(2, 2, None)).await;
    mount_page(&mock_server, "/careers", 4, listing_html(4, 1, None)).await;

    let site = SiteTarget::parse(&format!("{}/careers", mock_server.uri())).unwrap();
    let fetcher = test_fetcher(&config);
    let extractor = SiteExtractor::new(&fetcher, &AvatureSearchUrl, &AvatureListingParser, 2);

    let extraction = extractor.extract_all(&site).await.expect("Extraction failed");

    assert_eq!(extraction.records.len(), 5);
    assert_eq!(extraction.stop, StopReason::ReachedTotal);
    assert_eq!(extraction.reported_total, Some(5));
    assert_eq!(extraction.page_size, Some(2));

    let first = &extraction.records[0];
    assert_eq!(first.title, "Role 0");
    assert_eq!(first.location.as_deref(), Some("City 0"));
    assert_eq!(first.job_id.as_deref(), Some("0"));
    assert_eq!(
        first.url,
        format!("{}/careers/JobDetail/Role-0/0", mock_server.uri())
    );

    // exactly the three listing pages, no trailing empty page
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_full_batch_writes_artifact_and_checkpoint() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path());

    // alpha: two pages with a reported total
    mount_page(&mock_server, "/alpha", 0, listing_html(0, 2, Some(3))).await;
    mount_page(&mock_server, "/alpha", 2, listing_html(2, 1, None)).await;
    // beta: no total, ends on an empty page
    mount_page(&mock_server, "/beta", 0, listing_html(0, 2, None)).await;
    mount_page(&mock_server, "/beta", 2, listing_html(2, 0, None)).await;
    // broken: nothing mounted, every request answers 404

    let sites: Vec<SiteTarget> = ["/alpha", "/broken", "/beta"]
        .iter()
        .map(|p| SiteTarget::parse(&format!("{}{}", mock_server.uri(), p)).unwrap())
        .collect();

    let store = JsonFileStore::new(
        &config.output.progress_path,
        &config.output.jobs_path,
    );
    let mut coordinator = Coordinator::new(&config, test_fetcher(&config), store);
    let outcome = coordinator.run(&sites).await.expect("Batch failed");

    assert_eq!(outcome.stats.batch_sites, 3);
    assert_eq!(outcome.stats.sites_failed, 1);
    assert_eq!(outcome.stats.total_jobs, 5);
    assert_eq!(outcome.stats.sites_remaining, 0);

    // output artifact on disk
    let output: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.output.jobs_path).unwrap()).unwrap();
    let jobs = output["jobs"].as_array().unwrap();
    assert_eq!(output["total_jobs"].as_u64(), Some(jobs.len() as u64));
    assert_eq!(jobs.len(), 5);
    assert_eq!(output["stats"]["sites_failed"].as_u64(), Some(1));
    // input order: alpha's jobs come before beta's
    assert!(jobs[0]["url"].as_str().unwrap().contains("/alpha/"));
    assert!(jobs[4]["url"].as_str().unwrap().contains("/beta/"));

    // checkpoint on disk: all sites completed, buffer flushed
    let progress = JsonFileStore::new(&config.output.progress_path, &config.output.jobs_path)
        .load_progress()
        .unwrap();
    assert_eq!(progress.completed.len(), 3);
    assert!(progress.jobs.is_empty());
    assert_eq!(progress.failed.len(), 1);
    assert!(progress.failed[0].site.ends_with("/broken"));
}

#[tokio::test]
async fn test_second_run_fetches_nothing() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path());

    mount_page(&mock_server, "/alpha", 0, listing_html(0, 2, Some(2))).await;

    let sites = vec![SiteTarget::parse(&format!("{}/alpha", mock_server.uri())).unwrap()];
    let open = || JsonFileStore::new(&config.output.progress_path, &config.output.jobs_path);

    let mut first = Coordinator::new(&config, test_fetcher(&config), open());
    first.run(&sites).await.expect("First run failed");
    let requests_after_first = mock_server.received_requests().await.unwrap().len();

    let mut second = Coordinator::new(&config, test_fetcher(&config), open());
    let outcome = second.run(&sites).await.expect("Second run failed");

    assert_eq!(
        mock_server.received_requests().await.unwrap().len(),
        requests_after_first
    );
    assert_eq!(outcome.stats.batch_sites, 0);
    assert_eq!(outcome.stats.total_jobs, 2);

    let artifact = open().load_output().unwrap().unwrap();
    assert_eq!(artifact.total_jobs(), 2);
}
