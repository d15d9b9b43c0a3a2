//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the platform's nav and search
//! endpoints and run the full crawl cycle end-to-end.

use serde_json::{json, Value};
use std::sync::Mutex;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use vlist_crawler::config::{Config, CrawlerConfig, EndpointConfig, OutputConfig};
use vlist_crawler::credentials::{parse_credentials, CredentialSet};
use vlist_crawler::crawler::{run_crawl, LogProgress, ProgressSink};
use vlist_crawler::output::write_outputs;
use vlist_crawler::{CrawlError, FetchError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/x/space/wbi/arc/search";
const NAV_PATH: &str = "/x/web-interface/nav";
const COOKIE: &str = "SESSDATA=sess%2Ctoken; bili_jct=csrf; buvid3=device-infoc";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output_dir: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            pacing_delay_ms: 10, // Very short for testing
            ..CrawlerConfig::default()
        },
        endpoint: EndpointConfig {
            search_url: format!("{}{}", base_url, SEARCH_PATH),
            nav_url: format!("{}{}", base_url, NAV_PATH),
            user_agent: "TestBot/1.0".to_string(),
            referer: "https://space.example.com/".to_string(),
        },
        output: OutputConfig {
            directory: output_dir.to_string(),
            ..OutputConfig::default()
        },
        ..Config::default()
    }
}

fn credentials() -> CredentialSet {
    parse_credentials(COOKIE).expect("test cookie should parse")
}

/// Builds a search response for `page` of a catalogue of `total` videos
fn search_page(page: u64, page_size: u64, total: u64) -> Value {
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);
    let vlist: Vec<Value> = (start..end)
        .map(|i| {
            json!({
                "aid": 1000 + i,
                "bvid": format!("BV{}", i),
                "title": format!("Video {}", i),
                "play": i * 10,
                "length": "05:00",
            })
        })
        .collect();

    json!({
        "code": 0,
        "message": "0",
        "ttl": 1,
        "data": {
            "list": { "tlist": {}, "vlist": vlist },
            "page": { "pn": page, "ps": page_size, "count": total }
        }
    })
}

async fn mount_nav(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(NAV_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {
                "wbi_img": {
                    "img_url": "https://i0.hdslb.com/bfs/wbi/7cd084941338484aae1ad9425b84077c.png",
                    "sub_url": "https://i0.hdslb.com/bfs/wbi/4932caff0ff746eab6f01bf08b70ac45.png"
                }
            }
        })))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page: u64, body: Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("mid", "546195"))
        .and(query_param("pn", page.to_string()))
        .and(header("cookie", COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[derive(Default)]
struct RecordingProgress {
    reports: Mutex<Vec<(u32, u32)>>,
}

impl ProgressSink for RecordingProgress {
    fn report(&self, pages_completed: u32, pages_total: u32) {
        self.reports
            .lock()
            .unwrap()
            .push((pages_completed, pages_total));
    }
}

/// Search requests received by the mock, as page numbers in arrival order
async fn requested_pages(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .iter()
        .filter(|r| r.url.path() == SEARCH_PATH)
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "pn")
                .map(|(_, v)| v.into_owned())
        })
        .collect()
}

#[tokio::test]
async fn test_full_crawl_three_pages() {
    let mock_server = MockServer::start().await;
    mount_nav(&mock_server).await;
    for page in 1..=3 {
        mount_page(&mock_server, page, search_page(page, 30, 65), 1).await;
    }

    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(
        &mock_server.uri(),
        output_dir.path().to_str().expect("utf-8 temp path"),
    );

    let progress = RecordingProgress::default();
    let outcome = run_crawl(&config, "546195", &credentials(), &progress, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.page_count, 3);
    assert_eq!(
        *progress.reports.lock().unwrap(),
        vec![(1, 3), (2, 3), (3, 3)]
    );
    assert_eq!(outcome.reported_total, 65);
    assert_eq!(outcome.aggregate.len(), 65);
    assert_eq!(requested_pages(&mock_server).await, vec!["1", "2", "3"]);

    let titles: Vec<String> = outcome
        .aggregate
        .records()
        .iter()
        .map(|r| r.title.clone())
        .collect();
    let expected: Vec<String> = (0..65).map(|i| format!("Video {}", i)).collect();
    assert_eq!(titles, expected);
    assert_eq!(outcome.aggregate.records()[64].play_count, 640);

    // Every search request carries the signature fields
    for request in mock_server.received_requests().await.unwrap() {
        if request.url.path() == SEARCH_PATH {
            let names: Vec<String> = request
                .url
                .query_pairs()
                .map(|(k, _)| k.into_owned())
                .collect();
            assert!(names.contains(&"wts".to_string()));
            assert!(names.contains(&"w_rid".to_string()));
            assert!(names.contains(&"dm_img_str".to_string()));
        }
    }

    let paths = write_outputs(
        &outcome.aggregate,
        &outcome.creator_id,
        &config.output,
        &chrono::Local::now(),
    )
    .expect("Failed to write outputs");

    let csv = std::fs::read_to_string(paths.csv.expect("csv path")).unwrap();
    assert_eq!(csv.lines().count(), 66);

    let raw: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(paths.raw_json.expect("raw path")).unwrap())
            .unwrap();
    assert_eq!(raw.len(), 65);
    assert_eq!(raw[0]["bvid"], "BV0");
}

#[tokio::test]
async fn test_failure_on_page_two_aborts_crawl() {
    let mock_server = MockServer::start().await;
    mount_nav(&mock_server).await;
    mount_page(&mock_server, 1, search_page(1, 30, 75), 1).await;
    mount_page(
        &mock_server,
        2,
        json!({ "code": -101, "message": "账号未登录", "ttl": 1 }),
        1,
    )
    .await;
    mount_page(&mock_server, 3, search_page(3, 30, 75), 0).await;

    let config = create_test_config(&mock_server.uri(), "unused");
    let result = run_crawl(&config, "546195", &credentials(), &LogProgress, CancellationToken::new()).await;

    match result {
        Err(CrawlError::Fetch(FetchError::Api { page, code, .. })) => {
            assert_eq!(page, 2);
            assert_eq!(code, -101);
        }
        other => panic!("Expected API error on page 2, got {:?}", other),
    }
    assert_eq!(requested_pages(&mock_server).await, vec!["1", "2"]);
}

#[tokio::test]
async fn test_page_without_video_list_aborts_crawl() {
    let mock_server = MockServer::start().await;
    mount_nav(&mock_server).await;
    mount_page(&mock_server, 1, search_page(1, 30, 75), 1).await;
    mount_page(
        &mock_server,
        2,
        json!({
            "code": 0,
            "message": "0",
            "data": {
                "list": { "tlist": {} },
                "page": { "pn": 2, "ps": 30, "count": 75 }
            }
        }),
        1,
    )
    .await;
    mount_page(&mock_server, 3, search_page(3, 30, 75), 0).await;

    let config = create_test_config(&mock_server.uri(), "unused");
    let result = run_crawl(&config, "546195", &credentials(), &LogProgress, CancellationToken::new()).await;

    match result {
        Err(CrawlError::Fetch(e)) => {
            assert!(e.is_envelope(), "expected envelope error, got {:?}", e);
            assert_eq!(e.page(), 2);
        }
        other => panic!("Expected envelope error on page 2, got {:?}", other),
    }
    assert_eq!(requested_pages(&mock_server).await, vec!["1", "2"]);
}

#[tokio::test]
async fn test_rate_limited_status_aborts_crawl() {
    let mock_server = MockServer::start().await;
    mount_nav(&mock_server).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(412))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "unused");
    let result = run_crawl(&config, "546195", &credentials(), &LogProgress, CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(CrawlError::Fetch(FetchError::Status { page: 1, status: 412 }))
    ));
}

#[tokio::test]
async fn test_missing_cookie_makes_no_requests() {
    let mock_server = MockServer::start().await;
    mount_nav(&mock_server).await;
    mount_page(&mock_server, 1, search_page(1, 30, 10), 0).await;

    let config = create_test_config(&mock_server.uri(), "unused");
    let incomplete = CredentialSet::from_pairs([("SESSDATA", "sess"), ("buvid3", "device")]);

    let result = run_crawl(&config, "546195", &incomplete, &LogProgress, CancellationToken::new()).await;

    assert!(matches!(result, Err(CrawlError::MissingCredential(_))));
    let received = mock_server.received_requests().await.unwrap();
    assert!(received.is_empty(), "expected no requests, got {}", received.len());
}

#[tokio::test]
async fn test_empty_catalogue() {
    let mock_server = MockServer::start().await;
    mount_nav(&mock_server).await;
    mount_page(&mock_server, 1, search_page(1, 30, 0), 1).await;

    let config = create_test_config(&mock_server.uri(), "unused");
    let outcome = run_crawl(&config, "546195", &credentials(), &LogProgress, CancellationToken::new())
        .await
        .expect("Empty catalogue should not be an error");

    assert!(outcome.aggregate.is_empty());
    assert_eq!(outcome.page_count, 1);
    assert_eq!(requested_pages(&mock_server).await, vec!["1"]);
}
