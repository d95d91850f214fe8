//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! engine against them, writing into temporary output directories.

use site_mirror::config::{Config, FrontierOrder};
use site_mirror::{CrawlError, CrawlSummary, Engine};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Upper bound for any crawl in these tests
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html")
}

fn text(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/plain")
}

async fn mount(server: &MockServer, at: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

/// Directory the mock server's pages are mirrored into
fn site_dir(out: &Path, server: &MockServer) -> PathBuf {
    let address = server.address();
    out.join(format!("{}:{}", address.ip(), address.port()))
}

async fn crawl(engine: &mut Engine) -> Result<CrawlSummary, CrawlError> {
    engine.start();
    tokio::time::timeout(DRAIN_TIMEOUT, engine.wait_until_drained())
        .await
        .expect("crawl did not drain in time")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mirror_small_site() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount(
        &server,
        "/site/",
        html(r#"<html><body><a href="a">A</a></body></html>"#),
        1,
    )
    .await;
    mount(
        &server,
        "/site/a",
        html(
            r#"<html><head><link rel="stylesheet" href="b"></head>
            <body><a href="https://other.com/x">elsewhere</a></body></html>"#,
        ),
        1,
    )
    .await;
    mount(&server, "/site/b", text("plain text, no links"), 1).await;

    let root = format!("{}/site/", server.uri());
    let mut engine = Engine::new(&root, out.path(), 2).unwrap();
    let summary = crawl(&mut engine).await.unwrap();

    let site = site_dir(out.path(), &server);
    assert!(site.join("site/index.html").is_file());
    assert!(site.join("site/a.html").is_file());
    assert_eq!(
        std::fs::read_to_string(site.join("site/b.html")).unwrap(),
        "plain text, no links"
    );
    assert!(!out.path().join("other.com").exists());

    assert_eq!(summary.urls_seen, 3);
    assert_eq!(summary.urls_completed, 3);
    assert_eq!(summary.files_saved, 3);
    assert_eq!(summary.failed, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_links_outside_root_path_not_fetched() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount(
        &server,
        "/a",
        html(r#"<a href="/b">b</a><a href="https://other.com/x">x</a>"#),
        1,
    )
    .await;
    mount(&server, "/b", text("out of scope"), 0).await;

    let root = format!("{}/a", server.uri());
    let mut engine = Engine::new(&root, out.path(), 2).unwrap();
    let summary = crawl(&mut engine).await.unwrap();

    let site = site_dir(out.path(), &server);
    assert!(site.join("a.html").is_file());
    assert!(!site.join("b.html").exists());
    assert_eq!(summary.urls_seen, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_page_fetched_once() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    let pages = 20;

    // Every page links to the hub and to every other page.
    let all_links: String = (0..pages)
        .map(|i| format!(r#"<a href="/hub/p{}">p{}</a>"#, i, i))
        .collect();

    mount(&server, "/hub/", html(all_links.clone()), 1).await;
    for i in 0..pages {
        let body = format!(r#"<a href="/hub/">hub</a><a href="./">self dir</a>{}"#, all_links);
        mount(&server, &format!("/hub/p{}", i), html(body), 1).await;
    }

    let root = format!("{}/hub/", server.uri());
    let mut engine = Engine::new(&root, out.path(), 8).unwrap();
    let summary = crawl(&mut engine).await.unwrap();

    assert_eq!(summary.urls_seen, pages + 1);
    assert_eq!(summary.urls_completed, pages + 1);
    assert_eq!(summary.files_saved, pages + 1);
    // Mock expectations (one call each) are verified when the server drops.
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_errors_and_binary_content_not_saved() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount(
        &server,
        "/mix/",
        html(
            r#"<a href="missing">gone</a>
            <a href="logo.png">logo</a>
            <link rel="stylesheet" href="style.css">"#,
        ),
        1,
    )
    .await;
    mount(&server, "/mix/missing", ResponseTemplate::new(404), 1).await;
    mount(
        &server,
        "/mix/logo.png",
        ResponseTemplate::new(200).set_body_raw(vec![0x89, b'P', b'N', b'G'], "image/png"),
        1,
    )
    .await;
    mount(
        &server,
        "/mix/style.css",
        ResponseTemplate::new(200).set_body_raw("body { color: black }", "text/css"),
        1,
    )
    .await;

    let root = format!("{}/mix/", server.uri());
    let mut engine = Engine::new(&root, out.path(), 3).unwrap();
    let summary = crawl(&mut engine).await.unwrap();

    let site = site_dir(out.path(), &server);
    assert!(site.join("mix/index.html").is_file());
    assert!(site.join("mix/style.css").is_file());
    assert!(!site.join("mix/missing.html").exists());
    assert!(!site.join("mix/logo.png").exists());

    assert_eq!(summary.urls_completed, 4);
    assert_eq!(summary.files_saved, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_large_page_saved_intact_while_extracting() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    let mut body = String::from("<html><head><title>big</title></head><body>\n");
    for i in 0..20_000 {
        body.push_str(&format!("<p class=\"row\">paragraph {} caf\u{e9} \u{2603}</p>\n", i));
    }
    body.push_str("<a href=\"tail\">last link</a></body></html>\n");

    mount(&server, "/big/", html(body.clone()), 1).await;
    mount(&server, "/big/tail", text("found"), 1).await;

    let root = format!("{}/big/", server.uri());
    let mut engine = Engine::new(&root, out.path(), 2).unwrap();
    let summary = crawl(&mut engine).await.unwrap();

    let site = site_dir(out.path(), &server);
    let saved = std::fs::read(site.join("big/index.html")).unwrap();
    assert_eq!(saved.len(), body.len());
    assert!(saved == body.as_bytes());
    assert!(site.join("big/tail.html").is_file());
    assert_eq!(summary.urls_seen, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_breadth_first_config_drains() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount(
        &server,
        "/docs/",
        html(r#"<a href="one/">1</a><a href="two/">2</a>"#),
        1,
    )
    .await;
    mount(&server, "/docs/one/", html(r#"<a href="../two/">2</a>"#), 1).await;
    mount(&server, "/docs/two/", html(r#"<a href="../one/">1</a>"#), 1).await;

    let mut config = Config::default();
    config.crawler.root_url = format!("{}/docs/", server.uri());
    config.crawler.workers = 4;
    config.crawler.order = FrontierOrder::BreadthFirst;
    config.output.directory = out.path().to_string_lossy().into_owned();

    let mut engine = Engine::from_config(&config).unwrap();
    let summary = crawl(&mut engine).await.unwrap();

    let site = site_dir(out.path(), &server);
    assert!(site.join("docs/one/index.html").is_file());
    assert!(site.join("docs/two/index.html").is_file());
    assert_eq!(summary.urls_completed, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_status_observer_sees_progress() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount(&server, "/obs/", html(r#"<a href="leaf">leaf</a>"#), 1).await;
    mount(&server, "/obs/leaf", text("leaf"), 1).await;

    let reports = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = reports.clone();
    let root = format!("{}/obs/", server.uri());
    let mut engine = Engine::new(&root, out.path(), 1)
        .unwrap()
        .with_status_observer(move |report| sink.lock().unwrap().push(report));

    crawl(&mut engine).await.unwrap();

    let reports = reports.lock().unwrap();
    let last = reports.last().unwrap();
    assert!(last.frontier.is_drained());
    assert_eq!(last.frontier.seen, 2);
    if cfg!(target_os = "linux") {
        assert!(reports.iter().all(|report| report.physical_mem.is_some()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unwritable_output_stops_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, b"file").unwrap();

    mount(&server, "/w/", html("<p>no links</p>"), 1).await;

    let root = format!("{}/w/", server.uri());
    let mut engine = Engine::new(&root, &blocker, 2).unwrap();
    let result = crawl(&mut engine).await;

    assert!(matches!(result, Err(CrawlError::Save { .. })));
}

#[test]
fn test_drains_with_single_blocking_thread() {
    // File writes and link extraction must not compete for one pool slot.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .max_blocking_threads(1)
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        let server = MockServer::start().await;
        let out = TempDir::new().unwrap();

        mount(&server, "/p/", html(r#"<a href="x">x</a>"#), 1).await;
        mount(&server, "/p/x", html("<p>leaf</p>"), 1).await;

        let root = format!("{}/p/", server.uri());
        let mut engine = Engine::new(&root, out.path(), 2).unwrap();
        let summary = crawl(&mut engine).await.unwrap();

        let site = site_dir(out.path(), &server);
        assert!(site.join("p/index.html").is_file());
        assert!(site.join("p/x.html").is_file());
        assert_eq!(summary.files_saved, 2);
    });
}

#[test]
fn test_invalid_root_url_fails_construction() {
    assert!(matches!(
        Engine::new("::not a url::", "/tmp/crawl", 2),
        Err(CrawlError::InvalidRootUrl { .. })
    ));
}
