//! Crawls against a local HTTP server with the real collaborators

use forum_mirror::config::Config;
use forum_mirror::crawler::Coordinator;
use forum_mirror::{ArchiveError, SetupError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_config(server: &MockServer, archive: &Path) -> Config {
    let mut config = Config::default();
    config.archive.base_url = format!("{}/", server.uri());
    config.archive.forum_codes = vec![79];
    config.archive.archive_location = archive.to_string_lossy().into_owned();
    config.crawler.workers = 2;
    config.crawler.default_crawl_delay_ms = 10;
    config.crawler.poll_interval_ms = 5;
    config.crawler.request_timeout_secs = 5;
    config.user_agent.crawler_name = "MirrorTest".to_string();
    config
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_mirror_forum_over_http() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("archive");

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "User-agent: *\nDisallow: /forums/private/\nCrawl-delay: 0.02\n",
        ))
        .mount(&server)
        .await;

    let seed = format!(
        r#"<html><head><link rel="stylesheet" href="../archive.css"></head><body>
<a href="{base}/forums/archive/index.php/t-1.html">first thread</a>
<a href="t-2.html">second thread</a>
<a href="/forums/showthread.php?t=3">full version</a>
<a href="/forums/private/index.php/t-9.html">hidden</a>
</body></html>"#,
        base = server.uri()
    );
    mount_page(&server, "/forums/archive/index.php/f-79.html", seed).await;
    mount_page(
        &server,
        "/forums/archive/index.php/t-1.html",
        r#"<a href="f-79.html">back</a>"#.to_string(),
    )
    .await;
    mount_page(
        &server,
        "/forums/archive/index.php/t-2.html",
        "<p>second</p>".to_string(),
    )
    .await;
    mount_page(
        &server,
        "/forums/archive/archive.css",
        "body { color: black; }".to_string(),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/forums/showthread.php"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forums/private/index.php/t-9.html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut coordinator = Coordinator::from_config(server_config(&server, &archive)).unwrap();
    coordinator.setup().await.unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(coordinator.pending(), 0);
    assert_eq!(summary.pages_mirrored, 4);
    assert_eq!(summary.skipped_robots, 1);
    assert_eq!(summary.fetch_failures, 0);

    assert!(archive.join("archive/index.php/t-1.html").is_file());
    assert!(archive.join("archive/index.php/t-2.html").is_file());
    assert!(archive.join("archive/archive.css").is_file());
    assert!(!archive.join("private").exists());

    let seed_file =
        std::fs::read_to_string(archive.join("archive/index.php/f-79.html")).unwrap();
    assert!(seed_file.contains(&format!(
        r#"href="{}/archive/index.php/t-1.html""#,
        archive.display()
    )));
    assert!(seed_file.contains(r#"href="t-2.html""#));
    assert!(!seed_file.contains(&server.uri()));
}

#[tokio::test]
async fn test_setup_aborts_when_robots_txt_unavailable() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("archive");

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forums/archive/index.php/f-79.html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut coordinator = Coordinator::from_config(server_config(&server, &archive)).unwrap();
    let result = coordinator.setup().await;

    assert!(matches!(
        result,
        Err(ArchiveError::Setup(SetupError::RobotsDenied { .. }))
    ));
    assert!(!coordinator.is_prepared());
}

#[tokio::test]
async fn test_missing_robots_txt_uses_default_delay() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("archive");

    // Unmatched requests, robots.txt included, answer 404
    mount_page(
        &server,
        "/forums/archive/index.php/f-79.html",
        "<p>empty forum</p>".to_string(),
    )
    .await;

    let mut coordinator = Coordinator::from_config(server_config(&server, &archive)).unwrap();
    coordinator.setup().await.unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.pages_mirrored, 1);
    assert_eq!(summary.urls_visited, 1);
    assert!(archive.join("archive/index.php/f-79.html").is_file());
}
