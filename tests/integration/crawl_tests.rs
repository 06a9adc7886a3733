//! End-to-end crawl tests with in-memory collaborators
//!
//! These tests replace robots.txt, HTTP and HTML parsing with fakes so the
//! full coordinator/worker cycle runs without a network.

use async_trait::async_trait;
use forum_mirror::config::Config;
use forum_mirror::crawler::{Coordinator, FetchResponse, LinkExtractor, Transport};
use forum_mirror::robots::RobotsPolicy;
use forum_mirror::{ArchiveError, SetupError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

const SEED: &str = "http://forum.test/forums/archive/index.php/f-79.html";
const THREAD_1: &str = "http://forum.test/forums/archive/index.php/t-1.html";
const THREAD_2: &str = "http://forum.test/forums/archive/index.php/t-2.html";
const OUT_OF_SCOPE: &str = "http://forum.test/forums/showthread.php?t=1";

struct FakeRobots {
    allow: bool,
    delay: Option<Duration>,
    calls: Mutex<usize>,
}

impl FakeRobots {
    fn allowing() -> Self {
        Self {
            allow: true,
            delay: Some(Duration::from_millis(5)),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl RobotsPolicy for FakeRobots {
    async fn allowed(&self, _url: &str, _agent: &str) -> bool {
        *self.calls.lock().unwrap() += 1;
        self.allow
    }

    async fn delay(&self, _url: &str, _agent: &str) -> Option<Duration> {
        self.delay
    }
}

#[derive(Default)]
struct FakeTransport {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    fn with_pages(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> Result<FetchResponse, ArchiveError> {
        self.requests.lock().unwrap().push(url.to_string());
        let (status, body) = match self.pages.get(url) {
            Some(body) => (200, body.clone()),
            None => (404, String::new()),
        };
        Ok(FetchResponse {
            status,
            final_url: url.to_string(),
            body: body.into_bytes(),
        })
    }
}

/// Every line of the body is a link
struct LineExtractor;

impl LinkExtractor for LineExtractor {
    fn extract_links(&self, body: &str, _base_url: &str) -> Vec<String> {
        body.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()
    }
}

fn test_config(archive: &Path, workers: u32) -> Config {
    let mut config = Config::default();
    config.archive.base_url = "http://forum.test/".to_string();
    config.archive.forum_codes = vec![79];
    config.archive.archive_location = archive.to_string_lossy().into_owned();
    config.crawler.workers = workers;
    config.crawler.poll_interval_ms = 5;
    config.crawler.shutdown_grace_ms = Some(10);
    config
}

fn coordinator(config: Config, robots: Arc<FakeRobots>, transport: Arc<FakeTransport>) -> Coordinator {
    Coordinator::new(config, robots, transport, Arc::new(LineExtractor))
}

fn count_files(dir: &Path) -> usize {
    let mut count = 0;
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            count += count_files(&path);
        } else {
            count += 1;
        }
    }
    count
}

#[tokio::test]
async fn test_drain_single_seed() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("archive");

    let transport = Arc::new(FakeTransport::with_pages(&[
        (SEED, format!("{}\n{}\n{}", THREAD_1, THREAD_2, OUT_OF_SCOPE).as_str()),
        (THREAD_1, "<p>one</p>"),
        (THREAD_2, "<p>two</p>"),
    ]));
    let robots = Arc::new(FakeRobots::allowing());

    let mut coordinator = coordinator(test_config(&archive, 2), robots, Arc::clone(&transport));
    coordinator.setup().await.expect("setup failed");
    assert_eq!(coordinator.pending(), 1);

    let summary = coordinator.run().await.expect("crawl failed");

    assert_eq!(coordinator.pending(), 0);
    let frontier = coordinator.frontier().unwrap();
    assert_eq!(
        frontier.visited_urls(),
        vec![SEED.to_string(), THREAD_1.to_string(), THREAD_2.to_string()]
    );

    assert_eq!(count_files(&archive), 3);
    assert!(archive.join("archive/index.php/f-79.html").is_file());
    assert!(archive.join("archive/index.php/t-1.html").is_file());
    assert!(archive.join("archive/index.php/t-2.html").is_file());

    assert!(!transport.requested().contains(&OUT_OF_SCOPE.to_string()));
    assert_eq!(transport.requested().len(), 3);

    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.pages_mirrored, 3);
    assert_eq!(summary.links_enqueued, 2);
    assert_eq!(summary.urls_visited, 3);
}

#[tokio::test]
async fn test_seed_links_are_rewritten_on_disk() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("archive");

    let transport = Arc::new(FakeTransport::with_pages(&[(SEED, THREAD_1)]));
    let robots = Arc::new(FakeRobots::allowing());

    let mut coordinator = coordinator(test_config(&archive, 1), robots, Arc::clone(&transport));
    coordinator.setup().await.unwrap();
    coordinator.run().await.unwrap();

    let seed_file = std::fs::read_to_string(archive.join("archive/index.php/f-79.html")).unwrap();
    assert_eq!(
        seed_file,
        format!("{}/archive/index.php/t-1.html", archive.display())
    );
}

#[tokio::test]
async fn test_cycles_and_duplicates_terminate() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("archive");

    // Every page links to every page, including itself
    let all = format!("{}\n{}\n{}", SEED, THREAD_1, THREAD_2);
    let transport = Arc::new(FakeTransport::with_pages(&[
        (SEED, all.as_str()),
        (THREAD_1, all.as_str()),
        (THREAD_2, all.as_str()),
    ]));
    let robots = Arc::new(FakeRobots::allowing());

    let mut coordinator = coordinator(test_config(&archive, 4), robots, Arc::clone(&transport));
    coordinator.setup().await.unwrap();
    let summary = tokio::time::timeout(Duration::from_secs(10), coordinator.run())
        .await
        .expect("crawl did not terminate")
        .unwrap();

    assert_eq!(coordinator.pending(), 0);
    assert_eq!(summary.urls_visited, 3);

    let mut requested = transport.requested();
    requested.sort();
    requested.dedup();
    assert_eq!(requested.len(), transport.requested().len(), "a URL was fetched twice");
}

#[tokio::test]
async fn test_failed_fetches_do_not_stop_the_crawl() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("archive");

    // THREAD_2 is missing and answers 404
    let transport = Arc::new(FakeTransport::with_pages(&[
        (SEED, format!("{}\n{}", THREAD_1, THREAD_2).as_str()),
        (THREAD_1, "ok"),
    ]));
    let robots = Arc::new(FakeRobots::allowing());

    let mut coordinator = coordinator(test_config(&archive, 2), robots, transport);
    coordinator.setup().await.unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.pages_mirrored, 2);
    assert_eq!(summary.urls_visited, 3);
    assert!(!archive.join("archive/index.php/t-2.html").exists());
}

#[tokio::test]
async fn test_setup_aborts_on_non_empty_archive() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("leftover.html"), "old").unwrap();

    let transport = Arc::new(FakeTransport::default());
    let robots = Arc::new(FakeRobots::allowing());
    let mut coordinator = coordinator(test_config(dir.path(), 2), Arc::clone(&robots), Arc::clone(&transport));

    let result = coordinator.setup().await;
    assert!(matches!(
        result,
        Err(ArchiveError::Setup(SetupError::NotEmpty(_)))
    ));
    assert!(!coordinator.is_prepared());
    assert_eq!(coordinator.pending(), 0);
    assert_eq!(*robots.calls.lock().unwrap(), 0);

    // No workers can be started for a failed setup
    assert!(coordinator.run().await.is_err());
    assert!(transport.requested().is_empty());
}

#[tokio::test]
async fn test_zero_workers_fails_setup_instead_of_hanging() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("archive");

    let transport = Arc::new(FakeTransport::with_pages(&[(SEED, "")]));
    let robots = Arc::new(FakeRobots::allowing());
    let mut coordinator = coordinator(test_config(&archive, 0), Arc::clone(&robots), transport);

    assert!(matches!(
        coordinator.setup().await,
        Err(ArchiveError::Config(_))
    ));
    assert_eq!(coordinator.pending(), 0);
    assert_eq!(*robots.calls.lock().unwrap(), 0);

    let result = tokio::time::timeout(Duration::from_secs(2), coordinator.run())
        .await
        .expect("run did not return");
    assert!(result.is_err());
}

#[tokio::test]
async fn test_setup_aborts_when_robots_disallow() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("archive");

    let robots = Arc::new(FakeRobots {
        allow: false,
        delay: None,
        calls: Mutex::new(0),
    });
    let transport = Arc::new(FakeTransport::default());
    let mut coordinator = coordinator(test_config(&archive, 1), robots, Arc::clone(&transport));

    let result = coordinator.setup().await;
    assert!(matches!(
        result,
        Err(ArchiveError::Setup(SetupError::RobotsDenied { .. }))
    ));
    assert!(!coordinator.is_prepared());
    assert!(transport.requested().is_empty());
}

#[tokio::test]
async fn test_requests_respect_crawl_delay() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("archive");

    let transport = Arc::new(FakeTransport::with_pages(&[
        (SEED, format!("{}\n{}", THREAD_1, THREAD_2).as_str()),
        (THREAD_1, "one"),
        (THREAD_2, "two"),
    ]));
    let robots = Arc::new(FakeRobots {
        allow: true,
        delay: Some(Duration::from_millis(50)),
        calls: Mutex::new(0),
    });

    let mut coordinator = coordinator(test_config(&archive, 3), robots, transport);
    coordinator.setup().await.unwrap();

    let start = std::time::Instant::now();
    coordinator.run().await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_teardown_before_run_abandons_queued_urls() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("archive");

    let transport = Arc::new(FakeTransport::with_pages(&[(SEED, "")]));
    let robots = Arc::new(FakeRobots::allowing());
    let mut coordinator = coordinator(test_config(&archive, 2), robots, Arc::clone(&transport));
    coordinator.setup().await.unwrap();

    assert!(coordinator.teardown());
    assert!(!coordinator.teardown());

    let summary = coordinator.run().await.unwrap();
    assert_eq!(summary.pages_fetched, 0);
    assert_eq!(coordinator.pending(), 1);
    assert!(transport.requested().is_empty());
}
