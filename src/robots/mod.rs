//! Robots.txt handling module
//!
//! This module answers the two questions the crawler asks of a site's
//! politeness rules: may this agent fetch this URL, and how long must it wait
//! between requests. `RobotsTxtPolicy` fetches, parses and caches robots.txt
//! per origin.

mod cache;
mod parser;

pub use cache::CachedRobots;
pub use parser::ParsedRobots;

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// Source of crawl permissions and crawl delays
#[async_trait]
pub trait RobotsPolicy: Send + Sync {
    /// Returns true if `agent` may fetch `url`
    async fn allowed(&self, url: &str, agent: &str) -> bool;

    /// Returns the crawl delay `agent` must observe on `url`'s site, if any
    async fn delay(&self, url: &str, agent: &str) -> Option<Duration>;
}

/// `RobotsPolicy` that reads each origin's `/robots.txt` over HTTP
///
/// | robots.txt response | Policy |
/// |---------------------|--------|
/// | 2xx | Parsed content |
/// | 4xx | Allow everything |
/// | 5xx | Disallow everything |
/// | Transport error | Allow everything |
pub struct RobotsTxtPolicy {
    client: Client,
    cache: Mutex<HashMap<String, CachedRobots>>,
}

impl RobotsTxtPolicy {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the robots rules for `url`'s origin, fetching them if needed
    ///
    /// The cache lock is not held during the fetch. Two concurrent misses for
    /// the same origin may both fetch; the later answer replaces the earlier.
    pub async fn robots_for(&self, url: &str) -> Arc<ParsedRobots> {
        let Ok(parsed) = Url::parse(url) else {
            return Arc::new(ParsedRobots::allow_all());
        };
        let origin = parsed.origin().ascii_serialization();

        {
            let cache = self.cache.lock().await;
            if let Some(cached) = cache.get(&origin) {
                if !cached.is_stale() {
                    return Arc::clone(&cached.content);
                }
                tracing::debug!("Cached robots.txt for {} is stale, refetching", origin);
            }
        }

        let entry = CachedRobots::new(fetch_robots(&self.client, &origin).await);
        let robots = Arc::clone(&entry.content);
        self.cache.lock().await.insert(origin, entry);
        robots
    }
}

#[async_trait]
impl RobotsPolicy for RobotsTxtPolicy {
    async fn allowed(&self, url: &str, agent: &str) -> bool {
        self.robots_for(url).await.is_allowed(url, agent)
    }

    async fn delay(&self, url: &str, agent: &str) -> Option<Duration> {
        self.robots_for(url).await.crawl_delay(agent)
    }
}

/// Fetches robots.txt for an origin such as `http://example.com`
pub async fn fetch_robots(client: &Client, origin: &str) -> ParsedRobots {
    let robots_url = format!("{}/robots.txt", origin);
    tracing::debug!("Fetching {}", robots_url);

    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Could not fetch {}: {}; assuming allow-all", robots_url, e);
            return ParsedRobots::allow_all();
        }
    };

    let status = response.status();
    if status.is_server_error() {
        tracing::warn!("{} returned {}; assuming disallow-all", robots_url, status);
        return ParsedRobots::disallow_all();
    }
    if !status.is_success() {
        tracing::debug!("{} returned {}; assuming allow-all", robots_url, status);
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            tracing::warn!("Could not read {}: {}; assuming allow-all", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}
