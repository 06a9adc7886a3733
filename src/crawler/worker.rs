//! Crawl worker
//!
//! Each worker repeatedly claims a URL from the shared frontier, fetches it
//! under the global rate limit, queues the in-scope links it finds, writes
//! the page into the mirror, and reports the item finished.

use crate::crawler::fetcher::{describe_error, Transport};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::LinkExtractor;
use crate::crawler::scheduler::RateLimiter;
use crate::output::{CrawlStats, Mirror};
use crate::robots::RobotsPolicy;
use crate::state::{PendingCounter, WorkerState};
use crate::url::LinkFilter;
use crate::ArchiveError;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Everything the workers of one run share
pub struct CrawlContext {
    pub frontier: Frontier,
    pub pending: PendingCounter,
    pub filter: LinkFilter,
    pub mirror: Mirror,
    pub limiter: RateLimiter,
    pub stats: CrawlStats,
    pub robots: Arc<dyn RobotsPolicy>,
    pub transport: Arc<dyn Transport>,
    pub extractor: Arc<dyn LinkExtractor>,
    /// Agent token passed to the robots policy
    pub agent: String,
    /// Idle wait when the frontier is empty
    pub poll_interval: Duration,
    pub shutdown: Arc<AtomicBool>,
}

impl CrawlContext {
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

/// How a single frontier item ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Another worker already claimed the URL
    AlreadyVisited,
    /// robots.txt forbids fetching the URL
    Disallowed,
    /// No response, or a non-2xx response
    FetchFailed,
    /// Fetched, but writing the page failed
    WriteFailed,
    /// Fetched and written to the archive
    Mirrored,
}

/// One execution unit of the crawl
pub struct Worker {
    id: usize,
    state: WorkerState,
    ctx: Arc<CrawlContext>,
}

impl Worker {
    pub fn new(id: usize, ctx: Arc<CrawlContext>) -> Self {
        Self {
            id,
            state: WorkerState::Idle,
            ctx,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Runs until shutdown is signalled
    ///
    /// Shutdown is checked before each claim, so an in-flight item is always
    /// finished first.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of items processed
    /// * `Err(ArchiveError)` - The pending counter invariant was violated
    pub async fn run(mut self) -> Result<usize, ArchiveError> {
        tracing::debug!("Worker {} started", self.id);
        let mut processed = 0;

        loop {
            if self.ctx.shutdown_requested() {
                break;
            }

            let Some(url) = self.ctx.frontier.pop() else {
                tokio::time::sleep(self.ctx.poll_interval).await;
                continue;
            };

            self.process(&url).await?;
            processed += 1;
        }

        tracing::debug!("Worker {} stopped after {} items", self.id, processed);
        Ok(processed)
    }

    /// Handles one frontier item from claim to completion
    ///
    /// The pending counter is decremented exactly once, whatever the outcome.
    pub async fn process(&mut self, url: &str) -> Result<ItemOutcome, ArchiveError> {
        self.transition(WorkerState::Claimed);

        let outcome = if !self.ctx.frontier.claim(url) {
            tracing::trace!("Worker {}: {} already visited", self.id, url);
            self.ctx.stats.record_skipped_visited();
            ItemOutcome::AlreadyVisited
        } else if !self.ctx.robots.allowed(url, &self.ctx.agent).await {
            tracing::info!("URL {} disallowed by robots.txt", url);
            self.ctx.stats.record_skipped_robots();
            ItemOutcome::Disallowed
        } else {
            self.fetch_and_mirror(url).await
        };

        self.transition(WorkerState::Done);
        self.ctx.pending.decrement()?;
        self.transition(WorkerState::Idle);

        Ok(outcome)
    }

    async fn fetch_and_mirror(&mut self, url: &str) -> ItemOutcome {
        self.transition(WorkerState::Fetching);
        self.ctx.limiter.wait().await;

        let response = match self.ctx.transport.get(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, describe_error(&e));
                self.ctx.stats.record_fetch_failure();
                return ItemOutcome::FetchFailed;
            }
        };

        if !response.is_success() {
            tracing::warn!("Fetching {} returned HTTP {}", url, response.status);
            self.ctx.stats.record_fetch_failure();
            return ItemOutcome::FetchFailed;
        }
        self.ctx.stats.record_fetched();
        tracing::debug!(
            "Worker {} fetched {} ({} bytes)",
            self.id,
            url,
            response.body.len()
        );

        self.transition(WorkerState::Parsing);
        let mut enqueued = 0;
        {
            let body = String::from_utf8_lossy(&response.body);
            for link in self
                .ctx
                .extractor
                .extract_links(&body, &response.final_url)
            {
                if self.ctx.filter.in_scope(&link) && !self.ctx.frontier.is_visited(&link) {
                    self.ctx.frontier.admit(link, &self.ctx.pending);
                    enqueued += 1;
                }
            }
        }
        self.ctx.stats.record_links_enqueued(enqueued);

        self.transition(WorkerState::Mirroring);
        let final_url = response.final_url;
        let outcome = match self.mirror(final_url.clone(), response.body).await {
            Ok(path) => {
                tracing::debug!("Mirrored {} to {}", url, path.display());
                self.ctx.stats.record_mirrored();
                ItemOutcome::Mirrored
            }
            Err(e) => {
                tracing::warn!("Failed to mirror {}: {}", url, e);
                self.ctx.stats.record_write_failure();
                ItemOutcome::WriteFailed
            }
        };

        self.ctx.frontier.mark_visited(url);
        if final_url != url {
            self.ctx.frontier.mark_visited(&final_url);
        }

        outcome
    }

    /// Writes the page into the archive on the blocking thread pool
    async fn mirror(&self, final_url: String, body: Vec<u8>) -> io::Result<PathBuf> {
        let ctx = Arc::clone(&self.ctx);
        tokio::task::spawn_blocking(move || ctx.mirror.write(&final_url, &body))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }

    fn transition(&mut self, next: WorkerState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid worker transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!("Worker {}: {} -> {}", self.id, self.state, next);
        self.state = next;
    }
}
