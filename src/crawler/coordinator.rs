//! Crawler coordinator - crawl lifecycle
//!
//! This module owns one mirror run from start to finish:
//! - Validating the archive directory
//! - Building scope patterns and seeding the frontier
//! - Reading permission and crawl delay from robots.txt
//! - Starting the workers and detecting that no work is left
//! - Signalling shutdown

use crate::config::{validate, Config};
use crate::crawler::fetcher::{build_http_client, ReqwestTransport, Transport};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::scheduler::RateLimiter;
use crate::crawler::worker::{CrawlContext, Worker};
use crate::output::{CrawlStats, CrawlSummary, Mirror};
use crate::robots::{RobotsPolicy, RobotsTxtPolicy};
use crate::state::PendingCounter;
use crate::url::{seed_urls, LinkFilter};
use crate::{ArchiveError, SetupError};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Cloneable handle that requests shutdown of a run
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Requests shutdown; returns true only for the call that set the signal
    pub fn signal(&self) -> bool {
        self.flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_signalled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    robots: Arc<dyn RobotsPolicy>,
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn LinkExtractor>,
    shutdown: ShutdownHandle,
    context: Option<Arc<CrawlContext>>,
}

impl Coordinator {
    /// Creates a coordinator around explicit collaborators
    pub fn new(
        config: Config,
        robots: Arc<dyn RobotsPolicy>,
        transport: Arc<dyn Transport>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Self {
        Self {
            config,
            robots,
            transport,
            extractor,
            shutdown: ShutdownHandle::default(),
            context: None,
        }
    }

    /// Creates a coordinator that talks to the real site
    ///
    /// Page fetches and robots.txt fetches share one HTTP client carrying the
    /// configured User-Agent.
    pub fn from_config(config: Config) -> Result<Self, ArchiveError> {
        let timeout = Duration::from_secs(config.crawler.request_timeout_secs);
        let client = build_http_client(&config.user_agent, timeout)?;

        let robots = Arc::new(RobotsTxtPolicy::new(client.clone()));
        let transport = Arc::new(ReqwestTransport::with_client(client));

        Ok(Self::new(
            config,
            robots,
            transport,
            Arc::new(HtmlLinkExtractor),
        ))
    }

    /// Handle for signalling shutdown from another task (e.g. Ctrl-C)
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Prepares a run; no worker is started until [`Coordinator::run`]
    ///
    /// Any failure, an invalid configuration included, leaves the coordinator
    /// without a prepared run.
    pub async fn setup(&mut self) -> Result<(), ArchiveError> {
        validate(&self.config)?;

        let archive = &self.config.archive;
        let root = Path::new(&archive.archive_location);

        prepare_archive_dir(root)?;

        let filter = LinkFilter::new(&archive.forum_codes)?;

        let frontier = Frontier::new();
        let pending = PendingCounter::new();
        for seed in seed_urls(archive)? {
            tracing::debug!("Seeding {}", seed);
            frontier.admit(seed, &pending);
        }

        let base_url = Url::parse(&archive.base_url)
            .map_err(|e| SetupError::InvalidBaseUrl(format!("{}: {}", archive.base_url, e)))?;
        let agent = self.config.user_agent.robots_agent().to_string();
        if !self.robots.allowed(base_url.as_str(), &agent).await {
            let err = SetupError::RobotsDenied {
                url: base_url.to_string(),
                agent,
            };
            tracing::error!("{}", err);
            return Err(err.into());
        }

        let delay = match self.robots.delay(base_url.as_str(), &agent).await {
            Some(delay) => {
                tracing::info!("robots.txt crawl delay: {:?}", delay);
                delay
            }
            None => {
                let delay = Duration::from_millis(self.config.crawler.default_crawl_delay_ms);
                tracing::info!("No crawl delay in robots.txt, using {:?}", delay);
                delay
            }
        };

        let workers = self.config.crawler.workers as usize;
        let limiter = RateLimiter::new(delay, workers);

        let mirror_origin = base_url.join(&archive.mirror_prefix)?;
        let mirror = Mirror::new(&mirror_origin, root)?;

        tracing::info!(
            "Prepared run: {} seed URLs, {} scope patterns, mirroring {} into {}",
            frontier.len(),
            filter.patterns().count(),
            mirror_origin,
            root.display()
        );

        self.context = Some(Arc::new(CrawlContext {
            frontier,
            pending,
            filter,
            mirror,
            limiter,
            stats: CrawlStats::new(),
            robots: Arc::clone(&self.robots),
            transport: Arc::clone(&self.transport),
            extractor: Arc::clone(&self.extractor),
            agent,
            poll_interval: Duration::from_millis(self.config.crawler.poll_interval_ms),
            shutdown: Arc::clone(&self.shutdown.flag),
        }));

        Ok(())
    }

    /// Runs the workers until no work is outstanding, then shuts them down
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The frontier was drained (or shutdown was requested)
    /// * `Err(ArchiveError)` - `setup` was not run, or a worker hit an invariant violation
    pub async fn run(&mut self) -> Result<CrawlSummary, ArchiveError> {
        let ctx = self.context.clone().ok_or_else(|| {
            ArchiveError::InvariantViolation("run called without a successful setup".to_string())
        })?;

        let start_time = Instant::now();
        let workers = self.config.crawler.workers as usize;
        tracing::info!(
            "Starting {} workers with a crawl delay of {:?}",
            workers,
            ctx.limiter.delay()
        );

        let handles: Vec<_> = (0..workers)
            .map(|id| tokio::spawn(Worker::new(id, Arc::clone(&ctx)).run()))
            .collect();

        let mut last_report = Instant::now();
        while !ctx.pending.is_empty() && !ctx.shutdown_requested() {
            // A worker only stops early if it failed
            if handles.iter().any(|h| h.is_finished()) {
                tracing::error!("A worker stopped before the crawl finished");
                break;
            }

            if last_report.elapsed() >= Duration::from_secs(30) {
                tracing::info!(
                    "Progress: {} visited, {} queued, {} pending",
                    ctx.frontier.visited_count(),
                    ctx.frontier.len(),
                    ctx.pending.value()
                );
                last_report = Instant::now();
            }

            tokio::time::sleep(ctx.poll_interval).await;
        }

        if ctx.pending.is_empty() {
            tracing::info!("Frontier exhausted, shutting down workers");
        }
        self.teardown();

        let grace = self
            .config
            .crawler
            .shutdown_grace_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| ctx.limiter.delay());
        ctx.limiter.flush(grace).await;

        let mut first_error = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    tracing::error!("Worker failed: {}", e);
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    tracing::error!("Worker task panicked: {}", e);
                    first_error.get_or_insert(e.into());
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let summary = ctx
            .stats
            .snapshot(ctx.frontier.visited_count(), start_time.elapsed());
        tracing::info!(
            "Crawl completed: {} pages mirrored in {:?}",
            summary.pages_mirrored,
            summary.elapsed
        );
        Ok(summary)
    }

    /// Signals shutdown; returns true only for the first call
    pub fn teardown(&self) -> bool {
        let signalled = self.shutdown.signal();
        if signalled {
            tracing::debug!("Shutdown signalled");
        }
        signalled
    }

    /// Shared frontier of the prepared run
    pub fn frontier(&self) -> Option<&Frontier> {
        self.context.as_deref().map(|ctx| &ctx.frontier)
    }

    /// Outstanding URL count of the prepared run (zero before setup)
    pub fn pending(&self) -> usize {
        self.context
            .as_deref()
            .map(|ctx| ctx.pending.value())
            .unwrap_or(0)
    }

    pub fn is_prepared(&self) -> bool {
        self.context.is_some()
    }
}

/// Checks the archive directory and creates it if needed
///
/// The parent must exist and be a directory. An existing target must be an
/// empty directory; a missing target is created.
pub fn prepare_archive_dir(path: &Path) -> Result<(), SetupError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir().map_err(|source| SetupError::Create {
            path: path.to_path_buf(),
            source,
        })?,
    };

    if !parent.exists() {
        return Err(SetupError::ParentMissing(path.to_path_buf()));
    }
    if !parent.is_dir() {
        return Err(SetupError::ParentNotDirectory(path.to_path_buf()));
    }

    if path.exists() {
        if !path.is_dir() {
            return Err(SetupError::NotADirectory(path.to_path_buf()));
        }
        let mut entries = std::fs::read_dir(path).map_err(|source| SetupError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        if entries.next().is_some() {
            return Err(SetupError::NotEmpty(path.to_path_buf()));
        }
        tracing::info!("Using existing empty archive directory {}", path.display());
    } else {
        std::fs::create_dir(path).map_err(|source| SetupError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Created archive directory {}", path.display());
    }

    Ok(())
}

/// Runs a complete mirror with the real HTTP collaborators
///
/// # Example
///
/// ```no_run
/// use forum_mirror::config::Config;
/// use forum_mirror::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run_crawl(Config::default()).await?;
/// println!("{} pages mirrored", summary.pages_mirrored);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlSummary, ArchiveError> {
    let mut coordinator = Coordinator::from_config(config)?;
    coordinator.setup().await?;
    let result = coordinator.run().await;
    coordinator.teardown();
    result
}
