//! Crawl statistics
//!
//! Counters shared by every worker during a run, and the summary snapshot
//! returned when the run finishes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters updated by workers
#[derive(Debug, Default)]
pub struct CrawlStats {
    fetched: AtomicU64,
    mirrored: AtomicU64,
    skipped_visited: AtomicU64,
    skipped_robots: AtomicU64,
    fetch_failures: AtomicU64,
    write_failures: AtomicU64,
    links_enqueued: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetched(&self) {
        self.fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mirrored(&self) {
        self.mirrored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_visited(&self) {
        self.skipped_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_robots(&self) {
        self.skipped_robots.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_links_enqueued(&self, count: u64) {
        self.links_enqueued.fetch_add(count, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of the counters
    pub fn snapshot(&self, visited: usize, elapsed: Duration) -> CrawlSummary {
        CrawlSummary {
            pages_fetched: self.fetched.load(Ordering::Relaxed),
            pages_mirrored: self.mirrored.load(Ordering::Relaxed),
            skipped_visited: self.skipped_visited.load(Ordering::Relaxed),
            skipped_robots: self.skipped_robots.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            links_enqueued: self.links_enqueued.load(Ordering::Relaxed),
            urls_visited: visited as u64,
            elapsed,
        }
    }
}

/// Summary statistics for a finished crawl
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlSummary {
    /// Fetches that returned a 2xx response
    pub pages_fetched: u64,

    /// Pages written to the archive
    pub pages_mirrored: u64,

    /// Frontier entries dropped because the URL was already visited
    pub skipped_visited: u64,

    /// Frontier entries dropped because robots.txt disallowed them
    pub skipped_robots: u64,

    /// Transport errors and non-2xx responses
    pub fetch_failures: u64,

    /// Pages that could not be written to disk
    pub write_failures: u64,

    /// Discovered links pushed to the frontier
    pub links_enqueued: u64,

    /// Distinct URLs claimed by workers
    pub urls_visited: u64,

    pub elapsed: Duration,
}

impl CrawlSummary {
    /// Returns the fetch success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_fetched + self.fetch_failures;
        if attempted == 0 {
            return 0.0;
        }
        (self.pages_fetched as f64 / attempted as f64) * 100.0
    }

    /// Returns fetched pages per second of wall-clock time
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.pages_fetched as f64 / secs
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  URLs visited: {}", summary.urls_visited);
    println!("  Pages fetched: {}", summary.pages_fetched);
    println!("  Pages mirrored: {}", summary.pages_mirrored);
    println!("  Links enqueued: {}", summary.links_enqueued);
    println!("  Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    println!("Skipped:");
    println!("  Already visited: {}", summary.skipped_visited);
    println!("  Disallowed by robots.txt: {}", summary.skipped_robots);
    println!();

    if summary.fetch_failures > 0 || summary.write_failures > 0 {
        println!("Failures:");
        println!("  Fetch: {}", summary.fetch_failures);
        println!("  Write: {}", summary.write_failures);
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({:.2} pages/sec)",
        summary.success_rate(),
        summary.pages_per_second()
    );
}
