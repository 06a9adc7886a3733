//! Output module for the mirrored archive and crawl summaries
//!
//! This module handles:
//! - Writing fetched pages into the archive with links rewritten
//! - Recording crawl statistics and printing the final summary

mod mirror;
pub mod stats;

pub use mirror::Mirror;
pub use stats::{print_summary, CrawlStats, CrawlSummary};
