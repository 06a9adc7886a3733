//! Crawler module for mirroring the forum archive
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind a `Transport` trait
//! - HTML link extraction
//! - Global request pacing
//! - The shared frontier and visited set
//! - Workers and the coordinator that runs them

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;
mod worker;

pub use coordinator::{prepare_archive_dir, run_crawl, Coordinator, ShutdownHandle};
pub use fetcher::{build_http_client, describe_error, FetchResponse, ReqwestTransport, Transport};
pub use frontier::Frontier;
pub use parser::{extract_links, HtmlLinkExtractor, LinkExtractor};
pub use scheduler::RateLimiter;
pub use worker::{CrawlContext, ItemOutcome, Worker};
