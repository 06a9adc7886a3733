//! Forum-Mirror: a polite forum archive mirror
//!
//! This crate mirrors the archive pages of a public web forum to local disk,
//! respecting robots.txt permissions and crawl delays, rewriting links so the
//! mirrored copy browses offline.

pub mod config;
pub mod crawler;
pub mod logging;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Forum-Mirror operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Setup failed: {0}")]
    Setup(#[from] SetupError),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid scope pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Errors that abort a run before any worker is started
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Parent of archive location {0} does not exist")]
    ParentMissing(PathBuf),

    #[error("Parent of archive location {0} is not a directory")]
    ParentNotDirectory(PathBuf),

    #[error("Archive location {0} exists and is not a directory")]
    NotADirectory(PathBuf),

    #[error("Archive location {0} already exists and is not empty")]
    NotEmpty(PathBuf),

    #[error("Failed to create archive location {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Crawling {url} is disallowed by robots.txt for agent {agent}")]
    RobotsDenied { url: String, agent: String },

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Forum-Mirror operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::crawler::Coordinator;
pub use crate::output::CrawlSummary;
pub use crate::state::{PendingCounter, WorkerState};
pub use crate::url::LinkFilter;
