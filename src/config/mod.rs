//! Configuration module for Forum-Mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a missing file is equivalent to an empty one.
//!
//! # Example
//!
//! ```no_run
//! use forum_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Mirroring {} sub-forums", config.archive.forum_codes.len());
//! ```

mod parser;
mod types;
mod validation;

pub use types::{ArchiveConfig, Config, CrawlerConfig, LoggingConfig, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
