//! URL handling module for Forum-Mirror
//!
//! This module provides scope filtering for discovered links and helpers for
//! building the seed URLs of a crawl.

mod filter;

pub use filter::LinkFilter;

use crate::config::ArchiveConfig;
use ::url::Url;

/// Builds one seed URL per configured sub-forum
///
/// # Examples
///
/// ```
/// use forum_mirror::config::ArchiveConfig;
/// use forum_mirror::url::seed_urls;
///
/// let seeds = seed_urls(&ArchiveConfig::default()).unwrap();
/// assert_eq!(
///     seeds[0],
///     "http://www.saturnfans.com/forums/archive/index.php/f-79.html"
/// );
/// ```
pub fn seed_urls(config: &ArchiveConfig) -> Result<Vec<String>, ::url::ParseError> {
    let base = Url::parse(&config.base_url)?;
    config
        .forum_codes
        .iter()
        .map(|code| base.join(&config.seed_path(*code)).map(String::from))
        .collect()
}

/// Extracts the lowercase host from a URL
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
