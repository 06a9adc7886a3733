//! HTML link extraction
//!
//! This module handles parsing fetched markup to extract the references a
//! mirror needs to follow:
//! - `<a href="...">` anchors
//! - `<link rel="stylesheet" href="...">` stylesheets

use scraper::{Html, Selector};
use url::Url;

/// Extracts candidate hyperlinks from a fetched body
pub trait LinkExtractor: Send + Sync {
    /// Returns absolute URLs referenced by `body`, resolved against `base_url`
    fn extract_links(&self, body: &str, base_url: &str) -> Vec<String>;
}

/// `LinkExtractor` backed by the scraper HTML parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, body: &str, base_url: &str) -> Vec<String> {
        match Url::parse(base_url) {
            Ok(base) => extract_links(body, &base),
            Err(e) => {
                tracing::debug!("Cannot resolve links against {}: {}", base_url, e);
                Vec::new()
            }
        }
    }
}

/// Extracts anchor and stylesheet references from `html`
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">`
/// - `<link rel="stylesheet" href="...">`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Anything that is not http(s) after resolution
///
/// # Example
///
/// ```
/// use forum_mirror::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="t-1.html">Thread</a></body></html>"#;
/// let base = Url::parse("http://example.com/forums/archive/index.php/f-79.html").unwrap();
/// assert_eq!(
///     extract_links(html, &base),
///     vec!["http://example.com/forums/archive/index.php/t-1.html"]
/// );
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for selector in ["a[href]", "link[rel~='stylesheet'][href]"] {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url)
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" =>
        {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
