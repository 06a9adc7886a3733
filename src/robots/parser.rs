//! Robots.txt parser implementation
//!
//! Permission checks go through the robotstxt crate; the crawl-delay
//! extension is read by a small group parser here since the crate ignores it.

use robotstxt::DefaultMatcher;
use std::time::Duration;

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content
    content: String,
    /// Skip matching and allow everything
    allow_all: bool,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// Used when a site has no robots.txt.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Creates a ParsedRobots that disallows everything
    ///
    /// Used when robots.txt exists but the server failed to return it.
    pub fn disallow_all() -> Self {
        Self::from_content("User-agent: *\nDisallow: /\n")
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to check, absolute or path-only
    /// * `user_agent` - The agent token (e.g. "ForumMirror")
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// A group whose product token equals the agent's wins over the `*`
    /// group; comparison is case-insensitive. Values that are not
    /// non-negative numbers of seconds are ignored.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        if self.allow_all || self.content.is_empty() {
            return None;
        }

        let agent = product_token(user_agent).to_lowercase();
        let mut group_agents: Vec<String> = Vec::new();
        let mut in_agent_lines = false;
        let mut wildcard_delay = None;
        let mut agent_delay = None;

        for line in self.content.lines() {
            // Strip comments
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    // Consecutive user-agent lines share one group
                    if !in_agent_lines {
                        group_agents.clear();
                    }
                    group_agents.push(product_token(value).to_lowercase());
                    in_agent_lines = true;
                }
                "crawl-delay" => {
                    in_agent_lines = false;
                    let Some(delay) = value
                        .parse::<f64>()
                        .ok()
                        .filter(|d| d.is_finite() && *d >= 0.0)
                        .map(Duration::from_secs_f64)
                    else {
                        continue;
                    };

                    if !agent.is_empty() && group_agents.iter().any(|ua| *ua == agent) {
                        agent_delay.get_or_insert(delay);
                    } else if group_agents.iter().any(|ua| ua == "*") {
                        wildcard_delay.get_or_insert(delay);
                    }
                }
                _ => in_agent_lines = false,
            }
        }

        agent_delay.or(wildcard_delay)
    }
}

/// Leading `[A-Za-z_-]` run of a user-agent string, or `*` as is
///
/// `ForumMirror/0.1 (+url)` becomes `ForumMirror`.
fn product_token(value: &str) -> &str {
    let value = value.trim();
    if value.starts_with('*') {
        return "*";
    }
    let end = value
        .find(|c: char| !(c.is_ascii_alphabetic() || c == '_' || c == '-'))
        .unwrap_or(value.len());
    &value[..end]
}
