//! Robots.txt caching implementation
//!
//! Cached entries expire after 24 hours so long mirror runs pick up changes
//! made by the site owner.

use crate::robots::ParsedRobots;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// How long a fetched robots.txt is trusted
const ROBOTS_TTL_HOURS: i64 = 24;

/// Cached robots.txt data for an origin
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt content, shared with every lookup
    pub content: Arc<ParsedRobots>,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Creates a new CachedRobots stamped with the current time
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            content: Arc::new(content),
            fetched_at: Utc::now(),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age() > Duration::hours(ROBOTS_TTL_HOURS)
    }

    /// Returns how long ago the robots.txt was fetched
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }
}
