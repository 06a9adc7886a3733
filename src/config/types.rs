use serde::Deserialize;

/// Main configuration structure for Forum-Mirror
///
/// Every section has defaults, so an empty TOML document is a valid
/// configuration that mirrors the S-Series sub-forums of saturnfans.com.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub archive: ArchiveConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub logging: LoggingConfig,
}

/// What to mirror and where to put it
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ArchiveConfig {
    /// Root of the site being mirrored (must end with '/')
    pub base_url: String,

    /// Sub-forum numbers whose archive pages seed the crawl
    pub forum_codes: Vec<u32>,

    /// Local directory the archive is built in
    pub archive_location: String,

    /// Part of the site that is mirrored, relative to `base_url`
    pub mirror_prefix: String,

    /// Seed page path relative to `base_url`; `{forum_code}` is substituted
    pub seed_template: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.saturnfans.com/".to_string(),
            // S-Series General, S-Series Tech and S-Series Mods
            forum_codes: vec![79, 39, 58],
            archive_location: "./archive".to_string(),
            mirror_prefix: "forums/".to_string(),
            seed_template: "forums/archive/index.php/f-{forum_code}.html".to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of concurrent workers
    pub workers: u32,

    /// Delay between requests when robots.txt names none (milliseconds)
    pub default_crawl_delay_ms: u64,

    /// Idle-wait interval for empty frontier and completion polling (milliseconds)
    pub poll_interval_ms: u64,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Wait after signalling shutdown; defaults to one crawl delay (milliseconds)
    pub shutdown_grace_ms: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            default_crawl_delay_ms: 1000,
            poll_interval_ms: 100,
            request_timeout_secs: 30,
            shutdown_grace_ms: None,
        }
    }
}

/// Log file configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// Also write logs to this file (no file when unset)
    pub file: Option<String>,

    /// Level for the log file, independent of the console verbosity
    pub file_level: String,

    /// Size at which the log file is rotated (bytes)
    pub file_max_bytes: usize,

    /// Number of rotated files kept next to the live one
    pub file_backups: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            file_level: "debug".to_string(),
            file_max_bytes: 3 * 1024 * 1024,
            file_backups: 3,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler, also the robots.txt agent token
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,

    /// Email address for crawler-related contact
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "ForumMirror".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/forum-mirror/forum-mirror".to_string(),
            contact_email: "forum-mirror@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Full User-Agent header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }

    /// Agent token matched against robots.txt groups
    pub fn robots_agent(&self) -> &str {
        &self.crawler_name
    }
}

impl ArchiveConfig {
    /// Seed path for one sub-forum, relative to `base_url`
    pub fn seed_path(&self, forum_code: u32) -> String {
        self.seed_template
            .replace("{forum_code}", &forum_code.to_string())
    }
}
