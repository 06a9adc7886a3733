use crate::config::types::{ArchiveConfig, Config, CrawlerConfig, LoggingConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_archive_config(&config.archive)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates the archive section
fn validate_archive_config(config: &ArchiveConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if base.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url has no host: '{}'",
            config.base_url
        )));
    }

    if !config.base_url.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "base_url must end with '/', got '{}'",
            config.base_url
        )));
    }

    if config.forum_codes.is_empty() {
        return Err(ConfigError::Validation(
            "at least one forum code is required".to_string(),
        ));
    }

    if !config.seed_template.contains("{forum_code}") {
        return Err(ConfigError::Validation(format!(
            "seed_template must contain '{{forum_code}}', got '{}'",
            config.seed_template
        )));
    }

    if config.archive_location.is_empty() {
        return Err(ConfigError::Validation(
            "archive_location cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    if config.poll_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "poll_interval_ms must be > 0".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Validates the log file section
fn validate_logging_config(config: &LoggingConfig) -> Result<(), ConfigError> {
    if !LOG_LEVELS.contains(&config.file_level.to_lowercase().as_str()) {
        return Err(ConfigError::Validation(format!(
            "file_level must be one of {}, got '{}'",
            LOG_LEVELS.join(", "),
            config.file_level
        )));
    }

    if config.file_max_bytes == 0 {
        return Err(ConfigError::Validation(
            "file_max_bytes must be > 0".to_string(),
        ));
    }

    if config.file.as_deref() == Some("") {
        return Err(ConfigError::Validation(
            "logging file cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
