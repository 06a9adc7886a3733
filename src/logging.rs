//! Log file output
//!
//! The binary always logs to the console. When a log file is configured it
//! also writes there, at the file's own level, rotating the file by size.

use crate::config::LoggingConfig;
use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Opens `path` for logging
///
/// Once the file reaches `file-max-bytes` it is renamed to `path.1` (older
/// backups shift up) and a fresh file is started. At most `file-backups`
/// rotated files are kept.
pub fn rotating_log_file(path: &Path, config: &LoggingConfig) -> FileRotate<AppendCount> {
    FileRotate::new(
        path,
        AppendCount::new(config.file_backups),
        ContentLimit::Bytes(config.file_max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    )
}

/// Filter for the log file layer
///
/// The configured level applies to this crate; dependencies only log
/// warnings and errors.
pub fn file_filter(config: &LoggingConfig) -> EnvFilter {
    let level = config.file_level.to_lowercase();
    if level == "error" {
        EnvFilter::new("error")
    } else {
        EnvFilter::new(format!("forum_mirror={},warn", level))
    }
}
