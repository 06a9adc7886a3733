//! On-disk mirror of fetched pages
//!
//! Maps each fetched URL to a file under the archive root and rewrites
//! absolute links into the mirrored part of the site so they point at the
//! local copy instead.

use crate::url::extract_domain;
use regex::bytes::{NoExpand, Regex};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use url::Url;

/// File name used for URLs whose path ends in a directory
const INDEX_FILE: &str = "index.html";

/// Writes rewritten pages into the archive directory
#[derive(Debug, Clone)]
pub struct Mirror {
    /// Path prefix of the mirrored part of the site, e.g. `/forums/`
    prefix: String,

    /// Local directory mirrored pages are written under
    root: PathBuf,

    /// Replacement for absolute references to the mirrored origin
    local_root: String,

    /// Matches absolute references to the mirrored origin
    absolute_link: Regex,
}

impl Mirror {
    /// Creates a mirror of everything under `origin` rooted at `archive_root`
    ///
    /// References are matched over http and https, with or without a
    /// leading `www.` on the host.
    pub fn new(origin: &Url, archive_root: impl Into<PathBuf>) -> Result<Self, regex::Error> {
        let root = archive_root.into();
        let host = extract_domain(origin).unwrap_or_default();
        let bare_host = host.strip_prefix("www.").unwrap_or(&host);
        let port = origin
            .port()
            .map(|p| format!(":{}", p))
            .unwrap_or_default();

        let mut prefix = origin.path().to_string();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }

        let absolute_link = Regex::new(&format!(
            r"(?i)https?://(www\.)?{}{}{}",
            regex::escape(bare_host),
            regex::escape(&port),
            regex::escape(&prefix)
        ))?;

        let local_root = format!(
            "{}/",
            root.to_string_lossy().trim_end_matches(['/', '\\'])
        );

        Ok(Self {
            prefix,
            root,
            local_root,
            absolute_link,
        })
    }

    /// The archive root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Computes where `url` is stored in the archive
    ///
    /// Only the path component is used. The mirrored prefix is stripped when
    /// present, empty and dot segments are dropped, and a trailing slash maps
    /// to `index.html`. Returns `None` if `url` does not parse.
    pub fn local_path(&self, url: &str) -> Option<PathBuf> {
        let parsed = Url::parse(url).ok()?;
        let path = parsed.path();
        let relative = path
            .strip_prefix(self.prefix.as_str())
            .unwrap_or_else(|| path.trim_start_matches('/'));

        let mut local = self.root.clone();
        let mut pushed = false;
        for segment in relative.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                continue;
            }
            local.push(segment);
            pushed = true;
        }

        if !pushed || relative.ends_with('/') {
            local.push(INDEX_FILE);
        }

        Some(local)
    }

    /// Replaces absolute references to the mirrored origin with the archive root
    pub fn rewrite(&self, body: &[u8]) -> Vec<u8> {
        self.absolute_link
            .replace_all(body, NoExpand(self.local_root.as_bytes()))
            .into_owned()
    }

    /// Writes the rewritten `body` of `url` into the archive
    ///
    /// Parent directories are created as needed. The content goes to a
    /// temporary file in the target directory that then replaces the target,
    /// so readers never see a partial file. An existing file is overwritten.
    ///
    /// # Returns
    ///
    /// The path that was written
    pub fn write(&self, url: &str, body: &[u8]) -> io::Result<PathBuf> {
        let path = self.local_path(url).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot map {} to an archive path", url),
            )
        })?;

        let parent = path.parent().unwrap_or(&self.root);
        std::fs::create_dir_all(parent)?;

        let mut file = NamedTempFile::new_in(parent)?;
        file.write_all(&self.rewrite(body))?;
        file.flush()?;
        file.persist(&path).map_err(|e| e.error)?;

        tracing::trace!("Mirrored {} to {}", url, path.display());
        Ok(path)
    }
}
