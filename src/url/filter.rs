use regex::Regex;

/// Scope pattern for one sub-forum's archive listing, including its later pages
const FORUM_PATTERN: &str = r"index\.php/f-{code}(-p-\d+)?\.html";

/// Scope pattern for any thread page in the archive
const THREAD_PATTERN: &str = r"index\.php/t-.+\.html";

/// Scope pattern for the archive's stylesheet
const STYLESHEET_PATTERN: &str = r"archive/archive\.css";

/// Decides which discovered links belong in the archive
///
/// A URL is in scope iff at least one pattern is found anywhere in it.
/// Patterns are searched, not anchored, so a false positive costs an extra
/// fetch while nothing that looks like archive content is missed.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    patterns: Vec<Regex>,
}

impl LinkFilter {
    /// Builds the filter for the given sub-forum codes
    ///
    /// One pattern per forum code, then the thread pattern, then the
    /// stylesheet pattern.
    pub fn new(forum_codes: &[u32]) -> Result<Self, regex::Error> {
        let mut sources: Vec<String> = forum_codes
            .iter()
            .map(|code| FORUM_PATTERN.replace("{code}", &code.to_string()))
            .collect();
        sources.push(THREAD_PATTERN.to_string());
        sources.push(STYLESHEET_PATTERN.to_string());

        Self::from_patterns(&sources)
    }

    /// Builds a filter from arbitrary regular expressions
    pub fn from_patterns<S: AsRef<str>>(sources: &[S]) -> Result<Self, regex::Error> {
        let patterns = sources
            .iter()
            .map(|s| Regex::new(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Returns true if any pattern matches somewhere in `url`
    pub fn in_scope(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(url))
    }

    /// The pattern sources, in evaluation order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.as_str())
    }
}
