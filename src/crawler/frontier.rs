//! Shared work queue and visited set

use crate::state::PendingCounter;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

/// URLs waiting to be attempted plus the URLs already attempted
///
/// The queue does not filter duplicates on push. Duplicates are dropped when
/// a worker claims them: the first claim of a URL wins, later claims of the
/// same string are no-ops. URLs are compared as exact strings.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<String>>,
    visited: Mutex<HashSet<String>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `url` unconditionally
    ///
    /// The caller must already have counted it in the pending counter; use
    /// [`Frontier::admit`] to do both in the right order.
    pub fn push(&self, url: String) {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(url);
    }

    /// Counts `url` as pending, then enqueues it
    ///
    /// The increment happens before the URL is visible to any worker, so the
    /// pending counter can never read zero while the URL is still queued.
    pub fn admit(&self, url: String, pending: &PendingCounter) {
        pending.increment();
        self.push(url);
    }

    /// Takes the oldest queued URL, if any
    pub fn pop(&self) -> Option<String> {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
    }

    /// Marks `url` visited and returns true if this call was the first to do so
    pub fn claim(&self, url: &str) -> bool {
        let mut visited = self.visited.lock().unwrap_or_else(|e| e.into_inner());
        if visited.contains(url) {
            return false;
        }
        visited.insert(url.to_string());
        true
    }

    /// Marks `url` visited; calling it again has no effect
    pub fn mark_visited(&self, url: &str) {
        self.claim(url);
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(url)
    }

    /// Number of URLs currently queued
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn visited_count(&self) -> usize {
        self.visited.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Copy of the visited set, sorted
    pub fn visited_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .visited
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect();
        urls.sort();
        urls
    }
}
