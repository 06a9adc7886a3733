//! Global request pacing
//!
//! This module handles:
//! - Spacing every outbound request at least one crawl delay apart, across all workers
//! - Handing out request slots in registration order
//! - Flushing outstanding slots at shutdown

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Spaces requests from all workers at least `delay` apart
///
/// Each caller registers a slot at `max(latest slot + delay, now)` before
/// sleeping, so concurrent callers serialize onto an increasing sequence of
/// slots. Slots older than one delay are pruned on every call.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    slots: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter for `delay`, sized for `workers` concurrent callers
    pub fn new(delay: Duration, workers: usize) -> Self {
        Self {
            delay,
            slots: Mutex::new(VecDeque::with_capacity(workers.max(1) + 1)),
        }
    }

    /// The minimum interval between two requests
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until it is this caller's turn to issue a request
    ///
    /// # Returns
    ///
    /// The slot that was granted
    pub async fn wait(&self) -> Instant {
        let slot = self.reserve(Instant::now());
        tokio::time::sleep_until(slot).await;
        slot
    }

    /// Registers the next slot at or after `now` and returns it
    fn reserve(&self, now: Instant) -> Instant {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());

        while let Some(oldest) = slots.front() {
            if *oldest + self.delay <= now {
                slots.pop_front();
            } else {
                break;
            }
        }

        let slot = match slots.back() {
            Some(latest) => std::cmp::max(*latest + self.delay, now),
            None => now,
        };
        slots.push_back(slot);

        tracing::trace!(
            "Reserved request slot in {:?} ({} outstanding)",
            slot.saturating_duration_since(now),
            slots.len()
        );
        slot
    }

    /// Number of slots registered within the last delay window or in the future
    pub fn outstanding(&self) -> usize {
        let now = Instant::now();
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.iter().filter(|s| **s + self.delay > now).count()
    }

    /// Waits for the latest registered slot to pass, but no longer than `max_wait`
    pub async fn flush(&self, max_wait: Duration) {
        let latest = {
            let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.back().copied()
        };

        if let Some(latest) = latest {
            let deadline = std::cmp::min(latest, Instant::now() + max_wait);
            tokio::time::sleep_until(deadline).await;
        }
    }
}
