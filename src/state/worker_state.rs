/// Worker state definitions for tracking per-item progress
///
/// Each worker moves through these states once per frontier item and then
/// loops back to `Idle`.
use std::fmt;

/// Represents where a worker is in processing its current item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkerState {
    /// Waiting for a URL to appear in the frontier
    #[default]
    Idle,

    /// Holds a URL taken from the frontier
    Claimed,

    /// Waiting on the rate limiter or the HTTP transport
    Fetching,

    /// Extracting and filtering links from the fetched body
    Parsing,

    /// Writing the rewritten body to the archive
    Mirroring,

    /// Finished with the item; the pending counter has been decremented
    Done,
}

impl WorkerState {
    /// Returns true if moving from `self` to `next` is a legal step
    ///
    /// `Claimed` may go straight to `Done` (already visited or disallowed),
    /// `Fetching` may go straight to `Done` (fetch failure or non-2xx).
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, next),
            (Idle, Claimed)
                | (Claimed, Fetching)
                | (Claimed, Done)
                | (Fetching, Parsing)
                | (Fetching, Done)
                | (Parsing, Mirroring)
                | (Mirroring, Done)
                | (Done, Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Claimed => "claimed",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Mirroring => "mirroring",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
