//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PendingCounter`: outstanding-work counter used to detect that the crawl is finished
//! - `WorkerState`: where a single worker is in processing its current item

mod pending;
mod worker_state;

pub use pending::PendingCounter;
pub use worker_state::WorkerState;
