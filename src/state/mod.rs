//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlProgress`: the persisted checkpoint (completed sites, buffered jobs, failures)
//! - `BatchPlan`: the pending sites selected for the current invocation
//! - `ExtractionState`: the per-site pagination state machine

mod batch;
mod extraction_state;
mod progress;

// Re-export main types
pub use batch::BatchPlan;
pub use extraction_state::{ExtractionState, StopReason};
pub use progress::{truncate_message, CrawlProgress, FailureRecord, FAILURE_MESSAGE_LIMIT};
