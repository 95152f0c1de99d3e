//! Jobsweep: a resumable job-listing harvester
//!
//! This crate extracts job listings from many career-site instances of a
//! hosted recruiting platform, one site at a time, checkpointing progress so
//! that an interrupted run can be resumed without losing completed work.

pub mod config;
pub mod crawler;
pub mod output;
pub mod proxy;
pub mod site;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Jobsweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Fetch of {url} failed after {attempts} attempts: {last}")]
    FetchExhausted {
        url: String,
        attempts: u32,
        last: FetchError,
    },

    #[error("Invalid site URL '{url}': {reason}")]
    InvalidSite { url: String, reason: String },

    #[error("Invalid proxy endpoint '{endpoint}': {reason}")]
    InvalidProxy { endpoint: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single failed request attempt
///
/// These are transient: the fetcher retries them until its policy is spent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, Fetcher, SiteExtractor};
pub use site::{JobRecord, SiteTarget};
pub use state::{BatchPlan, CrawlProgress, ExtractionState};
