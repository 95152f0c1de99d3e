//! Storage traits and error types
//!
//! This module defines the trait interface for persisting crawl progress and
//! the output artifact, and the associated error types.

use crate::output::OutputArtifact;
use crate::state::CrawlProgress;
use thiserror::Error;

/// Errors that can occur during storage operations
///
/// All of these are fatal for a run: continuing without a durable checkpoint
/// would break resumability.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error on {path}: {source}")]
    Serialization {
        path: String,
        source: serde_json::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for progress and output persistence
///
/// Every save replaces the whole document. A single writer is assumed;
/// concurrent runs against the same store are not supported.
pub trait ProgressStore {
    /// Loads the checkpoint, or an empty one if none was written yet
    fn load_progress(&self) -> StorageResult<CrawlProgress>;

    /// Replaces the checkpoint
    fn save_progress(&mut self, progress: &CrawlProgress) -> StorageResult<()>;

    /// Loads the output artifact if one exists
    fn load_output(&self) -> StorageResult<Option<OutputArtifact>>;

    /// Replaces the output artifact
    fn save_output(&mut self, artifact: &OutputArtifact) -> StorageResult<()>;
}
