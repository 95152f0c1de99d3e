//! Storage module for persisting crawl data
//!
//! This module handles the two durable documents of a run:
//! - the progress checkpoint (completed sites, buffered jobs, failures)
//! - the output artifact (all jobs plus run statistics)

mod json;
mod memory;
mod traits;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use traits::{ProgressStore, StorageError, StorageResult};

use crate::config::OutputConfig;

/// Opens the JSON file store at the configured paths
pub fn open_store(config: &OutputConfig) -> JsonFileStore {
    JsonFileStore::new(&config.progress_path, &config.jobs_path)
}
