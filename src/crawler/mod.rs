//! Crawler module for listing extraction
//!
//! This module contains the core extraction logic, including:
//! - HTTP transport with browser profiles and proxy rotation
//! - Page fetching with pacing and retry logic
//! - Listing page parsing
//! - Per-site pagination
//! - Batch coordination with checkpointing

mod coordinator;
mod extractor;
mod fetcher;
mod parser;
#[cfg(test)]
mod testing;
mod transport;

pub use coordinator::{BatchOutcome, Coordinator};
pub use extractor::{Extraction, SiteExtractor};
pub use fetcher::{Fetcher, RetryPolicy};
pub use parser::{AvatureListingParser, ListingParser};
pub use transport::{build_http_client, profile_headers, HttpTransport, Transport};

use crate::config::Config;
use crate::proxy::ProxyProvider;
use crate::site::SiteTarget;
use crate::storage::ProgressStore;
use crate::SweepError;
use std::sync::Arc;

/// Runs one batch over live HTTP
///
/// This is the main entry point for a harvesting run. It will:
/// 1. Build the HTTP session (optionally proxied)
/// 2. Load progress and existing output from the store
/// 3. Extract the next batch of pending sites
/// 4. Write the output artifact and the final checkpoint
///
/// The HTTP session is released when this returns.
///
/// # Arguments
///
/// * `config` - The run configuration
/// * `sites` - Every site of the input list, in input order
/// * `proxies` - Optional proxy rotation
/// * `store` - Where progress and output are persisted
/// * `fresh` - Ignore previous progress and output
pub async fn run_batch<S: ProgressStore>(
    config: &Config,
    sites: &[SiteTarget],
    proxies: Option<Arc<dyn ProxyProvider>>,
    store: S,
    fresh: bool,
    config_hash: Option<String>,
) -> Result<BatchOutcome, SweepError> {
    let transport = HttpTransport::from_config(config, proxies)?;
    let fetcher = Fetcher::new(transport, RetryPolicy::from_config(&config.fetch));

    let mut coordinator = Coordinator::new(config, fetcher, store)
        .with_fresh_start(fresh)
        .with_config_hash(config_hash);

    coordinator.run(sites).await
}
