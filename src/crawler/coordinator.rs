//! Batch coordinator - main crawl orchestration logic
//!
//! This module owns a run end to end:
//! - loading progress and the existing output artifact
//! - selecting the batch of pending sites
//! - extracting each site in input order, isolating site-level failures
//! - checkpointing every `save_every` sites
//! - writing the output artifact and the final checkpoint
//!
//! Sites are processed strictly one after another. Interruption is handled
//! only by the checkpoints: work done since the last checkpoint is redone on
//! the next run, starting again from the first page of the interrupted site.

use crate::config::Config;
use crate::crawler::extractor::SiteExtractor;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{AvatureListingParser, ListingParser};
use crate::crawler::transport::Transport;
use crate::output::{round_seconds, OutputArtifact, RunStats};
use crate::site::{AvatureSearchUrl, JobRecord, SearchUrlBuilder, SiteTarget};
use crate::state::{truncate_message, BatchPlan, CrawlProgress};
use crate::storage::ProgressStore;
use crate::SweepError;
use std::collections::HashSet;
use std::time::Instant;

/// Characters of a failure message shown in the progress log
const LOG_MESSAGE_LIMIT: usize = 50;

/// Outcome of one batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Progress as persisted at the end of the batch (jobs buffer flushed)
    pub progress: CrawlProgress,

    pub stats: RunStats,
}

/// Main batch coordinator structure
pub struct Coordinator<T, S> {
    fetcher: Fetcher<T>,
    store: S,
    urls: Box<dyn SearchUrlBuilder>,
    parser: Box<dyn ListingParser>,
    batch_size: usize,
    save_every: usize,
    per_page: usize,
    fresh: bool,
    config_hash: Option<String>,
}

impl<T: Transport, S: ProgressStore> Coordinator<T, S> {
    /// Creates a coordinator for Avature listings
    ///
    /// # Arguments
    ///
    /// * `config` - batch and fetch settings
    /// * `fetcher` - the session used for every request of the run
    /// * `store` - where progress and output are persisted
    pub fn new(config: &Config, fetcher: Fetcher<T>, store: S) -> Self {
        Self {
            fetcher,
            store,
            urls: Box::new(AvatureSearchUrl),
            parser: Box::new(AvatureListingParser),
            batch_size: config.batch.batch_size,
            save_every: config.batch.save_every.max(1),
            per_page: config.fetch.per_page,
            fresh: false,
            config_hash: None,
        }
    }

    /// Replaces the search URL layout
    pub fn with_url_builder(mut self, urls: impl SearchUrlBuilder + 'static) -> Self {
        self.urls = Box::new(urls);
        self
    }

    /// Replaces the listing parser
    pub fn with_parser(mut self, parser: impl ListingParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Ignores any previously written output artifact
    pub fn with_fresh_start(mut self, fresh: bool) -> Self {
        self.fresh = fresh;
        self
    }

    /// Records the configuration hash in the output stats
    pub fn with_config_hash(mut self, hash: Option<String>) -> Self {
        self.config_hash = hash;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the coordinator, releasing the HTTP session
    pub fn into_store(self) -> S {
        self.store
    }

    /// Runs one batch starting from the persisted progress
    pub async fn run(&mut self, all_sites: &[SiteTarget]) -> Result<BatchOutcome, SweepError> {
        let progress = if self.fresh {
            CrawlProgress::new()
        } else {
            self.store.load_progress()?
        };
        self.run_batch(all_sites, progress).await
    }

    /// Processes the next batch of pending sites
    ///
    /// Site-level failures are recorded and never abort the batch. Storage
    /// failures are returned immediately.
    pub async fn run_batch(
        &mut self,
        all_sites: &[SiteTarget],
        mut progress: CrawlProgress,
    ) -> Result<BatchOutcome, SweepError> {
        let start_time = Instant::now();
        let total_sites = all_sites.len();

        let existing_jobs = self.load_existing_jobs()?;
        recover_buffered_jobs(&mut progress, &existing_jobs);

        tracing::info!("Sites: {}", total_sites);
        if !progress.completed.is_empty() {
            tracing::info!("Resuming: {} done", progress.completed.len());
        }
        if !existing_jobs.is_empty() {
            tracing::info!("Existing jobs: {}", existing_jobs.len());
        }
        if !progress.jobs.is_empty() {
            tracing::info!("Recovered {} checkpointed jobs", progress.jobs.len());
        }

        let plan = BatchPlan::new(all_sites, &progress, self.batch_size);
        tracing::info!(
            "Pending: {} | Batch: {}",
            plan.pending.len(),
            plan.batch.len()
        );

        let completed_before = progress.completed.len();
        let mut batch_jobs = 0;

        for (i, site) in plan.batch.iter().enumerate() {
            let processed = i + 1;
            tracing::info!(
                "[{}/{}] {}",
                completed_before + processed,
                total_sites,
                site.subdomain()
            );

            batch_jobs += self.process_site(site, &mut progress).await;

            if processed % self.save_every == 0 {
                tracing::info!(
                    "  [Saved: {} jobs]",
                    existing_jobs.len() + progress.jobs.len()
                );
                self.store.save_progress(&progress)?;
            }
        }

        let elapsed = start_time.elapsed().as_secs_f64();
        let remaining = plan.remaining();

        let mut all_jobs = existing_jobs;
        all_jobs.extend(progress.jobs.iter().cloned());

        let stats = RunStats {
            total_sites,
            sites_completed: progress.completed.len(),
            sites_failed: progress.failed.len(),
            sites_remaining: remaining,
            batch_sites: plan.batch.len(),
            batch_jobs,
            total_jobs: all_jobs.len(),
            time_seconds: round_seconds(elapsed),
            date: chrono::Local::now().to_rfc3339(),
            config_hash: self.config_hash.clone(),
        };

        // every job written to the output must belong to a completed site or
        // to the checkpointed buffer, so checkpoint before the output write
        // and clear the buffer only after it
        self.store.save_progress(&progress)?;
        self.store
            .save_output(&OutputArtifact::new(all_jobs, stats.clone()))?;
        let progress = progress.without_jobs();
        self.store.save_progress(&progress)?;

        tracing::info!("BATCH DONE");
        tracing::info!("This batch: {} sites", plan.batch.len());
        tracing::info!("Total jobs: {}", stats.total_jobs);
        tracing::info!("Remaining: {} sites", remaining);
        tracing::info!("Time: {:.0}s ({:.1} min)", elapsed, elapsed / 60.0);

        Ok(BatchOutcome { progress, stats })
    }

    /// Extracts one site into the progress buffer, returning its job count
    ///
    /// The site is marked completed whether or not extraction succeeded.
    async fn process_site(&self, site: &SiteTarget, progress: &mut CrawlProgress) -> usize {
        let site_start = Instant::now();
        let extractor = SiteExtractor::new(
            &self.fetcher,
            self.urls.as_ref(),
            self.parser.as_ref(),
            self.per_page,
        );

        let found = match extractor.extract_all(site).await {
            Ok(extraction) => {
                let count = extraction.records.len();
                tracing::info!(
                    "  OK: {} jobs ({:.1}s)",
                    count,
                    site_start.elapsed().as_secs_f64()
                );
                progress.jobs.extend(extraction.records);
                count
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(
                    "  FAIL: {} ({:.1}s)",
                    truncate_message(&message, LOG_MESSAGE_LIMIT),
                    site_start.elapsed().as_secs_f64()
                );
                progress.record_failure(site, &message);
                0
            }
        };

        progress.mark_completed(site);
        found
    }

    fn load_existing_jobs(&self) -> Result<Vec<JobRecord>, SweepError> {
        if self.fresh {
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .load_output()?
            .map(OutputArtifact::into_jobs)
            .unwrap_or_default())
    }
}

/// Drops checkpointed jobs that already reached the output artifact
///
/// After an interruption between the output write and the final checkpoint,
/// the buffer still holds jobs the output already contains.
fn recover_buffered_jobs(progress: &mut CrawlProgress, existing: &[JobRecord]) {
    if progress.jobs.is_empty() {
        return;
    }
    let flushed: HashSet<&str> = existing.iter().map(|job| job.url.as_str()).collect();
    let before = progress.jobs.len();
    progress.jobs.retain(|job| !flushed.contains(job.url.as_str()));
    if progress.jobs.len() < before {
        tracing::debug!(
            "Dropped {} checkpointed jobs already in the output",
            before - progress.jobs.len()
        );
    }
}
