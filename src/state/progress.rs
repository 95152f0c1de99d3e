//! Persisted crawl progress
//!
//! `CrawlProgress` is the checkpoint document: which sites are done, the jobs
//! extracted since the output artifact was last written, and the sites that
//! failed. It is owned by the coordinator for the duration of a run and
//! written out as a whole.

use crate::site::{JobRecord, SiteTarget};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum characters kept from an error description in a failure record
pub const FAILURE_MESSAGE_LIMIT: usize = 200;

/// A site whose extraction ended in an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub site: String,
    pub error: String,
}

/// Process-wide crawl progress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlProgress {
    /// Sites attempted in this or an earlier run, failed ones included
    #[serde(default)]
    pub completed: BTreeSet<String>,

    /// Jobs extracted but not yet flushed to the output artifact
    #[serde(default)]
    pub jobs: Vec<JobRecord>,

    #[serde(default)]
    pub failed: Vec<FailureRecord>,
}

impl CrawlProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the site was already attempted
    pub fn is_completed(&self, site: &str) -> bool {
        self.completed.contains(site)
    }

    /// Marks a site as attempted
    ///
    /// Returns false if it was already marked; a completed site is never
    /// removed again.
    pub fn mark_completed(&mut self, site: &SiteTarget) -> bool {
        self.completed.insert(site.as_str().to_string())
    }

    /// Records a site-level failure with a truncated error description
    pub fn record_failure(&mut self, site: &SiteTarget, error: &str) {
        self.failed.push(FailureRecord {
            site: site.as_str().to_string(),
            error: truncate_message(error, FAILURE_MESSAGE_LIMIT),
        });
    }

    /// Sites from `sites` not yet completed, in input order
    pub fn pending(&self, sites: &[SiteTarget]) -> Vec<SiteTarget> {
        sites
            .iter()
            .filter(|site| !self.is_completed(site.as_str()))
            .cloned()
            .collect()
    }

    /// Copy of this progress with the jobs buffer emptied
    pub fn without_jobs(&self) -> Self {
        Self {
            completed: self.completed.clone(),
            jobs: Vec::new(),
            failed: self.failed.clone(),
        }
    }
}

/// Truncates a message to at most `max` characters, respecting char boundaries
pub fn truncate_message(message: &str, max: usize) -> String {
    match message.char_indices().nth(max) {
        Some((idx, _)) => message[..idx].to_string(),
        None => message.to_string(),
    }
}
