//! Test doubles for the crawl loop
//!
//! `ScriptedTransport` replays queued responses per URL and answers 404 for
//! anything unscripted. `KeyValueParser` reads listing pages written by
//! [`listing_body`], so pagination can be driven without HTML.

use crate::crawler::fetcher::RetryPolicy;
use crate::crawler::parser::ListingParser;
use crate::crawler::transport::Transport;
use crate::site::{AvatureSearchUrl, JobRecord, SearchUrlBuilder};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) const PER_PAGE: usize = 50;

/// A policy with no politeness delay and a 1s backoff base
pub(crate) fn instant_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_secs(1),
        jitter_min: Duration::ZERO,
        jitter_max: Duration::ZERO,
    }
}

/// Listing URL for a site at an offset, as the extractor builds it
pub(crate) fn page_url(base_url: &str, offset: usize) -> String {
    AvatureSearchUrl.build_search_url(base_url, offset, PER_PAGE)
}

/// A fake listing page with `count` jobs numbered from `offset`
pub(crate) fn listing_body(offset: usize, count: usize, total: Option<usize>) -> String {
    match total {
        Some(total) => format!("offset={};count={};total={}", offset, count, total),
        None => format!("offset={};count={}", offset, count),
    }
}

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<String, FetchError>>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues a response for the next request to `url`
    pub(crate) fn respond(&self, url: &str, response: Result<String, FetchError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Scripts a whole site: one page per entry of `pages`, then an empty page
    ///
    /// Requests advance by the first page's size, as the extractor steps;
    /// record numbering stays cumulative so every job URL is unique.
    pub(crate) fn script_site(&self, base_url: &str, pages: &[usize], total: Option<usize>) {
        let step = pages.first().copied().unwrap_or(0);
        let mut numbered = 0;
        for (i, &count) in pages.iter().enumerate() {
            let reported = if i == 0 { total } else { None };
            self.respond(
                &page_url(base_url, i * step),
                Ok(listing_body(numbered, count, reported)),
            );
            numbered += count;
        }
        self.respond(
            &page_url(base_url, pages.len() * step),
            Ok(listing_body(numbered, 0, None)),
        );
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, _headers: Option<&HeaderMap>) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Err(FetchError::Status { status: 404 }))
    }
}

/// Parses `key=value;...` pages produced by [`listing_body`]
pub(crate) struct KeyValueParser;

fn field(body: &str, key: &str) -> Option<usize> {
    body.split(';').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == key {
            v.parse().ok()
        } else {
            None
        }
    })
}

impl ListingParser for KeyValueParser {
    fn parse_listing(&self, body: &str, company: &str, base_url: &str) -> Vec<JobRecord> {
        let offset = field(body, "offset").unwrap_or(0);
        let count = field(body, "count").unwrap_or(0);
        (offset..offset + count)
            .map(|n| JobRecord {
                title: format!("Job {}", n),
                company: company.to_string(),
                location: None,
                url: format!("{}/JobDetail/{}", base_url, n),
                job_id: Some(n.to_string()),
                source_site: base_url.to_string(),
            })
            .collect()
    }

    fn parse_total_count(&self, body: &str) -> Option<usize> {
        field(body, "total").filter(|&t| t > 0)
    }
}
