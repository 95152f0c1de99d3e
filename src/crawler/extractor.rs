//! Paginated site extraction
//!
//! Drives the fetch → parse → continue loop for one site:
//!
//! ```text
//! Start → FetchingPage → ParsingPage → Continue → FetchingPage → ...
//!                  │               └──→ Done (empty page | reached total)
//!                  └──→ Aborted (fetch exhausted)
//! ```
//!
//! The platform does not echo the page size back, so the record count of the
//! first non-empty page is taken as the offset step for the rest of the
//! site. Every non-terminating page adds at least one record, which bounds
//! the loop.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::ListingParser;
use crate::crawler::transport::Transport;
use crate::site::{JobRecord, SearchUrlBuilder, SiteTarget};
use crate::state::{ExtractionState, StopReason};
use crate::SweepError;

/// Result of a completed site extraction
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Records in page order, then in-page order
    pub records: Vec<JobRecord>,

    /// Listing pages fetched, the terminating one included
    pub pages_fetched: usize,

    /// Total reported by the first page, if any
    pub reported_total: Option<usize>,

    /// Step size inferred from the first non-empty page
    pub page_size: Option<usize>,

    pub stop: StopReason,
}

/// Pagination position within one site
#[derive(Debug, Default)]
struct PageCursor {
    offset: usize,
    page_num: usize,
    page_size: Option<usize>,
    reported_total: Option<usize>,
}

/// Extracts every job listed by one site
pub struct SiteExtractor<'a, T> {
    fetcher: &'a Fetcher<T>,
    urls: &'a dyn SearchUrlBuilder,
    parser: &'a dyn ListingParser,
    per_page: usize,
}

impl<'a, T: Transport> SiteExtractor<'a, T> {
    /// # Arguments
    ///
    /// * `per_page` - records requested per listing page
    pub fn new(
        fetcher: &'a Fetcher<T>,
        urls: &'a dyn SearchUrlBuilder,
        parser: &'a dyn ListingParser,
        per_page: usize,
    ) -> Self {
        Self {
            fetcher,
            urls,
            parser,
            per_page,
        }
    }

    /// Fetches and parses listing pages until pagination terminates
    ///
    /// # Errors
    ///
    /// Any page fetch that exhausts its retries aborts the site; records
    /// gathered from earlier pages are discarded.
    pub async fn extract_all(&self, site: &SiteTarget) -> Result<Extraction, SweepError> {
        let company = site.company_name();
        let mut cursor = PageCursor {
            page_num: 1,
            ..PageCursor::default()
        };
        let mut records = Vec::new();
        let mut body = String::new();
        let mut failure = None;
        let mut state = ExtractionState::Start;

        while !state.is_terminal() {
            let next = match state {
                ExtractionState::Start => ExtractionState::FetchingPage,

                ExtractionState::FetchingPage => {
                    let url =
                        self.urls
                            .build_search_url(site.base_url(), cursor.offset, self.per_page);

                    match self.fetcher.fetch(&url).await {
                        Ok(page) => {
                            body = page;
                            ExtractionState::ParsingPage
                        }
                        Err(e) => {
                            tracing::warn!("  Error fetching page {}: {}", cursor.page_num, e);
                            failure = Some(e);
                            ExtractionState::Aborted
                        }
                    }
                }

                ExtractionState::ParsingPage => {
                    self.consume_page(&body, &company, site, &mut cursor, &mut records)
                }

                ExtractionState::Continue => {
                    // set by the first non-empty page, which is the only way here
                    cursor.offset += cursor.page_size.unwrap_or(1);
                    cursor.page_num += 1;
                    ExtractionState::FetchingPage
                }

                ExtractionState::Done(_) | ExtractionState::Aborted => break,
            };

            transition(site, &mut state, next);
        }

        match (state, failure) {
            (ExtractionState::Done(stop), _) => Ok(Extraction {
                records,
                pages_fetched: cursor.page_num,
                reported_total: cursor.reported_total,
                page_size: cursor.page_size,
                stop,
            }),
            (_, Some(e)) => Err(e),
            (state, None) => unreachable!("extraction stopped in state {}", state),
        }
    }

    fn consume_page(
        &self,
        body: &str,
        company: &str,
        site: &SiteTarget,
        cursor: &mut PageCursor,
        records: &mut Vec<JobRecord>,
    ) -> ExtractionState {
        if cursor.page_num == 1 {
            cursor.reported_total = self.parser.parse_total_count(body);
            if let Some(total) = cursor.reported_total {
                tracing::info!("  Total jobs on site: {}", total);
            }
        }

        let page = self.parser.parse_listing(body, company, site.base_url());
        if page.is_empty() {
            return ExtractionState::Done(StopReason::EmptyPage);
        }

        let count = page.len();
        if cursor.page_size.is_none() {
            cursor.page_size = Some(count);
        }
        records.extend(page);
        tracing::info!(
            "  Page {}: {} jobs (total: {})",
            cursor.page_num,
            count,
            records.len()
        );

        match cursor.reported_total {
            Some(total) if records.len() >= total => ExtractionState::Done(StopReason::ReachedTotal),
            _ => ExtractionState::Continue,
        }
    }
}

fn transition(site: &SiteTarget, state: &mut ExtractionState, next: ExtractionState) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid extraction transition {} -> {}",
        state,
        next
    );
    tracing::trace!("{}: {} -> {}", site.subdomain(), state, next);
    *state = next;
}
