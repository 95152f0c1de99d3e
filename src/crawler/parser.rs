//! Listing page parser
//!
//! Turns one search-results page into job records and, on the first page,
//! the total job count the site reports. Parsers are pure functions over the
//! page body and sit behind [`ListingParser`] so another listing layout can be
//! swapped in without touching the crawl loop.

use crate::site::JobRecord;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Extracts job records from a listing page
pub trait ListingParser: Send + Sync {
    /// Jobs on this page, in page order
    fn parse_listing(&self, body: &str, company: &str, base_url: &str) -> Vec<JobRecord>;

    /// The site's reported total job count, if the page shows one
    fn parse_total_count(&self, body: &str) -> Option<usize>;
}

const RESULT_SELECTOR: &str = "article.article--result";
const TITLE_LINK_SELECTOR: &str = ".article__header__text__title a";
const SUBTITLE_SELECTOR: &str = ".article__header__text__subtitle";
const LEGEND_SELECTOR: &str = ".list-controls__text__legend";

/// Parser for Avature search-results markup
///
/// Each job is an `article.article--result` with a title link and an
/// optional subtitle line (location and similar metadata). The results
/// legend reads like "1-50 of 123 results".
#[derive(Debug, Clone, Copy, Default)]
pub struct AvatureListingParser;

impl ListingParser for AvatureListingParser {
    fn parse_listing(&self, body: &str, company: &str, base_url: &str) -> Vec<JobRecord> {
        let document = Html::parse_document(body);
        let (Ok(result_sel), Ok(link_sel), Ok(subtitle_sel)) = (
            Selector::parse(RESULT_SELECTOR),
            Selector::parse(TITLE_LINK_SELECTOR),
            Selector::parse(SUBTITLE_SELECTOR),
        ) else {
            return Vec::new();
        };

        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).ok();

        document
            .select(&result_sel)
            .filter_map(|article| {
                let link = article.select(&link_sel).next()?;
                let title = collapse_text(link);
                if title.is_empty() {
                    return None;
                }

                let href = link.value().attr("href")?.trim();
                let url = resolve_link(href, base.as_ref())?;

                let location = article
                    .select(&subtitle_sel)
                    .next()
                    .map(collapse_text)
                    .filter(|s| !s.is_empty());

                Some(JobRecord {
                    title,
                    company: company.to_string(),
                    location,
                    job_id: job_id_from_url(&url),
                    url,
                    source_site: base_url.to_string(),
                })
            })
            .collect()
    }

    fn parse_total_count(&self, body: &str) -> Option<usize> {
        let document = Html::parse_document(body);
        let legend_sel = Selector::parse(LEGEND_SELECTOR).ok()?;
        let legend = document.select(&legend_sel).next().map(collapse_text)?;
        total_from_legend(&legend)
    }
}

/// Element text with runs of whitespace collapsed to single spaces
fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve_link(href: &str, base: Option<&Url>) -> Option<String> {
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    let absolute = match Url::parse(href) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(href).ok()?,
        Err(_) => return None,
    };

    match absolute.scheme() {
        "http" | "https" => Some(absolute.to_string()),
        _ => None,
    }
}

/// Trailing all-digit path segment, e.g. `.../JobDetail/Engineer/4521` → `4521`
fn job_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .filter(|s| s.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

/// Reads the total from a legend such as "1-50 of 1,234 results"
///
/// A reported total of zero counts as no total.
fn total_from_legend(legend: &str) -> Option<usize> {
    static OF_TOTAL: OnceLock<Option<Regex>> = OnceLock::new();
    static BARE_TOTAL: OnceLock<Option<Regex>> = OnceLock::new();

    let of_total = OF_TOTAL
        .get_or_init(|| Regex::new(r"(?i)\bof\s+(\d[\d,.]*)").ok())
        .as_ref()?;
    let bare_total = BARE_TOTAL
        .get_or_init(|| Regex::new(r"(?i)(\d[\d,.]*)\s+(?:results|jobs)").ok())
        .as_ref()?;

    let digits = of_total
        .captures(legend)
        .or_else(|| bare_total.captures(legend))?
        .get(1)?
        .as_str()
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();

    digits.parse::<usize>().ok().filter(|&total| total > 0)
}
