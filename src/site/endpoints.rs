/// Builds the paginated listing URL for a site
///
/// Implementations must be pure: identical inputs give identical URLs.
pub trait SearchUrlBuilder: Send + Sync {
    fn build_search_url(&self, base_url: &str, offset: usize, page_size: usize) -> String;
}

/// Search endpoint layout of Avature-hosted career sites
#[derive(Debug, Clone, Copy, Default)]
pub struct AvatureSearchUrl;

impl SearchUrlBuilder for AvatureSearchUrl {
    fn build_search_url(&self, base_url: &str, offset: usize, page_size: usize) -> String {
        format!(
            "{}/SearchJobs/?jobOffset={}&jobRecordsPerPage={}",
            base_url.trim_end_matches('/'),
            offset,
            page_size
        )
    }
}
