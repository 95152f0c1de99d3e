//! Site handling module for Jobsweep
//!
//! This module provides the site identity type, site-list loading, the
//! extracted job record, and the search URL builder.

mod endpoints;
mod record;

pub use endpoints::{AvatureSearchUrl, SearchUrlBuilder};
pub use record::JobRecord;

use crate::SweepError;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use url::Url;

/// One career-site instance, identified by its base URL
///
/// Identity is the URL string exactly as read from the input list; the
/// trimmed form returned by [`SiteTarget::base_url`] is only used to build
/// requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteTarget {
    url: String,
    host: String,
}

impl SiteTarget {
    /// Parses a site URL, requiring an http(s) scheme and a host
    pub fn parse(raw: &str) -> Result<Self, SweepError> {
        let invalid = |reason: String| SweepError::InvalidSite {
            url: raw.to_string(),
            reason,
        };

        let parsed = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host".to_string()))?
            .to_lowercase();

        Ok(Self {
            url: raw.to_string(),
            host,
        })
    }

    /// The identity string of this site
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The site URL without trailing slashes, for building requests
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// First label of the host, e.g. `acme` for `https://acme.avature.net`
    pub fn subdomain(&self) -> &str {
        self.host.split('.').next().unwrap_or(&self.host)
    }

    /// Company display name derived from the subdomain
    ///
    /// Every letter that follows a non-letter is upper-cased and the rest
    /// lower-cased, so `acme-corp` becomes `Acme-Corp`.
    pub fn company_name(&self) -> String {
        let mut name = String::with_capacity(self.subdomain().len());
        let mut prev_is_letter = false;
        for c in self.subdomain().chars() {
            if c.is_alphabetic() {
                if prev_is_letter {
                    name.extend(c.to_lowercase());
                } else {
                    name.extend(c.to_uppercase());
                }
                prev_is_letter = true;
            } else {
                name.push(c);
                prev_is_letter = false;
            }
        }
        name
    }
}

impl fmt::Display for SiteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Loads the site list from a text file
///
/// See [`parse_sites`] for the accepted format.
pub fn load_sites(path: &Path) -> Result<Vec<SiteTarget>, SweepError> {
    let content = std::fs::read_to_string(path)?;
    parse_sites(&content)
}

/// Parses a site list: one URL per line
///
/// Lines are trimmed; blank lines and `#` comments are ignored. A URL that
/// appears more than once keeps only its first position.
pub fn parse_sites(content: &str) -> Result<Vec<SiteTarget>, SweepError> {
    let mut seen = HashSet::new();
    let mut sites = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let site = SiteTarget::parse(line)?;
        if seen.insert(site.as_str().to_string()) {
            sites.push(site);
        } else {
            tracing::debug!("Skipping duplicate site {}", line);
        }
    }

    Ok(sites)
}
