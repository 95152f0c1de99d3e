//! Proxy pool support
//!
//! A proxy list is optional. When present, the HTTP transport asks a
//! [`ProxyProvider`] which endpoint to route each request through; when
//! absent, requests go out directly and nothing else changes.

use crate::SweepError;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// Supplies proxy endpoints to the transport
pub trait ProxyProvider: Send + Sync {
    /// Every endpoint this provider may hand out
    fn endpoints(&self) -> &[String];

    /// The endpoint for the next request, or `None` for a direct connection
    fn next_proxy(&self) -> Option<&str>;
}

/// A fixed list of proxy endpoints rotated round-robin
#[derive(Debug)]
pub struct ProxyPool {
    endpoints: Vec<String>,
    cursor: AtomicUsize,
}

impl ProxyPool {
    pub fn new(endpoints: Vec<String>) -> Self {
        Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Loads a proxy list from a file
    ///
    /// Returns `Ok(None)` when the file does not exist or lists no
    /// endpoints, which means direct connections.
    pub fn load(path: &Path) -> Result<Option<Self>, SweepError> {
        if !path.exists() {
            tracing::info!("Proxies: none (direct connection)");
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let pool = Self::parse(&content)?;
        if pool.is_empty() {
            tracing::info!("Proxies: {} is empty (direct connection)", path.display());
            return Ok(None);
        }

        tracing::info!("Proxies: {} loaded", pool.len());
        Ok(Some(pool))
    }

    /// Parses one endpoint per line; blank lines and `#` comments are skipped
    ///
    /// Entries without a scheme (`host:port`, `user:pass@host:port`) are
    /// treated as `http://` proxies.
    pub fn parse(content: &str) -> Result<Self, SweepError> {
        let mut endpoints = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            endpoints.push(normalize_endpoint(line)?);
        }
        Ok(Self::new(endpoints))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl ProxyProvider for ProxyPool {
    fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    fn next_proxy(&self) -> Option<&str> {
        if self.endpoints.is_empty() {
            return None;
        }
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.endpoints.len();
        Some(&self.endpoints[idx])
    }
}

/// Proxy schemes the HTTP transport can route through
pub(crate) const PROXY_SCHEMES: &[&str] = &["http", "https"];

fn normalize_endpoint(raw: &str) -> Result<String, SweepError> {
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let invalid = |reason: String| SweepError::InvalidProxy {
        endpoint: raw.to_string(),
        reason,
    };

    let url = Url::parse(&with_scheme).map_err(|e| invalid(e.to_string()))?;
    if !PROXY_SCHEMES.contains(&url.scheme()) {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }

    Ok(with_scheme)
}
