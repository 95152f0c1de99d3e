//! HTTP transport
//!
//! A [`Transport`] performs exactly one GET and reports a single-attempt
//! outcome; retrying and pacing live in the fetcher. [`HttpTransport`] is the
//! reqwest-backed implementation:
//! - presents a fixed browser header profile
//! - keeps a cookie store for the lifetime of the session
//! - routes requests through an optional proxy provider

use crate::config::{BrowserProfile, Config};
use crate::proxy::ProxyProvider;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Issues a single GET request
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the body of a 2xx response, or the reason the attempt failed
    async fn get(&self, url: &str, headers: Option<&HeaderMap>) -> Result<String, FetchError>;
}

const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const FIREFOX_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0";

/// Default request headers of a browser profile
pub fn profile_headers(profile: BrowserProfile) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );

    match profile {
        BrowserProfile::Chrome => {
            headers.insert(
                reqwest::header::USER_AGENT,
                HeaderValue::from_static(CHROME_USER_AGENT),
            );
            headers.insert(
                HeaderName::from_static("sec-ch-ua"),
                HeaderValue::from_static(
                    "\"Chromium\";v=\"124\", \"Google Chrome\";v=\"124\", \"Not-A.Brand\";v=\"99\"",
                ),
            );
            headers.insert(
                HeaderName::from_static("sec-ch-ua-mobile"),
                HeaderValue::from_static("?0"),
            );
            headers.insert(
                HeaderName::from_static("sec-ch-ua-platform"),
                HeaderValue::from_static("\"Windows\""),
            );
        }
        BrowserProfile::Firefox => {
            headers.insert(
                reqwest::header::USER_AGENT,
                HeaderValue::from_static(FIREFOX_USER_AGENT),
            );
        }
    }

    headers
}

/// Builds an HTTP client for the given profile, optionally behind a proxy
pub fn build_http_client(
    profile: BrowserProfile,
    timeout: Duration,
    proxy: Option<&str>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .default_headers(profile_headers(profile))
        .cookie_store(true)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(endpoint) = proxy {
        builder = builder.proxy(Proxy::all(endpoint)?);
    }

    builder.build()
}

/// reqwest-backed transport
///
/// One client per proxy endpoint is built up front; a request uses the
/// client of whichever endpoint the provider hands out, or the direct
/// client when there is no provider.
pub struct HttpTransport {
    direct: Client,
    proxied: HashMap<String, Client>,
    proxies: Option<Arc<dyn ProxyProvider>>,
}

impl HttpTransport {
    pub fn new(
        profile: BrowserProfile,
        timeout: Duration,
        proxies: Option<Arc<dyn ProxyProvider>>,
    ) -> Result<Self, reqwest::Error> {
        let direct = build_http_client(profile, timeout, None)?;

        let mut proxied = HashMap::new();
        if let Some(provider) = &proxies {
            for endpoint in provider.endpoints() {
                let client = build_http_client(profile, timeout, Some(endpoint))?;
                proxied.insert(endpoint.clone(), client);
            }
        }

        Ok(Self {
            direct,
            proxied,
            proxies,
        })
    }

    pub fn from_config(
        config: &Config,
        proxies: Option<Arc<dyn ProxyProvider>>,
    ) -> Result<Self, reqwest::Error> {
        Self::new(config.client.profile, config.fetch.timeout(), proxies)
    }

    fn client(&self) -> &Client {
        let endpoint = self.proxies.as_ref().and_then(|p| p.next_proxy());
        match endpoint {
            Some(endpoint) => self.proxied.get(endpoint).unwrap_or(&self.direct),
            None => &self.direct,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, headers: Option<&HeaderMap>) -> Result<String, FetchError> {
        let mut request = self.client().get(url);
        if let Some(headers) = headers {
            request = request.headers(headers.clone());
        }

        let response = request.send().await.map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Transport(format!("connection failed: {}", e))
    } else {
        FetchError::Transport(e.to_string())
    }
}
