//! Document fetcher abstraction and HTTP implementation
//!
//! This module handles document retrieval for the crawler, including:
//! - The [`Fetcher`] / [`Session`] capability pair every backend implements
//! - Fetch options (headers, settle delay, navigation timeout, selector wait)
//! - Rendered content with selector-based text extraction
//! - A reqwest-backed implementation with error classification

use crate::config::FetcherConfig;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::time::Duration;

/// Selector for sitemap location entries
pub const LOCATION_SELECTOR: &str = "loc";

/// A selector the session should wait for before handing content back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitFor {
    /// CSS selector that must match at least one node
    pub selector: String,
    /// Upper bound on the wait
    pub timeout: Duration,
}

/// Per-fetch options
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Extra request headers
    pub headers: BTreeMap<String, String>,
    /// Pause after navigation, before extraction
    pub settle_delay: Duration,
    /// Navigation timeout, `None` waits forever
    pub navigation_timeout: Option<Duration>,
    /// Optional selector to wait for
    pub wait_for: Option<WaitFor>,
}

impl FetchOptions {
    /// Builds options for sitemap documents from the fetcher configuration
    pub fn for_sitemaps(config: &FetcherConfig) -> Self {
        Self {
            headers: config.headers.clone(),
            settle_delay: config.settle_delay(),
            navigation_timeout: config.navigation_timeout(),
            wait_for: Some(WaitFor {
                selector: LOCATION_SELECTOR.to_string(),
                timeout: config.selector_timeout(),
            }),
        }
    }
}

/// What happened to the selector wait of a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// No wait was requested
    NotRequested,
    /// The selector matched before the deadline
    Satisfied,
    /// The selector never matched
    TimedOut { selector: String, waited: Duration },
}

/// Content of a fetched document
#[derive(Debug, Clone)]
pub struct RenderedContent {
    /// URL the document was requested from
    pub url: String,
    /// Document markup (HTML or XML)
    pub body: String,
    /// Outcome of the selector wait
    pub wait: WaitOutcome,
}

impl RenderedContent {
    /// Creates content that did not request a selector wait
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
            wait: WaitOutcome::NotRequested,
        }
    }

    /// Returns the trimmed text of every node matching `selector`
    ///
    /// Nodes are returned in document order. Nothing matching, or a selector
    /// that fails to parse, yields an empty vector.
    pub fn extract_all(&self, selector: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse(selector) else {
            tracing::debug!("Ignoring unparsable selector '{}'", selector);
            return Vec::new();
        };

        let document = Html::parse_document(&self.body);
        document
            .select(&selector)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .collect()
    }

    /// Returns true if at least one node matches `selector`
    pub fn contains(&self, selector: &str) -> bool {
        let Ok(selector) = Selector::parse(selector) else {
            return false;
        };
        Html::parse_document(&self.body)
            .select(&selector)
            .next()
            .is_some()
    }
}

/// Opens fetch sessions
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// The session type handed out by this fetcher
    type Session: Session;

    /// Acquires the underlying resources (client, browser process, ...)
    async fn open(&self) -> Result<Self::Session, FetchError>;
}

/// A live fetch session
///
/// Sessions must be closed exactly once, including on error paths.
#[async_trait]
pub trait Session: Send + Sized {
    /// Retrieves one document
    async fn fetch(&mut self, url: &str, options: &FetchOptions)
        -> Result<RenderedContent, FetchError>;

    /// Releases everything the session holds
    async fn close(self) -> Result<(), FetchError>;
}

/// Builds a header map from configured name/value pairs
pub fn build_header_map(headers: &BTreeMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid header '{}'", name),
        }
    }
    map
}

/// Builds an HTTP client with the configured default headers
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitemap_sieve::config::FetcherConfig;
/// use sitemap_sieve::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .default_headers(build_header_map(&config.headers))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(timeout) = config.navigation_timeout() {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Fetcher backed by plain HTTP requests
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    config: FetcherConfig,
}

impl HttpFetcher {
    /// Creates a fetcher using the given configuration
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    type Session = HttpSession;

    async fn open(&self) -> Result<HttpSession, FetchError> {
        let client = build_http_client(&self.config)?;
        tracing::debug!("Opened HTTP fetch session");
        Ok(HttpSession { client })
    }
}

/// Session over a shared reqwest client
#[derive(Debug)]
pub struct HttpSession {
    client: Client,
}

#[async_trait]
impl Session for HttpSession {
    async fn fetch(
        &mut self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<RenderedContent, FetchError> {
        let body = fetch_body(&self.client, url, options).await?;

        if !options.settle_delay.is_zero() {
            tokio::time::sleep(options.settle_delay).await;
        }

        let mut content = RenderedContent::new(url, body);
        if let Some(wait_for) = &options.wait_for {
            // A static document cannot grow new nodes, one check is enough
            content.wait = if content.contains(&wait_for.selector) {
                WaitOutcome::Satisfied
            } else {
                WaitOutcome::TimedOut {
                    selector: wait_for.selector.clone(),
                    waited: wait_for.timeout,
                }
            };
        }

        Ok(content)
    }

    async fn close(self) -> Result<(), FetchError> {
        tracing::debug!("Closed HTTP fetch session");
        Ok(())
    }
}

/// Sends one GET request and classifies the failure modes
async fn fetch_body(client: &Client, url: &str, options: &FetchOptions) -> Result<String, FetchError> {
    let mut request = client.get(url).headers(build_header_map(&options.headers));
    if let Some(timeout) = options.navigation_timeout {
        request = request.timeout(timeout);
    }

    let response = request.send().await.map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| classify_error(url, e))
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Unreachable {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
