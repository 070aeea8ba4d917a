//! Headless-browser fetcher
//!
//! Drives Chromium over the devtools protocol for sitemap hosts that only
//! serve their documents to something that looks like a real browser. One
//! browser process backs a session; every fetch runs in a fresh page that is
//! closed before `fetch` returns.

use crate::config::FetcherConfig;
use crate::crawler::fetcher::{FetchOptions, Fetcher, RenderedContent, Session, WaitOutcome};
use crate::FetchError;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Viewport used for every page
const VIEWPORT: (u32, u32) = (1080, 1024);

/// Interval between selector checks
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Fetcher that launches a Chromium process per session
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    config: FetcherConfig,
}

impl BrowserFetcher {
    /// Creates a fetcher using the given configuration
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    type Session = BrowserSession;

    async fn open(&self) -> Result<BrowserSession, FetchError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(VIEWPORT.0, VIEWPORT.1)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(timeout) = self.config.navigation_timeout() {
            builder = builder.request_timeout(timeout);
        }

        let browser_config = builder.build().map_err(FetchError::Browser)?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::info!(
            "Launched browser (headless: {})",
            self.config.headless
        );

        Ok(BrowserSession { browser, handler })
    }
}

/// A running browser process and its event loop
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

#[async_trait]
impl Session for BrowserSession {
    async fn fetch(
        &mut self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<RenderedContent, FetchError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        let rendered = render(&page, url, options).await;

        if let Err(e) = page.close().await {
            tracing::warn!("Failed to close page for {}: {}", url, e);
        }

        rendered
    }

    async fn close(mut self) -> Result<(), FetchError> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| FetchError::Browser(e.to_string()));
        let _ = self.browser.wait().await;
        self.handler.abort();
        tracing::info!("Browser closed");
        closed
    }
}

/// Navigates `page` to `url`, lets it settle and waits for the selector
async fn render(page: &Page, url: &str, options: &FetchOptions) -> Result<RenderedContent, FetchError> {
    apply_headers(page, options).await?;

    let navigation = page.goto(url);
    let navigated = match options.navigation_timeout {
        Some(timeout) => tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })?,
        None => navigation.await,
    };
    navigated.map_err(|e| FetchError::Navigation {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    if !options.settle_delay.is_zero() {
        tokio::time::sleep(options.settle_delay).await;
    }

    let wait = match &options.wait_for {
        Some(wait_for) => wait_for_selector(page, &wait_for.selector, wait_for.timeout).await,
        None => WaitOutcome::NotRequested,
    };

    let body = page
        .content()
        .await
        .map_err(|e| FetchError::Browser(e.to_string()))?;

    Ok(RenderedContent {
        url: url.to_string(),
        body,
        wait,
    })
}

/// Sends the configured headers; `User-Agent` goes through the override API
async fn apply_headers(page: &Page, options: &FetchOptions) -> Result<(), FetchError> {
    let mut extra = serde_json::Map::new();
    for (name, value) in &options.headers {
        if name.eq_ignore_ascii_case("user-agent") {
            page.set_user_agent(value.as_str())
                .await
                .map_err(|e| FetchError::Browser(e.to_string()))?;
        } else {
            extra.insert(name.clone(), serde_json::Value::String(value.clone()));
        }
    }

    if !extra.is_empty() {
        page.execute(SetExtraHttpHeadersParams::new(Headers::new(
            serde_json::Value::Object(extra),
        )))
        .await
        .map_err(|e| FetchError::Browser(e.to_string()))?;
    }

    Ok(())
}

/// Polls until `selector` matches or `timeout` elapses
async fn wait_for_selector(page: &Page, selector: &str, timeout: Duration) -> WaitOutcome {
    let started = Instant::now();
    loop {
        let found = page
            .find_elements(selector)
            .await
            .map(|elements| !elements.is_empty())
            .unwrap_or(false);
        if found {
            return WaitOutcome::Satisfied;
        }

        let waited = started.elapsed();
        if waited >= timeout {
            return WaitOutcome::TimedOut {
                selector: selector.to_string(),
                waited,
            };
        }
        tokio::time::sleep(POLL_INTERVAL.min(timeout - waited)).await;
    }
}
