//! In-memory fetcher returning canned documents
//!
//! Lets the crawler, parser and filter logic run without any network or
//! browser. Every fetched URL and every session open/close is recorded so
//! callers can assert on the crawl's traffic.

use crate::crawler::fetcher::{FetchOptions, Fetcher, RenderedContent, Session, WaitOutcome};
use crate::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A canned response for one URL
#[derive(Debug, Clone)]
enum Canned {
    Document(String),
    Status(u16),
    Timeout,
}

/// Traffic recorded across all sessions of a [`StaticFetcher`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchLog {
    /// URLs passed to `fetch`, in call order
    pub fetched: Vec<String>,
    /// Number of sessions opened
    pub opened: usize,
    /// Number of sessions closed
    pub closed: usize,
}

/// Fetcher serving documents from a map
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    documents: HashMap<String, Canned>,
    log: Arc<Mutex<FetchLog>>,
}

impl StaticFetcher {
    /// Creates an empty fetcher; every URL fails with `NotFound`
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `url`
    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.documents
            .insert(url.into(), Canned::Document(body.into()));
        self
    }

    /// Serves a sitemap whose `<loc>` entries are `locations`
    pub fn with_sitemap(self, url: impl Into<String>, locations: &[&str]) -> Self {
        self.with_document(url, sitemap_xml(locations))
    }

    /// Fails `url` with the given HTTP status
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.documents.insert(url.into(), Canned::Status(status));
        self
    }

    /// Fails `url` with a navigation timeout
    pub fn with_timeout(mut self, url: impl Into<String>) -> Self {
        self.documents.insert(url.into(), Canned::Timeout);
        self
    }

    /// Snapshot of the traffic recorded so far
    pub fn log(&self) -> FetchLog {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

/// Renders a minimal `<urlset>` document
pub fn sitemap_xml(locations: &[&str]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for location in locations {
        xml.push_str(&format!("  <url><loc>{}</loc></url>\n", location));
    }
    xml.push_str("</urlset>\n");
    xml
}

#[async_trait]
impl Fetcher for StaticFetcher {
    type Session = StaticSession;

    async fn open(&self) -> Result<StaticSession, FetchError> {
        if let Ok(mut log) = self.log.lock() {
            log.opened += 1;
        }
        Ok(StaticSession {
            documents: self.documents.clone(),
            log: Arc::clone(&self.log),
        })
    }
}

/// Session handed out by [`StaticFetcher`]
#[derive(Debug)]
pub struct StaticSession {
    documents: HashMap<String, Canned>,
    log: Arc<Mutex<FetchLog>>,
}

#[async_trait]
impl Session for StaticSession {
    async fn fetch(
        &mut self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<RenderedContent, FetchError> {
        if let Ok(mut log) = self.log.lock() {
            log.fetched.push(url.to_string());
        }

        let body = match self.documents.get(url) {
            Some(Canned::Document(body)) => body.clone(),
            Some(Canned::Status(status)) => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: *status,
                })
            }
            Some(Canned::Timeout) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
            None => {
                return Err(FetchError::NotFound {
                    url: url.to_string(),
                })
            }
        };

        let mut content = RenderedContent::new(url, body);
        if let Some(wait_for) = &options.wait_for {
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
        if let Ok(mut log) = self.log.lock() {
            log.closed += 1;
        }
        Ok(())
    }
}
