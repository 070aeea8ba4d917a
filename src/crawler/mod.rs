//! Crawler module for sitemap discovery
//!
//! This module contains the core crawling logic, including:
//! - Document fetching behind the [`Fetcher`] / [`Session`] traits
//! - Sitemap location extraction
//! - Substring filtering between stages
//! - Overall two-level crawl coordination

#[cfg(feature = "browser")]
mod browser;
mod coordinator;
mod fetcher;
mod filter;
pub mod memory;
mod parser;

#[cfg(feature = "browser")]
pub use browser::{BrowserFetcher, BrowserSession};
pub use coordinator::{Coordinator, CrawlMode, CrawlOutcome, CrawlReport};
pub use fetcher::{
    build_header_map, build_http_client, FetchOptions, Fetcher, HttpFetcher, HttpSession,
    RenderedContent, Session, WaitFor, WaitOutcome, LOCATION_SELECTOR,
};
pub use filter::{apply_rules, filter, FilterRule, FilterStage};
pub use memory::StaticFetcher;
pub use parser::{parse_locations, parse_locations_or_empty};

use crate::config::{Config, FetcherBackend};
use crate::output::FileSink;
use crate::SieveError;

/// Runs a complete crawl with the configured backend
///
/// Batches are written as files into the configured output directory.
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `mode` - Discover from the root sitemap or start from a seed file
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - How the crawl ended
/// * `Err(SieveError)` - Crawl failed
///
/// # Example
///
/// ```no_run
/// use sitemap_sieve::config::load_config;
/// use sitemap_sieve::crawler::{run_crawl, CrawlMode};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(None)?;
/// let outcome = run_crawl(&config, &CrawlMode::Discover).await?;
/// println!("{}", outcome);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, mode: &CrawlMode) -> Result<CrawlOutcome, SieveError> {
    let sink = FileSink::new(&config.output.directory);

    match config.fetcher.backend {
        FetcherBackend::Http => {
            let fetcher = HttpFetcher::new(config.fetcher.clone());
            Coordinator::new(config, fetcher, sink).run(mode).await
        }
        #[cfg(feature = "browser")]
        FetcherBackend::Browser => {
            let fetcher = BrowserFetcher::new(config.fetcher.clone());
            Coordinator::new(config, fetcher, sink).run(mode).await
        }
        #[cfg(not(feature = "browser"))]
        FetcherBackend::Browser => Err(crate::ConfigError::Validation(
            "the browser backend is not compiled in".to_string(),
        )
        .into()),
    }
}
