//! Configuration module for Sitemap-Sieve
//!
//! Configuration comes from an optional TOML file, overlaid by the
//! `SITEMAP_ROOT_URL`, `MATCH_CONTENT` and `MATCH_URL` environment keys, and
//! is validated once before the crawl starts. The resulting [`Config`] is
//! passed by reference into the crawler.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_sieve::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("sieve.toml"))).unwrap();
//! println!("Settle delay: {}ms", config.fetcher.settle_delay);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetcherBackend, FetcherConfig, OutputConfig, SitemapConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, load_config, load_config_with, load_config_with_hash, ENV_MATCH_CONTENT,
    ENV_MATCH_URL, ENV_SITEMAP_ROOT_URL,
};
pub use validation::{validate, validate_for_discovery};

use std::time::Duration;

impl FetcherConfig {
    /// Settle delay as a [`Duration`]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay)
    }

    /// Navigation timeout, `None` when disabled
    pub fn navigation_timeout(&self) -> Option<Duration> {
        (self.navigation_timeout > 0).then(|| Duration::from_millis(self.navigation_timeout))
    }

    /// Selector wait deadline as a [`Duration`]
    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout)
    }
}
