//! Sitemap-Sieve: a two-level sitemap harvester
//!
//! This crate walks a root sitemap that lists per-period archive sitemaps,
//! fetches every archive, filters the discovered URLs by substring rules and
//! persists each intermediate batch as it becomes available.

pub mod config;
pub mod crawler;
pub mod output;

use thiserror::Error;

/// Main error type for Sitemap-Sieve operations
#[derive(Debug, Error)]
pub enum SieveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while retrieving a document
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Navigation timeout for {url}")]
    Timeout { url: String },

    #[error("Host unreachable for {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("No canned document for {url}")]
    NotFound { url: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors raised while extracting location entries
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Selector '{selector}' did not appear on {url} within {waited_ms}ms")]
    Timeout {
        url: String,
        selector: String,
        waited_ms: u64,
    },
}

/// Result type alias for Sitemap-Sieve operations
pub type Result<T> = std::result::Result<T, SieveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlMode, CrawlOutcome, CrawlReport, FilterRule, FilterStage};
pub use output::{sanitize_name, FileSink, OutputFormat, ResultSink, UrlBatch};
