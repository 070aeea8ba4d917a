use crate::config::types::{Config, FetcherBackend, FetcherConfig, OutputConfig, SitemapConfig};
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_sitemap_config(&config.sitemap)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates what a discovery crawl needs on top of [`validate`]
///
/// A seeded crawl never touches the root sitemap, so the root URL is only
/// mandatory here.
pub fn validate_for_discovery(config: &Config) -> Result<(), ConfigError> {
    match config.sitemap.root_url.as_deref() {
        Some(root) if !root.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::Validation(
            "SITEMAP_ROOT_URL (sitemap.root-url) is required for discovery".to_string(),
        )),
    }
}

/// Validates sitemap configuration
fn validate_sitemap_config(config: &SitemapConfig) -> Result<(), ConfigError> {
    if let Some(root) = &config.root_url {
        let url = Url::parse(root)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", root, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Root URL '{}' must use HTTP or HTTPS",
                root
            )));
        }
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.backend == FetcherBackend::Browser && !cfg!(feature = "browser") {
        return Err(ConfigError::Validation(
            "fetcher.backend = \"browser\" requires building with the `browser` feature"
                .to_string(),
        ));
    }

    for (name, value) in &config.headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ConfigError::Validation(format!("Invalid header name '{}'", name))
        })?;
        HeaderValue::from_str(value).map_err(|_| {
            ConfigError::Validation(format!("Invalid value for header '{}'", name))
        })?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.input_directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "input directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
