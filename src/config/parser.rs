use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment key holding the root sitemap URL
pub const ENV_SITEMAP_ROOT_URL: &str = "SITEMAP_ROOT_URL";

/// Environment key holding the archive URL filter
pub const ENV_MATCH_CONTENT: &str = "MATCH_CONTENT";

/// Environment key holding the article URL filter
pub const ENV_MATCH_URL: &str = "MATCH_URL";

/// Loads, overlays and validates the configuration
///
/// When `path` is `None` the built-in defaults are used as the base. The
/// process environment is consulted for `SITEMAP_ROOT_URL`, `MATCH_CONTENT`
/// and `MATCH_URL`, which take precedence over the file.
///
/// # Arguments
///
/// * `path` - Optional path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] but with an injected environment lookup
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let base: Config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => Config::default(),
    };

    overlay_and_validate(base, lookup)
}

/// Loads a configuration file and returns it with the hash of its content
///
/// The file is read once; the hash covers exactly the bytes the
/// configuration was parsed from.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok((Config, String))` - The validated configuration and its hex-encoded SHA-256 hash
/// * `Err(ConfigError)` - Failed to read, parse, or validate the file
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let base: Config = toml::from_str(&content)?;
    let config = overlay_and_validate(base, |key| std::env::var(key).ok())?;
    Ok((config, hash_content(&content)))
}

fn overlay_and_validate<F>(mut config: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, lookup);

    validate(&config)?;

    Ok(config)
}

/// Overlays the environment-style keys onto a configuration
///
/// Keys that are unset or blank leave the configured value untouched.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(root_url) = read(ENV_SITEMAP_ROOT_URL) {
        config.sitemap.root_url = Some(root_url.trim().to_string());
    }
    if let Some(match_content) = read(ENV_MATCH_CONTENT) {
        config.sitemap.match_content = match_content;
    }
    if let Some(match_url) = read(ENV_MATCH_URL) {
        config.sitemap.match_url = match_url;
    }
}

/// Hex-encoded SHA-256 of the configuration text
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
