use serde::Deserialize;
use std::collections::BTreeMap;

/// Header sent by default so sitemap hosts treat the crawler like a browser
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure for Sitemap-Sieve
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sitemap: SitemapConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where discovery starts and how results are narrowed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SitemapConfig {
    /// Root sitemap listing the archive sitemaps
    #[serde(rename = "root-url", default)]
    pub root_url: Option<String>,

    /// Substring an archive URL must contain to be visited
    #[serde(rename = "match-content", default)]
    pub match_content: String,

    /// Substring an article URL must contain to be kept
    #[serde(rename = "match-url", default)]
    pub match_url: String,
}

/// Which document retrieval backend to drive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherBackend {
    /// Plain HTTP requests through reqwest
    #[default]
    Http,
    /// Headless Chromium through the devtools protocol
    Browser,
}

/// Document retrieval configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    #[serde(default)]
    pub backend: FetcherBackend,

    /// Pause after navigation before extraction (milliseconds)
    #[serde(rename = "settle-delay", default = "default_settle_delay")]
    pub settle_delay: u64,

    /// Per-navigation timeout (milliseconds, 0 disables the timeout)
    #[serde(rename = "navigation-timeout", default = "default_navigation_timeout")]
    pub navigation_timeout: u64,

    /// How long to wait for a `<loc>` node to appear (milliseconds)
    #[serde(rename = "selector-timeout", default = "default_selector_timeout")]
    pub selector_timeout: u64,

    /// Run the browser backend without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Extra request headers
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            backend: FetcherBackend::default(),
            settle_delay: default_settle_delay(),
            navigation_timeout: default_navigation_timeout(),
            selector_timeout: default_selector_timeout(),
            headless: default_headless(),
            headers: default_headers(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving persisted batches
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Directory seed files are read from
    #[serde(rename = "input-directory", default = "default_input_directory")]
    pub input_directory: String,

    /// Also persist every fetched document verbatim
    #[serde(rename = "capture-raw", default)]
    pub capture_raw: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            input_directory: default_input_directory(),
            capture_raw: false,
        }
    }
}

fn default_settle_delay() -> u64 {
    3000
}

fn default_navigation_timeout() -> u64 {
    30_000
}

fn default_selector_timeout() -> u64 {
    30_000
}

fn default_headless() -> bool {
    true
}

fn default_headers() -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string());
    headers.insert(
        "Accept".to_string(),
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
    );
    headers.insert("Accept-Language".to_string(), "en-US,en;q=0.9".to_string());
    headers
}

fn default_output_directory() -> String {
    "results".to_string()
}

fn default_input_directory() -> String {
    "input".to_string()
}
