//! Substring filters applied between crawl stages

/// The crawl stage a rule narrows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterStage {
    /// Applied to archive sitemap URLs found in the root sitemap
    ArchiveContent,
    /// Applied to the accumulated article URLs
    ArticleUrl,
}

/// A substring predicate bound to a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub stage: FilterStage,
    pub pattern: String,
}

impl FilterRule {
    /// Creates a rule for the given stage
    pub fn new(stage: FilterStage, pattern: impl Into<String>) -> Self {
        Self {
            stage,
            pattern: pattern.into(),
        }
    }

    /// Returns true if `url` contains the pattern
    ///
    /// The test is case-sensitive. An empty pattern matches every URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use sitemap_sieve::crawler::{FilterRule, FilterStage};
    ///
    /// let rule = FilterRule::new(FilterStage::ArticleUrl, "/2023/");
    /// assert!(rule.matches("https://example.com/2023/05/post"));
    /// assert!(!rule.matches("https://example.com/2022/05/post"));
    /// ```
    pub fn matches(&self, url: &str) -> bool {
        url.contains(self.pattern.as_str())
    }
}

/// Keeps the URLs matching `rule`, in input order
pub fn filter(urls: &[String], rule: &FilterRule) -> Vec<String> {
    urls.iter().filter(|url| rule.matches(url)).cloned().collect()
}

/// Applies every rule in turn
pub fn apply_rules(urls: &[String], rules: &[FilterRule]) -> Vec<String> {
    rules
        .iter()
        .fold(urls.to_vec(), |kept, rule| filter(&kept, rule))
}
