//! Batch naming
//!
//! Every persisted file name goes through [`sanitize_name`], because archive
//! URLs end up verbatim inside labels.

use chrono::{DateTime, Utc};

/// Character replacing every run of unsafe characters
pub const SEPARATOR: char = '-';

/// Label used when sanitizing leaves nothing behind
const FALLBACK_NAME: &str = "untitled";

/// Discovery stage a batch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchStage {
    /// Archive URLs kept after the content filter
    ArchiveUrls,
    /// Article URLs found in one archive
    ArticleUrls,
    /// Article URLs kept after the URL filter
    FilteredArticleUrls,
    /// A fetched document captured verbatim
    RawCapture,
}

impl BatchStage {
    /// Tag leading the file name
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ArchiveUrls => "archive-urls",
            Self::ArticleUrls => "article-urls-for",
            Self::FilteredArticleUrls => "filtered-article-urls",
            Self::RawCapture => "raw",
        }
    }
}

/// A named, ordered set of URLs produced by one discovery stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBatch {
    pub stage: BatchStage,
    /// URL the entries were discovered in, if any
    pub source: Option<String>,
    /// Position of the source within its stage
    pub sequence: Option<usize>,
    pub entries: Vec<String>,
}

impl UrlBatch {
    /// Creates a batch without a source
    pub fn new(stage: BatchStage, entries: Vec<String>) -> Self {
        Self {
            stage,
            source: None,
            sequence: None,
            entries,
        }
    }

    /// Creates a batch tied to the document it was discovered in
    pub fn from_source(
        stage: BatchStage,
        source: impl Into<String>,
        sequence: usize,
        entries: Vec<String>,
    ) -> Self {
        Self {
            stage,
            source: Some(source.into()),
            sequence: Some(sequence),
            entries,
        }
    }

    /// File label for this batch at `stamp`
    pub fn label(&self, stamp: DateTime<Utc>) -> String {
        batch_label(self.stage, self.source.as_deref(), self.sequence, stamp)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the storage label of a batch
///
/// Format: `{stage-tag}[-{seq:03}][-{source}]-{timestamp}`, sanitized.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use sitemap_sieve::output::{batch_label, BatchStage};
///
/// let stamp = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
/// let label = batch_label(
///     BatchStage::ArticleUrls,
///     Some("https://x.com/post-sitemap1.xml"),
///     Some(1),
///     stamp,
/// );
/// assert_eq!(
///     label,
///     "article-urls-for-001-https-x-com-post-sitemap1-xml-20240301t123005000"
/// );
/// ```
pub fn batch_label(
    stage: BatchStage,
    source: Option<&str>,
    sequence: Option<usize>,
    stamp: DateTime<Utc>,
) -> String {
    let mut label = stage.tag().to_string();
    if let Some(sequence) = sequence {
        label.push_str(&format!("-{:03}", sequence));
    }
    if let Some(source) = source {
        label.push(SEPARATOR);
        label.push_str(source);
    }
    label.push(SEPARATOR);
    label.push_str(&stamp.format("%Y%m%dT%H%M%S%3f").to_string());

    sanitize_name(&label)
}

/// Turns an arbitrary label into a safe storage identifier
///
/// ASCII alphanumerics are lower-cased and kept; every run of other
/// characters collapses into a single [`SEPARATOR`]; separators are trimmed
/// from both ends. A label with nothing left becomes `untitled`. The function
/// is idempotent.
///
/// # Examples
///
/// ```
/// use sitemap_sieve::output::sanitize_name;
///
/// assert_eq!(sanitize_name("https://Example.com/Sitemap.XML"), "https-example-com-sitemap-xml");
/// assert_eq!(sanitize_name("---"), "untitled");
/// ```
pub fn sanitize_name(label: &str) -> String {
    let mut sanitized = String::with_capacity(label.len());
    let mut pending_separator = false;

    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !sanitized.is_empty() {
                sanitized.push(SEPARATOR);
            }
            pending_separator = false;
            sanitized.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if sanitized.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, 5, 8, 9, 10).unwrap()
    }

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize_name("Archive URLs"), "archive-urls");
        assert_eq!(
            sanitize_name("https://x.com/a1?page=2#top"),
            "https-x-com-a1-page-2-top"
        );
    }

    #[test]
    fn test_sanitize_trims_and_collapses() {
        assert_eq!(sanitize_name("  __hello__world__  "), "hello-world");
        assert_eq!(sanitize_name("a///b"), "a-b");
    }

    #[test]
    fn test_sanitize_non_ascii() {
        assert_eq!(sanitize_name("café/übersicht"), "caf-bersicht");
        assert_eq!(sanitize_name("日本語"), "untitled");
        assert_eq!(sanitize_name(""), "untitled");
    }

    #[test]
    fn test_sanitize_output_alphabet() {
        let samples = [
            "https://EXAMPLE.com/Post-Sitemap1.xml",
            "-leading and trailing-",
            "tab\tnew\nline",
            "MiXeD 123 !@#$%^&*()",
            "ünïcödé-only-ßtuff",
            "",
        ];
        for sample in samples {
            let sanitized = sanitize_name(sample);
            assert!(
                sanitized
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == SEPARATOR),
                "unexpected character in {:?}",
                sanitized
            );
            assert!(!sanitized.starts_with(SEPARATOR));
            assert!(!sanitized.ends_with(SEPARATOR));
        }
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let samples = [
            "https://x.com/a1",
            "Already-clean",
            "--x--",
            "",
            "ÆØÅ",
            "a - b - c",
        ];
        for sample in samples {
            let once = sanitize_name(sample);
            assert_eq!(sanitize_name(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_batch_label_without_source() {
        assert_eq!(
            batch_label(BatchStage::ArchiveUrls, None, None, stamp()),
            "archive-urls-20231105t080910000"
        );
        assert_eq!(
            batch_label(BatchStage::FilteredArticleUrls, None, None, stamp()),
            "filtered-article-urls-20231105t080910000"
        );
    }

    #[test]
    fn test_batch_label_distinguishes_sources() {
        let a = batch_label(BatchStage::ArticleUrls, Some("https://x.com/a1"), Some(0), stamp());
        let b = batch_label(BatchStage::ArticleUrls, Some("https://x.com/a2"), Some(1), stamp());
        assert_ne!(a, b);
        assert_eq!(a, "article-urls-for-000-https-x-com-a1-20231105t080910000");
    }

    #[test]
    fn test_batch_label_sequence_disambiguates_repeats() {
        let first = batch_label(BatchStage::ArticleUrls, Some("https://x.com/a"), Some(0), stamp());
        let again = batch_label(BatchStage::ArticleUrls, Some("https://x.com/a"), Some(1), stamp());
        assert_ne!(first, again);
    }

    #[test]
    fn test_url_batch_label() {
        let batch = UrlBatch::from_source(
            BatchStage::ArticleUrls,
            "https://x.com/a1",
            2,
            vec!["https://x.com/a1/post".to_string()],
        );
        assert_eq!(batch.len(), 1);
        assert!(!batch.is_empty());
        assert_eq!(
            batch.label(stamp()),
            "article-urls-for-002-https-x-com-a1-20231105t080910000"
        );
    }
}
