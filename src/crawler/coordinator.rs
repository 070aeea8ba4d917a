//! Crawler coordinator - two-level sitemap orchestration
//!
//! The crawl runs as a fixed sequence of stages:
//! 1. Root: fetch the root sitemap and extract the archive URLs
//! 2. Filter-Archives: keep archives matching the content rule, persist them
//! 3. Per-Archive: fetch every archive, persist each non-empty batch and
//!    accumulate its article URLs
//! 4. Filter-Articles: keep articles matching the URL rule, persist them
//!
//! An empty stage ends the run with a logged outcome instead of an error.
//! Every stage persists its batch as soon as it exists, so a failure halfway
//! through a long archive list keeps what was already discovered.

use crate::config::{validate_for_discovery, Config};
use crate::crawler::fetcher::{FetchOptions, Fetcher, RenderedContent, Session};
use crate::crawler::filter::{filter, FilterRule, FilterStage};
use crate::crawler::parser::parse_locations_or_empty;
use crate::output::{
    batch_label, read_seed_lines, BatchStage, OutputFormat, ResultSink, UrlBatch,
};
use crate::SieveError;
use chrono::Utc;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the archive URLs come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlMode {
    /// Discover archives from the root sitemap
    Discover,
    /// Read archives from a seed file in the input directory
    Seeded { file_name: String },
}

/// Counters and artifacts of a run that reached the per-archive stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Archive URLs handed to the per-archive stage
    pub archives_total: usize,
    /// Archives whose fetch failed
    pub archives_failed: usize,
    /// Archives fetched but holding no entries
    pub archives_empty: usize,
    /// Article URLs accumulated across all archives
    pub articles_discovered: usize,
    /// Article URLs kept by the URL filter
    pub articles_kept: usize,
    /// Every file written during the run, in order
    pub persisted: Vec<PathBuf>,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// The root sitemap held no location entries
    NoArchivesFound,
    /// No archive URL matched the content filter
    NoArchivesMatched,
    /// The seed file held no URLs
    EmptySeed,
    /// No article URL survived accumulation and filtering
    NoArticlesMatched(CrawlReport),
    /// The filtered article batch was persisted
    Completed(CrawlReport),
}

impl CrawlOutcome {
    /// The report, when the run got as far as the archives
    pub fn report(&self) -> Option<&CrawlReport> {
        match self {
            Self::NoArticlesMatched(report) | Self::Completed(report) => Some(report),
            _ => None,
        }
    }
}

impl fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoArchivesFound => write!(f, "no archives found on the root sitemap"),
            Self::NoArchivesMatched => write!(f, "no archives matched the content filter"),
            Self::EmptySeed => write!(f, "empty source data in seed file"),
            Self::NoArticlesMatched(_) => write!(f, "no articles matched the URL filter"),
            Self::Completed(report) => write!(
                f,
                "kept {} of {} article URLs from {} archives",
                report.articles_kept, report.articles_discovered, report.archives_total
            ),
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<'a, F, S> {
    config: &'a Config,
    fetcher: F,
    sink: S,
    options: FetchOptions,
    archive_rule: FilterRule,
    article_rule: FilterRule,
}

impl<'a, F, S> Coordinator<'a, F, S>
where
    F: Fetcher,
    S: ResultSink,
{
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `fetcher` - Document retrieval backend
    /// * `sink` - Destination for every persisted batch
    pub fn new(config: &'a Config, fetcher: F, sink: S) -> Self {
        Self {
            options: FetchOptions::for_sitemaps(&config.fetcher),
            archive_rule: FilterRule::new(
                FilterStage::ArchiveContent,
                config.sitemap.match_content.clone(),
            ),
            article_rule: FilterRule::new(FilterStage::ArticleUrl, config.sitemap.match_url.clone()),
            config,
            fetcher,
            sink,
        }
    }

    /// Runs one crawl in the given mode
    ///
    /// The fetch session is opened once and closed exactly once, whether the
    /// run completes, ends early or fails.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The run completed or ended early on an empty stage
    /// * `Err(SieveError)` - Root fetch, seed read or a write failed
    pub async fn run(&self, mode: &CrawlMode) -> Result<CrawlOutcome, SieveError> {
        let seeds = match mode {
            CrawlMode::Discover => {
                validate_for_discovery(self.config)?;
                None
            }
            CrawlMode::Seeded { file_name } => {
                let input_dir = Path::new(&self.config.output.input_directory);
                let seeds = read_seed_lines(input_dir, file_name)?;
                if seeds.is_empty() {
                    tracing::warn!("Empty source data in seed file {}", file_name);
                    return Ok(CrawlOutcome::EmptySeed);
                }
                tracing::info!("Loaded {} archive URLs from {}", seeds.len(), file_name);
                Some(seeds)
            }
        };

        let mut session = self.fetcher.open().await?;

        let outcome = match seeds {
            Some(seeds) => {
                self.crawl_archives(&mut session, &seeds, CrawlReport::default())
                    .await
            }
            None => self.discover(&mut session).await,
        };

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close fetch session: {}", e);
        }

        outcome
    }

    /// Root and Filter-Archives stages, then hands over to the archives
    async fn discover(&self, session: &mut F::Session) -> Result<CrawlOutcome, SieveError> {
        let root = self.config.sitemap.root_url.as_deref().unwrap_or_default();
        let mut report = CrawlReport::default();

        tracing::info!("Fetching root sitemap {}", root);
        let content = session.fetch(root, &self.options).await?;

        let archive_urls = parse_locations_or_empty(&content);
        if archive_urls.is_empty() {
            tracing::info!("No article archive URLs were found on sitemap {}", root);
            return Ok(CrawlOutcome::NoArchivesFound);
        }
        self.capture(&content, &mut report)?;
        tracing::info!("Found {} archive URLs", archive_urls.len());

        let article_archive_urls = filter(&archive_urls, &self.archive_rule);
        if article_archive_urls.is_empty() {
            tracing::info!(
                "Filter '{}' returned 0 article archive URLs for sitemap {}",
                self.archive_rule.pattern,
                root
            );
            return Ok(CrawlOutcome::NoArchivesMatched);
        }

        let batch = UrlBatch::new(BatchStage::ArchiveUrls, article_archive_urls);
        report
            .persisted
            .push(self.sink.persist_batch(&batch, Utc::now())?);

        self.crawl_archives(session, &batch.entries, report).await
    }

    /// Per-Archive and Filter-Articles stages
    async fn crawl_archives(
        &self,
        session: &mut F::Session,
        archive_urls: &[String],
        mut report: CrawlReport,
    ) -> Result<CrawlOutcome, SieveError> {
        report.archives_total = archive_urls.len();
        let mut article_urls: Vec<String> = Vec::new();

        for (index, archive_url) in archive_urls.iter().enumerate() {
            tracing::info!(
                "Fetching archive {}/{}: {}",
                index + 1,
                archive_urls.len(),
                archive_url
            );

            let content = match session.fetch(archive_url, &self.options).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping archive {}: {}", archive_url, e);
                    report.archives_failed += 1;
                    continue;
                }
            };

            let post_urls = parse_locations_or_empty(&content);
            if post_urls.is_empty() {
                tracing::info!("Got empty response, URL: {}", archive_url);
                report.archives_empty += 1;
                continue;
            }
            self.capture(&content, &mut report)?;

            let batch =
                UrlBatch::from_source(BatchStage::ArticleUrls, archive_url.as_str(), index, post_urls);
            report
                .persisted
                .push(self.sink.persist_batch(&batch, Utc::now())?);

            tracing::debug!("Archive {} contributed {} URLs", archive_url, batch.len());
            article_urls.extend(batch.entries);
        }

        report.articles_discovered = article_urls.len();
        if article_urls.is_empty() {
            tracing::info!("Archives returned 0 article URLs");
            return Ok(CrawlOutcome::NoArticlesMatched(report));
        }

        let valid_article_urls = filter(&article_urls, &self.article_rule);
        report.articles_kept = valid_article_urls.len();
        if valid_article_urls.is_empty() {
            tracing::info!(
                "Filter '{}' returned 0 of {} article URLs",
                self.article_rule.pattern,
                article_urls.len()
            );
            return Ok(CrawlOutcome::NoArticlesMatched(report));
        }

        let batch = UrlBatch::new(BatchStage::FilteredArticleUrls, valid_article_urls);
        report
            .persisted
            .push(self.sink.persist_batch(&batch, Utc::now())?);

        tracing::info!(
            "Crawl completed: kept {} of {} article URLs ({} archives failed, {} empty)",
            report.articles_kept,
            report.articles_discovered,
            report.archives_failed,
            report.archives_empty
        );

        Ok(CrawlOutcome::Completed(report))
    }

    /// Writes the fetched document verbatim when raw capture is on
    ///
    /// Only documents that yielded entries are captured, so an empty stage
    /// leaves nothing behind.
    fn capture(&self, content: &RenderedContent, report: &mut CrawlReport) -> Result<(), SieveError> {
        if !self.config.output.capture_raw {
            return Ok(());
        }

        let label = batch_label(BatchStage::RawCapture, Some(&content.url), None, Utc::now());
        let path = self.sink.persist(
            &label,
            std::slice::from_ref(&content.body),
            OutputFormat::Raw,
        )?;
        report.persisted.push(path);
        Ok(())
    }
}
