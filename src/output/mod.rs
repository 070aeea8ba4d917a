//! Output module for persisting discovered URL batches
//!
//! This module handles:
//! - Deterministic, sanitized batch naming
//! - Writing batches as single-column CSV or raw captures
//! - Reading seed URL lists for seeded crawls

mod naming;
mod seed;
mod sink;

pub use naming::{batch_label, sanitize_name, BatchStage, UrlBatch, SEPARATOR};
pub use seed::read_seed_lines;
pub use sink::{FileSink, OutputFormat, ResultSink, CSV_HEADER};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
