//! Result sinks
//!
//! A sink receives fully assembled record sets and writes them under a
//! sanitized name. Files are written to a temporary name first and renamed
//! into place, so a reader never sees half a batch.

use crate::output::naming::{sanitize_name, UrlBatch};
use crate::output::{OutputError, OutputResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Header of the single CSV column
pub const CSV_HEADER: &str = "URL";

/// On-disk shape of a persisted record set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One-column CSV with a `URL` header
    Delimited,
    /// Records written verbatim, newline separated
    Raw,
}

impl OutputFormat {
    /// File extension used for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Delimited => "csv",
            Self::Raw => "xml",
        }
    }
}

/// Trait for result sinks
pub trait ResultSink {
    /// Persists `records` under `name`
    ///
    /// # Arguments
    ///
    /// * `name` - Label of the record set; sanitized before use
    /// * `records` - The records, in order
    /// * `format` - Output shape
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the records were written
    /// * `Err(OutputError)` - The target could not be written
    fn persist(&self, name: &str, records: &[String], format: OutputFormat)
        -> OutputResult<PathBuf>;

    /// Persists a batch as CSV, labelled for `stamp`
    fn persist_batch(&self, batch: &UrlBatch, stamp: DateTime<Utc>) -> OutputResult<PathBuf> {
        self.persist(&batch.label(stamp), &batch.entries, OutputFormat::Delimited)
    }
}

/// Sink writing files into one directory
#[derive(Debug, Clone)]
pub struct FileSink {
    directory: PathBuf,
}

impl FileSink {
    /// Creates a sink rooted at `directory`; the directory is created on first write
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Final path for a label and format
    pub fn path_for(&self, name: &str, format: OutputFormat) -> PathBuf {
        self.directory
            .join(format!("{}.{}", sanitize_name(name), format.extension()))
    }
}

impl ResultSink for FileSink {
    fn persist(
        &self,
        name: &str,
        records: &[String],
        format: OutputFormat,
    ) -> OutputResult<PathBuf> {
        fs::create_dir_all(&self.directory).map_err(|e| OutputError::io(&self.directory, e))?;

        let path = self.path_for(name, format);
        let staging = path.with_extension(format!("{}.tmp", format.extension()));

        let written = match format {
            OutputFormat::Delimited => write_delimited(&staging, records),
            OutputFormat::Raw => {
                fs::write(&staging, records.join("\n")).map_err(|e| OutputError::io(&staging, e))
            }
        };

        if let Err(e) = written {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }

        fs::rename(&staging, &path).map_err(|e| OutputError::io(&path, e))?;

        tracing::info!("{} saved ({} records)", path.display(), records.len());
        Ok(path)
    }
}

/// Writes a single-column CSV with header
fn write_delimited(path: &Path, records: &[String]) -> OutputResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([CSV_HEADER])?;
    for record in records {
        writer.write_record([record.as_str()])?;
    }
    writer.flush().map_err(|e| OutputError::io(path, e))?;
    Ok(())
}
