//! Seed file reader for seeded crawls

use crate::output::{OutputError, OutputResult};
use std::fs;
use std::path::Path;

/// Reads one URL per line from `input_dir/file_name`
///
/// Lines are trimmed and blank lines are dropped, so a file holding only
/// whitespace yields an empty list.
pub fn read_seed_lines(input_dir: &Path, file_name: &str) -> OutputResult<Vec<String>> {
    let path = input_dir.join(file_name);
    let content = fs::read_to_string(&path).map_err(|e| OutputError::io(&path, e))?;

    let lines: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    tracing::debug!("Read {} seed lines from {}", lines.len(), path.display());
    Ok(lines)
}
