//! Utility functions for log formatting, file naming and output paths.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count
/// of the dropped bytes appended. Cuts always fall on a char boundary.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Build an output filename from a stem and extension.
///
/// With a `date`, the abbreviated month and day are appended to the stem,
/// e.g. `feed_data_Jan29.xlsx`.
pub fn dated_filename(stem: &str, ext: &str, date: Option<NaiveDate>) -> PathBuf {
    match date {
        Some(d) => PathBuf::from(format!("{}_{}.{}", stem, d.format("%b%d"), ext)),
        None => PathBuf::from(format!("{stem}.{ext}")),
    }
}

/// Create the parent directory of `path` if it has one and it is missing.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
            info!(dir = %parent.display(), "Output directory ready");
        }
    }
    Ok(())
}
