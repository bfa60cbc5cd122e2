//! Export of collected records to tabular files.
//!
//! # Submodules
//!
//! - [`xlsx`]: Excel workbook with a header row (default)
//! - [`table`]: Delimited text (CSV/TSV) with a header row
//! - [`json`]: JSON array of row objects
//!
//! Every format writes the same columns in the same order:
//! `ID`, `User`, `Time and Date`, `Title`, `Content`. IDs are assigned here,
//! after deduplication and truncation, starting at 1.

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::{ExportRow, Record};
use crate::utils::ensure_parent_dir;

pub mod json;
pub mod table;
pub mod xlsx;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
        }
    }

    /// Render numbered rows in this format.
    pub fn render(self, rows: &[ExportRow]) -> Result<Vec<u8>> {
        match self {
            Self::Xlsx => Ok(xlsx::render(rows)?),
            Self::Csv => Ok(table::render(rows, ',').into_bytes()),
            Self::Tsv => Ok(table::render(rows, '\t').into_bytes()),
            Self::Json => Ok(json::render(rows)?.into_bytes()),
        }
    }
}

/// Number `records` and write them to `path`, creating parent directories.
///
/// An empty record set still produces a file (header only for workbooks
/// and delimited formats, `[]` for JSON).
#[instrument(level = "info", skip(records), fields(path = %path.display(), count = records.len()))]
pub async fn write_records(records: &[Record], path: &Path, format: ExportFormat) -> Result<()> {
    let rows = ExportRow::number(records);
    let body = format.render(&rows)?;

    ensure_parent_dir(path).await?;
    fs::write(path, body).await?;
    info!(rows = rows.len(), "Wrote export file");
    Ok(())
}
