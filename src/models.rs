//! Data models for captured page states and the posts extracted from them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Snapshot`]: One captured rendering of the feed page's markup
//! - [`Record`]: A single post as extracted from a snapshot
//! - [`ExportRow`]: A record with its export-time ID, in output column order
//!
//! Field names of [`ExportRow`] are renamed to the exported column headers
//! (`ID`, `User`, `Time and Date`, `Title`, `Content`).

use serde::{Deserialize, Serialize};

/// Column headers of the exported table, in output order.
pub const COLUMNS: [&str; 5] = ["ID", "User", "Time and Date", "Title", "Content"];

/// One rendered state of the feed page at a given scroll position.
///
/// A snapshot is immutable once captured; the markup can only be borrowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    markup: String,
}

impl Snapshot {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    /// The raw page markup.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn len(&self) -> usize {
        self.markup.len()
    }
}

/// A single post extracted from the feed.
///
/// Two records are duplicates when all four fields are equal; there is no
/// identity key taken from the page.
///
/// # Fields
///
/// * `user` - Author display name
/// * `timestamp` - Raw `datetime` attribute value, not validated
/// * `title` - Post title
/// * `content` - Post body text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Record {
    pub user: String,
    pub timestamp: String,
    pub title: String,
    pub content: String,
}

/// A [`Record`] paired with its sequential export ID.
///
/// IDs are assigned after deduplication and truncation, starting at 1, and
/// are not stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExportRow {
    #[serde(rename = "ID")]
    pub id: usize,
    #[serde(rename = "User")]
    pub user: String,
    #[serde(rename = "Time and Date")]
    pub time_and_date: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Content")]
    pub content: String,
}

impl ExportRow {
    /// Number records in order, starting at 1.
    pub fn number(records: &[Record]) -> Vec<ExportRow> {
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| ExportRow {
                id: idx + 1,
                user: record.user.clone(),
                time_and_date: record.timestamp.clone(),
                title: record.title.clone(),
                content: record.content.clone(),
            })
            .collect()
    }

    /// The row's cells in [`COLUMNS`] order.
    pub fn cells(&self) -> [String; 5] {
        [
            self.id.to_string(),
            self.user.clone(),
            self.time_and_date.clone(),
            self.title.clone(),
            self.content.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str) -> Record {
        Record {
            user: user.to_string(),
            timestamp: "2025-01-29T10:00:00.000Z".to_string(),
            title: "Title".to_string(),
            content: "Body".to_string(),
        }
    }

    #[test]
    fn test_record_equality_is_full_field() {
        let a = record("alice");
        let mut b = record("alice");
        assert_eq!(a, b);
        b.content = "Other body".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_export_ids_start_at_one() {
        let rows = ExportRow::number(&[record("alice"), record("bob")]);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[1].id, 2);
        assert_eq!(rows[1].user, "bob");
    }

    #[test]
    fn test_export_row_serializes_column_names() {
        let rows = ExportRow::number(&[record("alice")]);
        let json = serde_json::to_string(&rows[0]).unwrap();
        assert!(json.starts_with(r#"{"ID":1,"User":"alice","Time and Date":"#));
        assert!(json.contains(r#""Title":"Title""#));
        assert!(json.contains(r#""Content":"Body""#));
    }

    #[test]
    fn test_cells_follow_column_order() {
        let row = &ExportRow::number(&[record("alice")])[0];
        let cells = row.cells();
        assert_eq!(cells[0], "1");
        assert_eq!(cells[1], "alice");
        assert_eq!(cells[2], "2025-01-29T10:00:00.000Z");
        assert_eq!(COLUMNS[2], "Time and Date");
    }
}
