//! JSON output: an array of objects keyed by the column names.
//!
//! ```text
//! [
//!   {
//!     "ID": 1,
//!     "User": "...",
//!     "Time and Date": "...",
//!     "Title": "...",
//!     "Content": "..."
//!   }
//! ]
//! ```

use crate::error::Result;
use crate::models::ExportRow;

pub fn render(rows: &[ExportRow]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    #[test]
    fn test_render_round_trips_rows() {
        let rows = ExportRow::number(&[Record {
            user: "bob".to_string(),
            timestamp: "2025-01-29T10:00:00.000Z".to_string(),
            title: "T".to_string(),
            content: "C".to_string(),
        }]);
        let text = render(&rows).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["ID"], 1);
        assert_eq!(value[0]["User"], "bob");
        assert_eq!(value[0]["Time and Date"], "2025-01-29T10:00:00.000Z");
    }
}
