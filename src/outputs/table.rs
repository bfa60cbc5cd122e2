//! Delimited text output (CSV or TSV).
//!
//! A header row is always written. Fields containing the separator, a
//! double quote or a line break are quoted, with inner quotes doubled.

use std::fmt::Write;

use crate::models::{COLUMNS, ExportRow};

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Append one row to `out`, terminated by a newline.
pub fn write_row<S: AsRef<str>>(out: &mut String, row: &[S], sep: char) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        let cell = cell.as_ref();
        if needs_quotes(cell, sep) {
            let _ = write!(out, "\"{}\"", cell.replace('"', "\"\""));
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

/// Render a header row followed by one line per row.
pub fn render(rows: &[ExportRow], sep: char) -> String {
    let mut out = String::new();
    write_row(&mut out, &COLUMNS, sep);
    for row in rows {
        write_row(&mut out, &row.cells(), sep);
    }
    out
}
