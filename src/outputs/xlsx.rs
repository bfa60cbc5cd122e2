//! Excel workbook output.
//!
//! One worksheet, a header row of the column names, then one row per
//! record. `ID` is written as a number, every other cell as text.

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::models::{COLUMNS, ExportRow};

/// Render rows into the bytes of an `.xlsx` file.
pub fn render(rows: &[ExportRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_number(r, 0, row.id as f64)?;
        sheet.write_string(r, 1, &row.user)?;
        sheet.write_string(r, 2, &row.time_and_date)?;
        sheet.write_string(r, 3, &row.title)?;
        sheet.write_string(r, 4, &row.content)?;
    }

    workbook.save_to_buffer()
}
