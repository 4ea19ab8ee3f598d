//! XLSX serialization of tabular frames.
//!
//! The workbook has a single sheet: a bold header row followed by the data
//! rows, with no index column. Columns whose non-empty values are all finite
//! numbers are written as numeric cells; everything else is written as text.

use rust_xlsxwriter::{Format, Workbook};

use crate::domain::error::{AppError, Result};
use crate::domain::frame::TabularFrame;

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

pub const XLSX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub struct XlsxWriter {
    sheet_name: String,
}

impl Default for XlsxWriter {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl XlsxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    pub fn write_to_bytes(&self, frame: &TabularFrame) -> Result<Vec<u8>> {
        let numeric_columns: Vec<bool> = (0..frame.column_count())
            .map(|idx| is_numeric_column(frame.column(idx)))
            .collect();

        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(&self.sheet_name)?;

            for (col, name) in frame.header().iter().enumerate() {
                sheet.write_string_with_format(0, column_number(col)?, name, &header_format)?;
            }

            for (index, row) in frame.rows().iter().enumerate() {
                let row_num = row_number(index + 1)?;
                for (col, value) in row.iter().enumerate() {
                    if value.is_empty() {
                        continue;
                    }
                    let col_num = column_number(col)?;
                    match parse_number(value) {
                        Some(number) if numeric_columns[col] => {
                            sheet.write_number(row_num, col_num, number)?;
                        }
                        _ => {
                            sheet.write_string(row_num, col_num, value)?;
                        }
                    }
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// A column is numeric when it has at least one value and every non-empty
/// value parses as a finite number.
fn is_numeric_column<'a>(values: impl Iterator<Item = &'a str>) -> bool {
    let mut seen_value = false;
    for value in values.filter(|v| !v.trim().is_empty()) {
        if parse_number(value).is_none() {
            return false;
        }
        seen_value = true;
    }
    seen_value
}

fn row_number(index: usize) -> Result<u32> {
    u32::try_from(index)
        .map_err(|_| AppError::SpreadsheetError(format!("Row {} exceeds sheet limits", index)))
}

fn column_number(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| {
        AppError::SpreadsheetError(format!("Column {} exceeds sheet limits", index))
    })
}
