// ============================================================
// CSV PARSER
// ============================================================
// Parse uploaded CSV bytes into a TabularFrame with encoding fallback

use std::borrow::Cow;
use std::collections::HashSet;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::domain::error::AppError;
use crate::domain::frame::TabularFrame;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV parser producing tabular frames
pub struct CsvParser {
    /// Delimiter character (default: pipe)
    delimiter: u8,

    /// Whether to trim whitespace from values
    trim: bool,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: b'|',
            trim: false,
        }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to trim whitespace
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Parse raw uploaded bytes
    pub fn parse_bytes(&self, content: &[u8]) -> Result<TabularFrame, AppError> {
        let text = decode_content(content);
        self.parse_content(&text)
    }

    /// Parse CSV content from string.
    ///
    /// The first record is the header. Short rows are padded with empty
    /// cells; a row wider than the header is rejected.
    pub fn parse_content(&self, content: &str) -> Result<TabularFrame, AppError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut records = reader.records();

        let header_record = match records.next() {
            Some(result) => result.map_err(|e| {
                AppError::ParseError(format!("Failed to read CSV headers: {}", e))
            })?,
            None => {
                return Err(AppError::ParseError(
                    "No columns to parse from file".to_string(),
                ))
            }
        };

        let header = normalize_header(&header_record);
        let width = header.len();
        let mut frame = TabularFrame::new(header);

        for result in records {
            let record = result.map_err(|e| {
                AppError::ParseError(format!(
                    "Failed to parse CSV row {}: {}",
                    frame.row_count() + 1,
                    e
                ))
            })?;

            if record.len() > width {
                let line = record
                    .position()
                    .map(|pos| pos.line())
                    .unwrap_or(frame.row_count() as u64 + 2);
                return Err(AppError::ParseError(format!(
                    "Expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                )));
            }

            frame.push_row(record.iter().map(str::to_string).collect());
        }

        Ok(frame)
    }
}

/// Decode uploaded bytes as UTF-8, falling back to Windows-1252.
fn decode_content(content: &[u8]) -> Cow<'_, str> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    match std::str::from_utf8(content) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, _had_errors) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(content);
            text
        }
    }
}

/// Name blank header cells and disambiguate duplicates (`a`, `a.1`, `a.2`).
fn normalize_header(record: &StringRecord) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut header = Vec::with_capacity(record.len());

    for (idx, raw) in record.iter().enumerate() {
        let base = if raw.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            raw.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }

        seen.insert(name.clone());
        header.push(name);
    }

    header
}
