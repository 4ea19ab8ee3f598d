// ============================================================
// CSV WRITER
// ============================================================
// Serialize a TabularFrame back to comma-delimited UTF-8 text

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::domain::error::AppError;
use crate::domain::frame::TabularFrame;

/// CSV writer with header row and no index column
pub struct CsvWriter {
    delimiter: u8,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the frame, header first
    pub fn write_to_bytes(&self, frame: &TabularFrame) -> Result<Vec<u8>, AppError> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(frame.header())
            .map_err(|e| AppError::Internal(format!("Failed to write CSV header: {}", e)))?;

        for (index, row) in frame.rows().iter().enumerate() {
            writer.write_record(row).map_err(|e| {
                AppError::Internal(format!("Failed to write CSV row {}: {}", index + 1, e))
            })?;
        }

        writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("Failed to flush CSV output: {}", e)))
    }
}
