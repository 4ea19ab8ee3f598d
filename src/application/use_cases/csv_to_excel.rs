// ============================================================
// CSV TO EXCEL USE CASE
// ============================================================
// Convert one pipe-delimited CSV upload into a single-sheet workbook

use crate::domain::artifact::OutputArtifact;
use crate::domain::error::{AppError, Result};
use crate::domain::upload::UploadSet;
use crate::infrastructure::csv::CsvParser;
use crate::infrastructure::response::xlsx_download_name;
use crate::infrastructure::xlsx::{XlsxWriter, XLSX_MEDIA_TYPE};

/// Multipart field carrying the file to convert
pub const CONVERT_FIELD: &str = "file";

pub const NO_CSV_FILE_PROVIDED: &str = "No CSV file provided";

#[derive(Debug)]
pub struct ConversionResult {
    pub artifact: OutputArtifact,
    pub row_count: usize,
    pub column_count: usize,
}

pub struct CsvToExcelUseCase {
    parser: CsvParser,
    writer: XlsxWriter,
}

impl Default for CsvToExcelUseCase {
    fn default() -> Self {
        Self::new(CsvParser::new(), XlsxWriter::new())
    }
}

impl CsvToExcelUseCase {
    pub fn new(parser: CsvParser, writer: XlsxWriter) -> Self {
        Self { parser, writer }
    }

    pub fn execute(&self, uploads: &UploadSet) -> Result<ConversionResult> {
        let file = uploads
            .first(CONVERT_FIELD)
            .filter(|file| file.is_csv())
            .ok_or_else(|| AppError::MissingInput(NO_CSV_FILE_PROVIDED.to_string()))?;

        let frame = self.parser.parse_bytes(&file.content).map_err(|err| match err {
            AppError::ParseError(msg) => {
                AppError::ParseError(format!("Failed to parse '{}': {}", file.filename, msg))
            }
            other => other,
        })?;

        let content = self.writer.write_to_bytes(&frame)?;

        Ok(ConversionResult {
            artifact: OutputArtifact::new(
                xlsx_download_name(file.basename()),
                XLSX_MEDIA_TYPE,
                content,
            ),
            row_count: frame.row_count(),
            column_count: frame.column_count(),
        })
    }
}
