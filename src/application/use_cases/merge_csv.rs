// ============================================================
// MERGE CSV USE CASE
// ============================================================
// Align uploaded CSV files on the first file's header and concatenate them

use tracing::debug;

use crate::domain::artifact::OutputArtifact;
use crate::domain::error::{AppError, Result};
use crate::domain::frame::TabularFrame;
use crate::domain::upload::{UploadSet, UploadedFile};
use crate::infrastructure::csv::{CsvParser, CsvWriter};
use crate::infrastructure::response::{CSV_MEDIA_TYPE, MERGED_CSV_FILENAME};

/// Multipart field carrying the files to merge
pub const MERGE_FIELD: &str = "files";

pub const NO_FILES_PROVIDED: &str = "No files provided";
pub const NO_VALID_CSV_FILES: &str = "No valid CSV files found";

#[derive(Debug)]
pub struct MergeResult {
    pub artifact: OutputArtifact,
    pub files_merged: usize,
    pub files_skipped: usize,
    pub row_count: usize,
}

pub struct MergeCsvUseCase {
    parser: CsvParser,
    writer: CsvWriter,
}

impl Default for MergeCsvUseCase {
    fn default() -> Self {
        Self::new(CsvParser::new(), CsvWriter::new())
    }
}

impl MergeCsvUseCase {
    pub fn new(parser: CsvParser, writer: CsvWriter) -> Self {
        Self { parser, writer }
    }

    pub fn execute(&self, uploads: &UploadSet) -> Result<MergeResult> {
        let files = uploads.by_field(MERGE_FIELD);
        if files.is_empty() {
            return Err(AppError::MissingInput(NO_FILES_PROVIDED.to_string()));
        }

        let (merged, files_merged) = self.merge_files(&files)?;
        let merged =
            merged.ok_or_else(|| AppError::NoValidInput(NO_VALID_CSV_FILES.to_string()))?;

        let content = self.writer.write_to_bytes(&merged)?;

        Ok(MergeResult {
            artifact: OutputArtifact::new(MERGED_CSV_FILENAME, CSV_MEDIA_TYPE, content),
            files_merged,
            files_skipped: files.len() - files_merged,
            row_count: merged.row_count(),
        })
    }

    /// Parse every `.csv` upload and concatenate them in upload order.
    ///
    /// The first parsed header is the reference every frame is conformed to.
    /// Returns `None` when no upload had a `.csv` name.
    pub fn merge_files(&self, files: &[&UploadedFile]) -> Result<(Option<TabularFrame>, usize)> {
        let mut merged: Option<TabularFrame> = None;
        let mut files_merged = 0;

        for file in files {
            if !file.is_csv() {
                debug!(filename = %file.filename, "Skipping non-CSV upload");
                continue;
            }

            let frame = self.parse_file(file)?;
            files_merged += 1;

            merged = Some(match merged.take() {
                None => frame,
                Some(mut target) => {
                    let conformed = frame.reindex(target.header());
                    target.extend(conformed);
                    target
                }
            });
        }

        Ok((merged, files_merged))
    }

    fn parse_file(&self, file: &UploadedFile) -> Result<TabularFrame> {
        self.parser.parse_bytes(&file.content).map_err(|err| match err {
            AppError::ParseError(msg) => {
                AppError::ParseError(format!("Failed to parse '{}': {}", file.filename, msg))
            }
            other => other,
        })
    }
}
