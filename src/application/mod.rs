pub mod use_cases;

pub use use_cases::csv_to_excel::{ConversionResult, CsvToExcelUseCase};
pub use use_cases::merge_csv::{MergeCsvUseCase, MergeResult};
