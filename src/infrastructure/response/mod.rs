pub const CSV_MEDIA_TYPE: &str = "text/csv";
pub const MERGED_CSV_FILENAME: &str = "merged_data.csv";

/// Download name for a converted workbook: `orders.csv` -> `orders.xlsx`.
///
/// Only the trailing `.csv` is replaced; directory components sent by the
/// client are expected to be stripped already.
pub fn xlsx_download_name(csv_filename: &str) -> String {
    let stem = csv_filename.strip_suffix(".csv").unwrap_or(csv_filename);
    format!("{}.xlsx", stem)
}

/// ASCII-only fallback for the plain `filename=` disposition parameter
pub fn ascii_fallback_name(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
