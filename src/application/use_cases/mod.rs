pub mod csv_to_excel;
pub mod merge_csv;
