// ============================================================
// TABULAR FRAME
// ============================================================
// In-memory table: ordered header plus rows of string cells

use std::collections::HashMap;

/// An in-memory table.
///
/// Every row holds exactly `header.len()` cells, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularFrame {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TabularFrame {
    /// Create an empty frame with the given header
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.header.len(), String::new());
        self.rows.push(row);
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Iterate over the cells of one column
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row[index].as_str())
    }

    /// Conform this frame to `reference`.
    ///
    /// Columns missing here are filled with empty strings, columns absent
    /// from `reference` are dropped, and the output follows its order.
    pub fn reindex(&self, reference: &[String]) -> TabularFrame {
        let positions: HashMap<&str, usize> = self
            .header
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();

        let mapping: Vec<Option<usize>> = reference
            .iter()
            .map(|name| positions.get(name.as_str()).copied())
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                mapping
                    .iter()
                    .map(|source| source.map(|idx| row[idx].clone()).unwrap_or_default())
                    .collect()
            })
            .collect();

        TabularFrame {
            header: reference.to_vec(),
            rows,
        }
    }

    /// Append the rows of `other`, which must share this frame's header
    pub fn extend(&mut self, other: TabularFrame) {
        debug_assert_eq!(self.header, other.header);
        self.rows.extend(other.rows);
    }
}
