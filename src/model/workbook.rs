//! Workbook and Sheet — the immutable cell-grid view the pipeline consumes.
//!
//! Byte-level parsing of any particular spreadsheet format is out of scope;
//! anything that can produce this shape (via [`crate::sheet_source::SheetSource`])
//! can feed the pipeline.

use serde::{Deserialize, Serialize};

/// A rectangular grid of string cells. Empty string and "absent" are the
/// same representation here; callers that need to distinguish them must do
/// so before construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub visible: bool,
    cells: Vec<Vec<String>>,
    width: usize,
}

impl Sheet {
    /// Builds a sheet, padding every row to the widest row's length so the
    /// "equal logical width" invariant always holds.
    pub fn new(name: impl Into<String>, visible: bool, mut cells: Vec<Vec<String>>) -> Self {
        let width = cells.iter().map(|row| row.len()).max().unwrap_or(0);
        for row in &mut cells {
            if row.len() < width {
                row.resize(width, String::new());
            }
        }
        Self {
            name: name.into(),
            visible,
            cells,
            width,
        }
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn col_count(&self) -> usize {
        self.width
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.cells.get(index).map(|r| r.as_slice())
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.iter().map(|r| r.as_slice())
    }

    /// Truncates the sheet in place to the given row/column caps, returning
    /// whether truncation actually happened (for the over-limit warning).
    pub fn truncate(&mut self, max_rows: usize, max_cols: usize) -> bool {
        let mut truncated = false;
        if self.cells.len() > max_rows {
            self.cells.truncate(max_rows);
            truncated = true;
        }
        if self.width > max_cols {
            for row in &mut self.cells {
                row.truncate(max_cols);
            }
            self.width = max_cols;
            truncated = true;
        }
        truncated
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn visible_sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter().filter(|s| s.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_ragged_rows_to_equal_width() {
        let sheet = Sheet::new(
            "Sheet1",
            true,
            vec![
                vec!["a".into(), "b".into(), "c".into()],
                vec!["d".into()],
            ],
        );
        assert_eq!(sheet.col_count(), 3);
        assert_eq!(sheet.cell(1, 2), "");
        assert_eq!(sheet.cell(1, 0), "d");
    }

    #[test]
    fn truncate_reports_whether_it_changed_anything() {
        let mut sheet = Sheet::new(
            "S",
            true,
            vec![vec!["a".into(), "b".into()], vec!["c".into(), "d".into()]],
        );
        assert!(!sheet.truncate(10, 10));
        assert!(sheet.truncate(1, 10));
        assert_eq!(sheet.row_count(), 1);
    }
}
