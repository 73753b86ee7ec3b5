//! C2 — Sheet Source: yields per-sheet cell matrices and visibility flags.
//!
//! Byte-level workbook parsing is out of scope (§1); this trait is the
//! narrow contract any reader — xlsx, ods, delimited text — must satisfy to
//! feed the pipeline. No interpretation happens here.

use crate::errors::Result;
use crate::model::{Sheet, Workbook};

#[derive(Debug, Clone)]
pub struct WorkbookMetadata {
    pub filename: String,
    pub size_bytes: u64,
    pub format: String,
}

pub trait SheetSource {
    fn metadata(&self) -> Result<WorkbookMetadata>;
    fn read(&self) -> Result<Workbook>;
}

/// An in-memory source, useful for tests and for hosts that already have
/// cell matrices from some other collaborator.
pub struct InMemorySheetSource {
    pub metadata: WorkbookMetadata,
    pub workbook: Workbook,
}

impl InMemorySheetSource {
    pub fn new(filename: impl Into<String>, format: impl Into<String>, sheets: Vec<Sheet>) -> Self {
        let workbook = Workbook::new(sheets);
        let size_bytes = workbook
            .sheets
            .iter()
            .map(|s| s.row_count() * s.col_count())
            .sum::<usize>() as u64;
        Self {
            metadata: WorkbookMetadata {
                filename: filename.into(),
                size_bytes,
                format: format.into(),
            },
            workbook,
        }
    }
}

impl SheetSource for InMemorySheetSource {
    fn metadata(&self) -> Result<WorkbookMetadata> {
        Ok(self.metadata.clone())
    }

    fn read(&self) -> Result<Workbook> {
        Ok(self.workbook.clone())
    }
}

/// Reads a pre-normalized JSON-serialized [`Workbook`] from disk. Binary
/// spreadsheet and delimited-text readers are out of scope (§1); this is
/// the handoff format for a host that has already produced the cell-matrix
/// shape some other way.
pub struct FileSheetSource {
    path: std::path::PathBuf,
}

impl FileSheetSource {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SheetSource for FileSheetSource {
    fn metadata(&self) -> Result<WorkbookMetadata> {
        let size_bytes = std::fs::metadata(&self.path)
            .map_err(|e| crate::errors::BoqError::io(&self.path, e))?
            .len();
        let filename = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("workbook")
            .to_string();
        Ok(WorkbookMetadata {
            filename,
            size_bytes,
            format: "json-workbook".to_string(),
        })
    }

    fn read(&self) -> Result<Workbook> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| crate::errors::BoqError::io(&self.path, e))?;
        serde_json::from_str(&contents)
            .map_err(|e| crate::errors::BoqError::UnrecognizedFormat(format!("{}: {e}", self.path.display())))
    }
}

/// Enforces the file-size cap before any parse is attempted (§5, §7).
pub fn enforce_size_limit(metadata: &WorkbookMetadata, max_file_size_mb: u64) -> Result<()> {
    let limit_bytes = max_file_size_mb * 1024 * 1024;
    if metadata.size_bytes > limit_bytes {
        return Err(crate::errors::BoqError::OverSizeLimit {
            size_bytes: metadata.size_bytes,
            limit_bytes,
        });
    }
    Ok(())
}

/// Truncates every sheet to the configured row/column caps, returning the
/// names of sheets that were truncated so the caller can emit a warning.
pub fn enforce_row_col_caps(
    workbook: &mut Workbook,
    max_rows: usize,
    max_cols: usize,
) -> Vec<String> {
    let mut truncated = Vec::new();
    for sheet in &mut workbook.sheets {
        if sheet.truncate(max_rows, max_cols) {
            truncated.push(sheet.name.clone());
        }
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_oversized_workbooks_before_parse() {
        let metadata = WorkbookMetadata {
            filename: "big.xlsx".into(),
            size_bytes: 100 * 1024 * 1024,
            format: "xlsx".into(),
        };
        assert!(enforce_size_limit(&metadata, 50).is_err());
    }
}
