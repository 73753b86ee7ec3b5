//! Top-level pipeline: wires C2 (sheet source) through C3–C6
//! (classify/locate/map/classify) into C7 (validate) and C8 (aggregate) for
//! every visible sheet, then rolls the sheets up into a [`FileMapping`].
//!
//! Mirrors the teacher's analyzer-orchestration shape: a plain function over
//! an explicit [`Config`], a progress-callback trait with a no-op default,
//! and a cancellation token polled at sheet boundaries rather than
//! mid-sheet (cancellation granularity matches the unit of work the caller
//! actually waits on).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::aggregate::{aggregate_file, aggregate_sheet};
use crate::classify::{classify_rows, classify_sheet, locate_header, map_columns};
use crate::config::Config;
use crate::errors::{BoqError, Result};
use crate::model::{FileMapping, FileMetadata, SheetMapping};
use crate::sheet_source::{enforce_row_col_caps, enforce_size_limit, SheetSource};
use crate::validate::validate_sheet;

/// Progress milestones the pipeline reports as it works through a file.
pub trait ProgressObserver {
    fn sheet_started(&self, _sheet_name: &str, _index: usize, _total: usize) {}
    fn sheet_finished(&self, _sheet_name: &str, _status: crate::model::ProcessingStatus) {}
}

/// No-op default, used by callers that don't need progress reporting.
pub struct NullProgressObserver;
impl ProgressObserver for NullProgressObserver {}

/// Cooperative cancellation checked at sheet boundaries.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Processes one workbook end to end, returning a [`FileMapping`].
pub fn process_workbook(
    source: &dyn SheetSource,
    config: &Config,
    observer: &dyn ProgressObserver,
    cancellation: &CancellationToken,
) -> Result<FileMapping> {
    let metadata = source.metadata()?;
    enforce_size_limit(&metadata, config.limits.max_file_size_mb)?;

    let mut workbook = source.read()?;
    if workbook.sheets.len() > config.limits.max_sheets_per_file {
        workbook.sheets.truncate(config.limits.max_sheets_per_file);
    }
    enforce_row_col_caps(&mut workbook, config.limits.max_rows_per_sheet, config.limits.max_columns_per_sheet);

    let visible: Vec<_> = workbook.visible_sheets().cloned().collect();
    let total = visible.len();
    let mut sheet_mappings = Vec::with_capacity(total);

    for (index, sheet) in visible.iter().enumerate() {
        if cancellation.is_cancelled() {
            return Err(BoqError::Cancelled);
        }
        observer.sheet_started(&sheet.name, index, total);

        let classification = classify_sheet(sheet, config);
        let header = locate_header(sheet, config);
        let columns = map_columns(&header, config);

        let data_rows: Vec<Vec<String>> = sheet
            .rows()
            .skip(header.row_index + if header.is_merged { 2 } else { 1 })
            .map(|r| r.to_vec())
            .collect();

        let row_classifications = classify_rows(&data_rows, &columns, Some(&sheet.name), config);
        let (validation_issues, data_quality) = validate_sheet(&data_rows, &columns, &row_classifications, config);

        let sheet_mapping = aggregate_sheet(
            sheet.name.clone(),
            classification.sheet_type,
            classification.confidence,
            header,
            columns,
            row_classifications,
            validation_issues,
            data_quality,
            config,
        );

        observer.sheet_finished(&sheet.name, sheet_mapping.processing_status);
        sheet_mappings.push(sheet_mapping);
    }

    let file_metadata = FileMetadata {
        filename: metadata.filename,
        size_bytes: metadata.size_bytes,
        format: metadata.format,
        processed_at: chrono::Utc::now(),
        sheet_count: workbook.sheets.len(),
        visible_sheet_count: total,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Ok(aggregate_file(file_metadata, sheet_mappings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sheet;
    use crate::sheet_source::InMemorySheetSource;

    #[test]
    fn processes_a_clean_boq_workbook_end_to_end() {
        let config = Config::default();
        let sheet = Sheet::new(
            "Bill of Quantities",
            true,
            vec![
                vec!["Item Code".into(), "Description".into(), "Unit".into(), "Quantity".into(), "Unit Price".into(), "Total Amount".into()],
                vec!["001".into(), "Excavation".into(), "m3".into(), "100".into(), "25.50".into(), "2550.00".into()],
                vec!["002".into(), "Concrete".into(), "m3".into(), "50".into(), "150.00".into(), "7500.00".into()],
            ],
        );
        let source = InMemorySheetSource::new("boq.xlsx", "xlsx", vec![sheet]);
        let file_mapping = process_workbook(&source, &config, &NullProgressObserver, &CancellationToken::new()).unwrap();

        assert_eq!(file_mapping.sheets.len(), 1);
        assert_eq!(file_mapping.sheets[0].rows.len(), 2);
    }

    #[test]
    fn cancellation_token_stops_processing_before_any_sheet() {
        let config = Config::default();
        let sheet = Sheet::new("Sheet1", true, vec![vec!["a".into()]]);
        let source = InMemorySheetSource::new("f.xlsx", "xlsx", vec![sheet]);
        let token = CancellationToken::new();
        token.cancel();
        let result = process_workbook(&source, &config, &NullProgressObserver, &token);
        assert!(matches!(result, Err(BoqError::Cancelled)));
    }
}
