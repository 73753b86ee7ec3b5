//! C8 — Mapping Aggregator (§4.6).
//!
//! Rolls column mappings, row classifications, and validation results up
//! into per-sheet confidence axes, review flags, and processing status, then
//! rolls sheets up into a file-level `FileMapping`.

use std::collections::BTreeSet;

use crate::config::Config;
use crate::model::{
    ColumnMapping, ConfidenceAxes, FileMapping, FileMetadata, HeaderInfo, ProcessingStatus,
    ProcessingSummary, ReviewFlag, RowClassification, RowType, SheetMapping, SheetType,
    ValidationIssue,
};

fn column_confidence(columns: &[ColumnMapping], config: &Config) -> f64 {
    let weighted: Vec<(f64, f64)> = columns
        .iter()
        .map(|c| (c.confidence, config.vocabulary.role_weight(c.role)))
        .collect();
    let total_weight: f64 = weighted.iter().map(|(_, w)| w).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    weighted.iter().map(|(c, w)| c * w).sum::<f64>() / total_weight
}

fn row_confidence(rows: &[RowClassification]) -> f64 {
    let total_weight: f64 = rows.iter().map(|r| r.row_type.importance()).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    rows.iter()
        .map(|r| r.confidence * r.row_type.importance())
        .sum::<f64>()
        / total_weight
}

fn fire_review_flags(
    columns: &[ColumnMapping],
    rows: &[RowClassification],
    overall: f64,
    error_count: usize,
    config: &Config,
) -> BTreeSet<ReviewFlag> {
    let mut flags = BTreeSet::new();
    let thresholds = &config.aggregator;

    if overall < thresholds.low_confidence_threshold {
        flags.insert(ReviewFlag::LowConfidence);
    }
    if error_count > thresholds.max_errors_for_flag {
        flags.insert(ReviewFlag::ValidationErrors);
    }
    let ambiguous = columns.iter().any(|c| {
        c.confidence < thresholds.ambiguous_confidence_ceiling
            && c.alternatives
                .iter()
                .filter(|(role, score)| *role != c.role && (c.confidence - score).abs() <= thresholds.ambiguous_alt_margin)
                .count()
                >= 1
    });
    if ambiguous {
        flags.insert(ReviewFlag::AmbiguousMapping);
    }
    if rows.iter().any(|r| r.completeness < thresholds.missing_data_completeness_floor) {
        flags.insert(ReviewFlag::MissingData);
    }
    if !flags.is_empty() {
        flags.insert(ReviewFlag::ManualReviewRequired);
    }
    flags
}

fn derive_processing_status(overall: f64, error_count: usize, config: &Config) -> ProcessingStatus {
    let t = &config.aggregator;
    if overall >= t.failed_max_overall && error_count > t.failed_max_errors {
        return ProcessingStatus::Failed;
    }
    if overall < t.failed_max_overall {
        return ProcessingStatus::Failed;
    }
    if overall >= t.success_min_overall && error_count == 0 {
        return ProcessingStatus::Success;
    }
    if overall >= t.partial_min_overall && error_count < t.partial_max_errors {
        return ProcessingStatus::Partial;
    }
    ProcessingStatus::NeedsReview
}

/// Builds a [`SheetMapping`] from the stage outputs of C3–C7.
#[allow(clippy::too_many_arguments)]
pub fn aggregate_sheet(
    sheet_name: impl Into<String>,
    sheet_type: SheetType,
    sheet_type_confidence: f64,
    header: HeaderInfo,
    columns: Vec<ColumnMapping>,
    rows: Vec<RowClassification>,
    validation_issues: Vec<ValidationIssue>,
    data_quality: f64,
    config: &Config,
) -> SheetMapping {
    let column = column_confidence(&columns, config);
    let row = row_confidence(&rows);
    let overall = config.aggregator.column_weight * column
        + config.aggregator.row_weight * row
        + config.aggregator.quality_weight * data_quality;

    let error_count = validation_issues
        .iter()
        .filter(|i| i.severity == crate::model::Severity::Error)
        .count();

    let review_flags = fire_review_flags(&columns, &rows, overall, error_count, config);
    let processing_status = derive_processing_status(overall, error_count, config);

    SheetMapping {
        sheet_name: sheet_name.into(),
        sheet_type,
        sheet_type_confidence,
        header,
        columns,
        rows,
        validation_issues,
        confidences: ConfidenceAxes {
            column,
            row,
            data_quality,
            overall,
        },
        processing_status,
        review_flags,
    }
}

fn sheet_weight(sheet: &SheetMapping) -> f64 {
    (sheet.row_count() as f64 / 100.0).min(1.0)
}

/// Rolls up all sheets of a file into a [`FileMapping`], computing
/// `global_confidence` and `export_ready` per §4.6.
pub fn aggregate_file(metadata: FileMetadata, sheets: Vec<SheetMapping>, config: &Config) -> FileMapping {
    let total_weight: f64 = sheets.iter().map(sheet_weight).sum();
    let global_confidence = if total_weight <= 0.0 {
        0.0
    } else {
        sheets
            .iter()
            .map(|s| {
                let w = sheet_weight(s);
                let t = &config.aggregator;
                let blended = t.global_overall_weight * s.confidences.overall
                    + t.global_column_weight * s.confidences.column
                    + t.global_row_weight * s.confidences.row
                    + t.global_quality_weight * s.confidences.data_quality;
                w * blended
            })
            .sum::<f64>()
            / total_weight
    };

    let mut review_flags = BTreeSet::new();
    for sheet in &sheets {
        review_flags.extend(sheet.review_flags.iter().copied());
    }

    let no_sheet_failed = !sheets.iter().any(|s| s.processing_status == ProcessingStatus::Failed);
    let no_validation_errors_flag = !sheets.iter().any(|s| s.review_flags.contains(&ReviewFlag::ValidationErrors));
    let export_ready = global_confidence >= config.aggregator.export_ready_min_global && no_sheet_failed && no_validation_errors_flag;

    let processing_summary = ProcessingSummary {
        sheets_succeeded: sheets.iter().filter(|s| s.processing_status == ProcessingStatus::Success).count(),
        sheets_partial: sheets.iter().filter(|s| s.processing_status == ProcessingStatus::Partial).count(),
        sheets_failed: sheets.iter().filter(|s| s.processing_status == ProcessingStatus::Failed).count(),
        sheets_needing_review: sheets.iter().filter(|s| s.processing_status == ProcessingStatus::NeedsReview).count(),
        total_rows: sheets.iter().map(|s| s.row_count()).sum(),
        total_line_items: sheets
            .iter()
            .flat_map(|s| s.rows.iter())
            .filter(|r| r.row_type == RowType::PrimaryLineItem)
            .count(),
        total_errors: sheets.iter().map(|s| s.error_count()).sum(),
        total_warnings: sheets
            .iter()
            .flat_map(|s| s.validation_issues.iter())
            .filter(|i| i.severity == crate::model::Severity::Warning)
            .count(),
    };

    FileMapping {
        metadata,
        sheets,
        global_confidence,
        processing_summary,
        review_flags,
        export_ready,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeaderMethod;

    fn header() -> HeaderInfo {
        HeaderInfo {
            row_index: 0,
            confidence: 0.9,
            method: HeaderMethod::Keyword,
            reasoning: vec![],
            headers: vec!["Description".into(), "Quantity".into(), "Unit Price".into(), "Total".into()],
            is_merged: false,
        }
    }

    fn clean_columns() -> Vec<ColumnMapping> {
        let specs = [
            (0, crate::model::ColumnRole::Description),
            (1, crate::model::ColumnRole::Quantity),
            (2, crate::model::ColumnRole::UnitPrice),
            (3, crate::model::ColumnRole::TotalPrice),
        ];
        specs
            .into_iter()
            .map(|(i, role)| {
                let mut m = ColumnMapping::new(i, "h", "h");
                m.role = role;
                m.confidence = 0.95;
                m.is_required = role.is_required();
                m
            })
            .collect()
    }

    fn clean_rows() -> Vec<RowClassification> {
        vec![RowClassification {
            row_index: 0,
            row_type: RowType::PrimaryLineItem,
            confidence: 0.9,
            completeness: 1.0,
            hierarchical_level: Some(1),
            section_title: None,
            validation_errors: vec![],
            reasoning: vec![],
        }]
    }

    #[test]
    fn clean_sheet_gets_high_overall_and_success_status() {
        let config = Config::default();
        let sheet = aggregate_sheet(
            "Sheet1",
            SheetType::BoqMain,
            0.9,
            header(),
            clean_columns(),
            clean_rows(),
            vec![],
            1.0,
            &config,
        );
        assert!(sheet.confidences.overall >= 0.8);
        assert_eq!(sheet.processing_status, ProcessingStatus::Success);
        assert!(sheet.review_flags.is_empty());
    }

    #[test]
    fn many_errors_fire_validation_errors_and_manual_review_flags() {
        let config = Config::default();
        let issues: Vec<ValidationIssue> = (0..6)
            .map(|i| {
                ValidationIssue::new(
                    i,
                    crate::model::ValidationKind::BusinessRule,
                    crate::model::Severity::Error,
                    "missing required field",
                )
            })
            .collect();
        let sheet = aggregate_sheet("Sheet1", SheetType::BoqMain, 0.9, header(), clean_columns(), clean_rows(), issues, 0.4, &config);
        assert!(sheet.review_flags.contains(&ReviewFlag::ValidationErrors));
        assert!(sheet.review_flags.contains(&ReviewFlag::ManualReviewRequired));
    }

    #[test]
    fn export_ready_requires_global_confidence_and_no_failed_sheets() {
        let config = Config::default();
        let metadata = FileMetadata {
            filename: "boq.xlsx".into(),
            size_bytes: 1024,
            format: "xlsx".into(),
            processed_at: chrono::DateTime::<chrono::Utc>::MIN_UTC,
            sheet_count: 1,
            visible_sheet_count: 1,
            version: "1".into(),
        };
        let sheet = aggregate_sheet("Sheet1", SheetType::BoqMain, 0.9, header(), clean_columns(), clean_rows(), vec![], 1.0, &config);
        let file = aggregate_file(metadata, vec![sheet], &config);
        assert!(file.export_ready);
        assert_eq!(file.processing_summary.sheets_succeeded, 1);
    }
}
