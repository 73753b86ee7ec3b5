use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::column::ColumnMapping;
use super::header::HeaderInfo;
use super::row::RowClassification;
use super::validation::ValidationIssue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetType {
    BoqMain,
    Summary,
    Preliminaries,
    Reference,
    Mixed,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Success,
    Partial,
    Failed,
    NeedsReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewFlag {
    LowConfidence,
    ValidationErrors,
    AmbiguousMapping,
    MissingData,
    InconsistentFormat,
    ManualReviewRequired,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConfidenceAxes {
    pub column: f64,
    pub row: f64,
    pub data_quality: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetMapping {
    pub sheet_name: String,
    pub sheet_type: SheetType,
    pub sheet_type_confidence: f64,
    pub header: HeaderInfo,
    pub columns: Vec<ColumnMapping>,
    pub rows: Vec<RowClassification>,
    pub validation_issues: Vec<ValidationIssue>,
    pub confidences: ConfidenceAxes,
    pub processing_status: ProcessingStatus,
    pub review_flags: BTreeSet<ReviewFlag>,
}

impl SheetMapping {
    pub fn error_count(&self) -> usize {
        self.validation_issues
            .iter()
            .filter(|i| i.severity == super::validation::Severity::Error)
            .count()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub filename: String,
    pub size_bytes: u64,
    pub format: String,
    pub processed_at: DateTime<Utc>,
    pub sheet_count: usize,
    pub visible_sheet_count: usize,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub sheets_succeeded: usize,
    pub sheets_partial: usize,
    pub sheets_failed: usize,
    pub sheets_needing_review: usize,
    pub total_rows: usize,
    pub total_line_items: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMapping {
    pub metadata: FileMetadata,
    pub sheets: Vec<SheetMapping>,
    pub global_confidence: f64,
    pub processing_summary: ProcessingSummary,
    pub review_flags: BTreeSet<ReviewFlag>,
    pub export_ready: bool,
}
