//! Export collaborator (§6): turns in-memory pipeline artifacts into the
//! logical export formats the CLI's `export` command writes to disk.
//! Workbook byte-level encoding stays out of scope — these are plain-text
//! and JSON renderings of data this crate already computed.

use std::fmt::Write as _;

use crate::errors::{BoqError, Result};
use crate::model::FileMapping;
use crate::orchestrator::ReviewArtifactRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Summary,
    DelimitedText,
}

impl ExportFormat {
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "summary" => Ok(Self::Summary),
            "delimited-text" | "delimited_text" | "csv" => Ok(Self::DelimitedText),
            other => Err(BoqError::Config(format!("unknown export format '{other}'"))),
        }
    }
}

/// Stable JSON serialization of a [`FileMapping`], enums encoded as their
/// `serde(rename_all = "snake_case")` string names.
pub fn export_file_mapping_json(mapping: &FileMapping) -> Result<String> {
    serde_json::to_string_pretty(mapping).map_err(|e| BoqError::Dictionary(e.to_string()))
}

/// Human-readable per-sheet summary, the `process` command's terminal
/// output and the `summary` export format.
pub fn export_summary(mapping: &FileMapping) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", mapping.metadata.filename);
    let _ = writeln!(
        out,
        "  {} sheets | global confidence {:.2} | export_ready={}",
        mapping.metadata.visible_sheet_count, mapping.global_confidence, mapping.export_ready
    );
    for sheet in &mapping.sheets {
        let _ = writeln!(
            out,
            "  - {:<24} type={:?} status={:?} overall={:.2} errors={}",
            sheet.sheet_name,
            sheet.sheet_type,
            sheet.processing_status,
            sheet.confidences.overall,
            sheet.error_count(),
        );
    }
    out
}

/// Delimited-text (comma-separated) rendering of the normalized line-item
/// table: one row per sheet row, columns in column-mapping order.
pub fn export_normalized_tabular(mapping: &FileMapping) -> String {
    let mut out = String::new();
    for sheet in &mapping.sheets {
        let header: Vec<&str> = sheet.columns.iter().map(|c| c.role.as_str()).collect();
        let _ = writeln!(out, "# {}", sheet.sheet_name);
        let _ = writeln!(out, "{}", header.join(","));
        for row in &sheet.rows {
            let _ = writeln!(out, "row_{},{:?}", row.row_index, row.row_type);
        }
    }
    out
}

/// Renders a completed-or-in-progress review artifact as delimited text,
/// per the logical schema in §6: Description, Source_Sheet, Frequency,
/// Auto_Category, Match_Type, Confidence, Category, Notes.
pub fn export_review_artifact(rows: &[ReviewArtifactRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Description,Source_Sheet,Frequency,Auto_Category,Match_Type,Confidence,Category,Notes");
    for row in rows {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{:.2},{},{}",
            row.description,
            row.source_sheet,
            row.frequency,
            row.auto_category.clone().unwrap_or_default(),
            row.match_type,
            row.confidence,
            row.category_to_fill.clone().unwrap_or_default(),
            row.notes.clone().unwrap_or_default(),
        );
    }
    out
}

/// Dispatches to the format requested by the CLI's `export` command.
pub fn export(mapping: &FileMapping, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => export_file_mapping_json(mapping),
        ExportFormat::Summary => Ok(export_summary(mapping)),
        ExportFormat::DelimitedText => Ok(export_normalized_tabular(mapping)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_format_names() {
        assert_eq!(ExportFormat::parse("json").unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::parse("Summary").unwrap(), ExportFormat::Summary);
        assert_eq!(ExportFormat::parse("csv").unwrap(), ExportFormat::DelimitedText);
    }

    #[test]
    fn rejects_unknown_format_name() {
        assert!(ExportFormat::parse("xml").is_err());
    }

    #[test]
    fn review_artifact_export_includes_header_row() {
        let rendered = export_review_artifact(&[]);
        assert!(rendered.starts_with("Description,Source_Sheet"));
    }
}
