//! C7 — Validator (§4.5).
//!
//! Three check suites — mathematical consistency, data type, business rule —
//! run over `(cells, column→role mapping, row classifications)`. Produces
//! [`ValidationIssue`]s and the sheet's overall data-quality score.

use std::collections::HashMap;

use crate::config::Config;
use crate::model::{ColumnMapping, ColumnRole, RowClassification, RowType, Severity, ValidationIssue, ValidationKind};
use crate::parsing::{is_dimensioned_unit, parse_currency, parse_quantity};

fn role_column<'a>(columns: &'a [ColumnMapping], role: ColumnRole) -> Option<&'a ColumnMapping> {
    columns.iter().find(|c| c.role == role)
}

fn cell<'a>(row: &'a [String], column: Option<&ColumnMapping>) -> &'a str {
    column
        .and_then(|c| row.get(c.column_index))
        .map(String::as_str)
        .unwrap_or("")
}

/// Mathematical consistency: `|Q*U - T| <= max(tolerance_abs, tolerance_pct * |T|)`.
fn check_mathematical(
    row_index: usize,
    row: &[String],
    columns: &[ColumnMapping],
    config: &Config,
) -> Option<ValidationIssue> {
    let quantity = parse_quantity(cell(row, role_column(columns, ColumnRole::Quantity)));
    let unit_price = parse_currency(cell(row, role_column(columns, ColumnRole::UnitPrice)));
    let total_price = parse_currency(cell(row, role_column(columns, ColumnRole::TotalPrice)));

    let (q, u, t) = (quantity?, unit_price?, total_price?);
    let expected = q * u;
    let tolerance = (config.validator.tolerance_abs).max(config.validator.tolerance_pct * t.abs());
    if (expected - t).abs() > tolerance {
        Some(
            ValidationIssue::new(
                row_index,
                ValidationKind::Mathematical,
                Severity::Error,
                format!("quantity * unit_price ({expected:.2}) does not match total_price ({t:.2})"),
            )
            .with_expected_actual(format!("{expected:.2}"), format!("{t:.2}"))
            .with_suggestion("verify quantity, unit price, or total for this row"),
        )
    } else {
        None
    }
}

fn check_data_type(
    row_index: usize,
    row: &[String],
    columns: &[ColumnMapping],
    config: &Config,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if let Some(col) = role_column(columns, ColumnRole::Quantity) {
        let value = row.get(col.column_index).map(String::as_str).unwrap_or("");
        if !value.trim().is_empty() && parse_quantity(value).is_none() {
            issues.push(
                ValidationIssue::new(row_index, ValidationKind::DataType, Severity::Error, format!("quantity '{value}' is not a valid number"))
                    .with_column(col.column_index),
            );
        }
    }

    for role in [ColumnRole::UnitPrice, ColumnRole::TotalPrice] {
        if let Some(col) = role_column(columns, role) {
            let value = row.get(col.column_index).map(String::as_str).unwrap_or("");
            if !value.trim().is_empty() && parse_currency(value).is_none() {
                issues.push(
                    ValidationIssue::new(row_index, ValidationKind::DataType, Severity::Error, format!("'{value}' is not a valid currency amount"))
                        .with_column(col.column_index),
                );
            }
        }
    }

    if let Some(col) = role_column(columns, ColumnRole::Unit) {
        let value = row.get(col.column_index).map(String::as_str).unwrap_or("");
        if !value.trim().is_empty() && !is_dimensioned_unit(value, &config.vocabulary.unit_tokens) {
            issues.push(
                ValidationIssue::new(row_index, ValidationKind::DataType, Severity::Warning, format!("'{value}' is not a recognized unit token"))
                    .with_column(col.column_index),
            );
        }
    }

    issues
}

/// Negative-quantity check (§8 invariant 5). Runs over every row regardless
/// of classification: a negative quantity demotes a would-be
/// `primary_line_item` to `invalid_line_item` in the row classifier, which
/// would otherwise make this check unreachable there and let the row leave
/// the sheet with zero recorded `ValidationIssue`s.
fn check_negative_quantity(row_index: usize, row: &[String], columns: &[ColumnMapping]) -> Option<ValidationIssue> {
    let col = role_column(columns, ColumnRole::Quantity)?;
    let value = row.get(col.column_index).map(String::as_str).unwrap_or("");
    let q = parse_quantity(value)?;
    if q < 0.0 {
        Some(
            ValidationIssue::new(row_index, ValidationKind::BusinessRule, Severity::Error, format!("negative quantity: {q}"))
                .with_column(col.column_index),
        )
    } else {
        None
    }
}

fn check_business_rules(
    row_index: usize,
    row: &[String],
    columns: &[ColumnMapping],
    row_type: RowType,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if row_type != RowType::PrimaryLineItem {
        return issues;
    }

    for required in columns.iter().filter(|c| c.is_required) {
        let value = row.get(required.column_index).map(String::as_str).unwrap_or("");
        if value.trim().is_empty() {
            issues.push(
                ValidationIssue::new(row_index, ValidationKind::BusinessRule, Severity::Error, format!("missing required field: {}", required.role.as_str()))
                    .with_column(required.column_index),
            );
        }
    }

    issues
}

fn check_duplicate_descriptions(
    rows: &[Vec<String>],
    columns: &[ColumnMapping],
    classifications: &[RowClassification],
) -> Vec<ValidationIssue> {
    let Some(desc_col) = role_column(columns, ColumnRole::Description) else {
        return Vec::new();
    };

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut issues = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        if classifications[row_index].row_type != RowType::PrimaryLineItem {
            continue;
        }
        let description = row
            .get(desc_col.column_index)
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();
        if description.is_empty() {
            continue;
        }
        if let Some(&first_index) = seen.get(&description) {
            issues.push(ValidationIssue::new(
                row_index,
                ValidationKind::Consistency,
                Severity::Warning,
                format!("duplicate description also seen at row {first_index}"),
            ));
        } else {
            seen.insert(description, row_index);
        }
    }
    issues
}

/// Runs all three check suites over every row, returning the full issue list
/// and the 0.0–1.0 overall data-quality score (1.0 minus 0.10 per error and
/// 0.02 per warning, floored at 0).
pub fn validate_sheet(
    rows: &[Vec<String>],
    columns: &[ColumnMapping],
    classifications: &[RowClassification],
    config: &Config,
) -> (Vec<ValidationIssue>, f64) {
    let mut issues = Vec::new();

    for (row_index, row) in rows.iter().enumerate() {
        let row_type = classifications[row_index].row_type;
        if row_type == RowType::PrimaryLineItem {
            if let Some(issue) = check_mathematical(row_index, row, columns, config) {
                issues.push(issue);
            }
        }
        issues.extend(check_data_type(row_index, row, columns, config));
        issues.extend(check_business_rules(row_index, row, columns, row_type));
        if let Some(issue) = check_negative_quantity(row_index, row, columns) {
            issues.push(issue);
        }
    }
    issues.extend(check_duplicate_descriptions(rows, columns, classifications));

    let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();
    let warnings = issues.iter().filter(|i| i.severity == Severity::Warning).count();
    let score = (1.0 - errors as f64 * config.validator.error_penalty - warnings as f64 * config.validator.warning_penalty)
        .clamp(0.0, 1.0);

    (issues, score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_rows;
    use proptest::prelude::*;

    fn columns() -> Vec<ColumnMapping> {
        let specs = [
            (0, ColumnRole::Code),
            (1, ColumnRole::Description),
            (2, ColumnRole::Unit),
            (3, ColumnRole::Quantity),
            (4, ColumnRole::UnitPrice),
            (5, ColumnRole::TotalPrice),
        ];
        specs
            .into_iter()
            .map(|(i, role)| {
                let mut m = ColumnMapping::new(i, "h", "h");
                m.role = role;
                m.is_required = role.is_required();
                m
            })
            .collect()
    }

    #[test]
    fn flags_mathematical_inconsistency() {
        let config = Config::default();
        let cols = columns();
        let rows = vec![vec!["002".into(), "Concrete".into(), "m3".into(), "50".into(), "150.00".into(), "7501.00".into()]];
        let classifications = classify_rows(&rows, &cols, None, &config);
        let (issues, score) = validate_sheet(&rows, &cols, &classifications, &config);
        assert!(issues.iter().any(|i| i.kind == ValidationKind::Mathematical));
        assert!(score < 1.0);
    }

    #[test]
    fn clean_rows_have_no_issues_and_perfect_score() {
        let config = Config::default();
        let cols = columns();
        let rows = vec![vec!["001".into(), "Excavation".into(), "m3".into(), "100".into(), "25.50".into(), "2550.00".into()]];
        let classifications = classify_rows(&rows, &cols, None, &config);
        let (issues, score) = validate_sheet(&rows, &cols, &classifications, &config);
        assert!(issues.is_empty());
        assert_eq!(score, 1.0);
    }

    #[test]
    fn negative_quantity_is_reported_as_business_rule_error_even_though_row_is_invalid() {
        let config = Config::default();
        let cols = columns();
        let rows = vec![vec!["001".into(), "Excavation".into(), "m3".into(), "-5".into(), "25.50".into(), "-127.50".into()]];
        let classifications = classify_rows(&rows, &cols, None, &config);
        assert_eq!(classifications[0].row_type, RowType::InvalidLineItem);
        let (issues, score) = validate_sheet(&rows, &cols, &classifications, &config);
        assert!(issues
            .iter()
            .any(|i| i.kind == ValidationKind::BusinessRule && i.severity == Severity::Error && i.message.contains("negative")));
        assert!(score < 1.0);
    }

    #[test]
    fn zero_quantity_does_not_trigger_business_rule_error() {
        let config = Config::default();
        let cols = columns();
        let rows = vec![vec!["001".into(), "Excavation".into(), "m3".into(), "0".into(), "25.50".into(), "0.00".into()]];
        let classifications = classify_rows(&rows, &cols, None, &config);
        let (issues, _) = validate_sheet(&rows, &cols, &classifications, &config);
        assert!(!issues.iter().any(|i| i.message.contains("negative")));
    }

    proptest::proptest! {
        /// §8 invariant 4: for every parseable (Q, U, T), either the tolerance
        /// holds or a mathematical ValidationIssue is reported.
        #[test]
        fn mathematical_tolerance_invariant(q in 0.0f64..1000.0, u in 0.0f64..1000.0, noise in -5.0f64..5.0) {
            let config = Config::default();
            let cols = columns();
            let t = q * u + noise;
            let rows = vec![vec!["001".into(), "Item".into(), "m3".into(), format!("{q}"), format!("{u:.2}"), format!("{t:.2}")]];
            let classifications = classify_rows(&rows, &cols, None, &config);
            let (issues, _) = validate_sheet(&rows, &cols, &classifications, &config);

            let tolerance = config.validator.tolerance_abs.max(config.validator.tolerance_pct * t.abs());
            let within_tolerance = (q * u - t).abs() <= tolerance;
            let reported = issues.iter().any(|i| i.kind == ValidationKind::Mathematical);
            prop_assert!(within_tolerance || reported);
        }

        /// §8 invariant 5: negative quantities always yield a business-rule
        /// `ValidationIssue` at the validation-result level (not merely on
        /// `RowClassification.validation_errors` — that alone wouldn't
        /// surface in error counts or export readiness); zero or positive
        /// quantities never do.
        #[test]
        fn negative_quantity_invariant(q in -1000.0f64..1000.0) {
            let config = Config::default();
            let cols = columns();
            let rows = vec![vec!["001".into(), "Item".into(), "m3".into(), format!("{q}"), "10.00".into(), format!("{:.2}", q * 10.0)]];
            let classifications = classify_rows(&rows, &cols, None, &config);
            let (issues, _) = validate_sheet(&rows, &cols, &classifications, &config);
            let has_negative_error = issues
                .iter()
                .any(|i| i.kind == ValidationKind::BusinessRule && i.severity == Severity::Error && i.message.contains("negative"));
            prop_assert_eq!(q < 0.0, has_negative_error);
        }
    }
}
