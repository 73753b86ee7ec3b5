//! C11 — Comparison Engine (supplemented; §B of the expanded spec).
//!
//! Aligns an offer's normalized line-item table against a master table by
//! identity key (`code` when present, else normalized `description` within
//! the same section) and classifies each offer row as `Merge` or `Add`;
//! unmatched master rows are reported as `Missing`.

use std::collections::HashMap;

use crate::model::normalize_description;

/// One row of a normalized line-item table, as produced by the row
/// classifier + column mapper for a single sheet.
#[derive(Debug, Clone)]
pub struct ComparableRow {
    pub section_title: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
    pub row_number: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonOp {
    Merge,
    Add,
    Missing,
}

#[derive(Debug, Clone, Default)]
pub struct FieldDelta {
    pub quantity_delta: Option<f64>,
    pub unit_price_delta: Option<f64>,
    pub total_price_delta: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub op: ComparisonOp,
    pub master_row_number: Option<usize>,
    pub offer_row_number: Option<usize>,
    pub description: String,
    pub deltas: FieldDelta,
}

fn identity_key(row: &ComparableRow) -> String {
    let section = row.section_title.as_deref().unwrap_or("");
    match &row.code {
        Some(code) if !code.trim().is_empty() => format!("code::{}", code.trim().to_lowercase()),
        _ => format!("section::{}::{}", section.trim().to_lowercase(), normalize_description(&row.description)),
    }
}

fn delta(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(y - x),
        _ => None,
    }
}

/// Compares `offer` against `master`, returning one [`ComparisonResult`] per
/// offer row (`Merge`/`Add`) followed by one per unmatched master row
/// (`Missing`).
pub fn compare(master: &[ComparableRow], offer: &[ComparableRow]) -> Vec<ComparisonResult> {
    let mut master_by_key: HashMap<String, &ComparableRow> = HashMap::new();
    for row in master {
        master_by_key.insert(identity_key(row), row);
    }

    let mut matched_keys = std::collections::HashSet::new();
    let mut results = Vec::with_capacity(offer.len());

    for offer_row in offer {
        let key = identity_key(offer_row);
        match master_by_key.get(&key) {
            Some(master_row) => {
                matched_keys.insert(key);
                results.push(ComparisonResult {
                    op: ComparisonOp::Merge,
                    master_row_number: Some(master_row.row_number),
                    offer_row_number: Some(offer_row.row_number),
                    description: offer_row.description.clone(),
                    deltas: FieldDelta {
                        quantity_delta: delta(master_row.quantity, offer_row.quantity),
                        unit_price_delta: delta(master_row.unit_price, offer_row.unit_price),
                        total_price_delta: delta(master_row.total_price, offer_row.total_price),
                    },
                });
            }
            None => {
                results.push(ComparisonResult {
                    op: ComparisonOp::Add,
                    master_row_number: None,
                    offer_row_number: Some(offer_row.row_number),
                    description: offer_row.description.clone(),
                    deltas: FieldDelta::default(),
                });
            }
        }
    }

    for row in master {
        let key = identity_key(row);
        if !matched_keys.contains(&key) {
            results.push(ComparisonResult {
                op: ComparisonOp::Missing,
                master_row_number: Some(row.row_number),
                offer_row_number: None,
                description: row.description.clone(),
                deltas: FieldDelta::default(),
            });
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: Option<&str>, description: &str, total: f64, row_number: usize) -> ComparableRow {
        ComparableRow {
            section_title: Some("Earthworks".into()),
            code: code.map(String::from),
            description: description.into(),
            quantity: Some(10.0),
            unit_price: Some(5.0),
            total_price: Some(total),
            row_number,
        }
    }

    #[test]
    fn matching_codes_produce_merge_with_price_delta() {
        let master = vec![row(Some("001"), "Excavation", 50.0, 2)];
        let offer = vec![row(Some("001"), "Excavation", 55.0, 2)];
        let results = compare(&master, &offer);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].op, ComparisonOp::Merge);
        assert_eq!(results[0].deltas.total_price_delta, Some(5.0));
    }

    #[test]
    fn offer_row_with_no_master_counterpart_is_add() {
        let master = vec![row(Some("001"), "Excavation", 50.0, 2)];
        let offer = vec![row(Some("001"), "Excavation", 50.0, 2), row(Some("002"), "Geotextile", 20.0, 3)];
        let results = compare(&master, &offer);
        let add_ops: Vec<_> = results.iter().filter(|r| r.op == ComparisonOp::Add).collect();
        assert_eq!(add_ops.len(), 1);
        assert_eq!(add_ops[0].description, "Geotextile");
    }

    #[test]
    fn unmatched_master_row_is_missing() {
        let master = vec![row(Some("001"), "Excavation", 50.0, 2), row(Some("002"), "Geotextile", 20.0, 3)];
        let offer = vec![row(Some("001"), "Excavation", 50.0, 2)];
        let results = compare(&master, &offer);
        let missing: Vec<_> = results.iter().filter(|r| r.op == ComparisonOp::Missing).collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].description, "Geotextile");
    }

    #[test]
    fn falls_back_to_description_within_section_when_code_absent() {
        let master = vec![ComparableRow { code: None, ..row(None, "Concrete", 100.0, 2) }];
        let offer = vec![ComparableRow { code: None, ..row(None, "concrete", 110.0, 2) }];
        let results = compare(&master, &offer);
        assert_eq!(results[0].op, ComparisonOp::Merge);
    }
}
