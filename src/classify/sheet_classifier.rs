//! C3 — Sheet Classifier (§4.1).
//!
//! Labels each sheet boq_main / summary / preliminaries / reference / mixed
//! / unknown from an additive, three-axis score: keyword match, numeric-cell
//! ratio, pattern detection.

use crate::config::Config;
use crate::model::{Sheet, SheetType};
use crate::parsing::is_any_numeric_pattern;

const SCORED_TYPES: [(&str, SheetType); 4] = [
    ("boq_main", SheetType::BoqMain),
    ("summary", SheetType::Summary),
    ("preliminaries", SheetType::Preliminaries),
    ("reference", SheetType::Reference),
];

const SAMPLE_ROWS: usize = 30;

pub struct SheetClassification {
    pub sheet_type: SheetType,
    pub confidence: f64,
    pub reasoning: Vec<String>,
}

fn keyword_score(sheet_name: &str, content: &[&[String]], keywords: &[String], name_multiplier: f64) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let name_lower = sheet_name.to_lowercase();
    let name_matches = keywords.iter().filter(|k| name_lower.contains(k.as_str())).count() as f64;

    let content_matches = content
        .iter()
        .flat_map(|row| row.iter())
        .filter(|cell| {
            let lower = cell.to_lowercase();
            keywords.iter().any(|k| lower.contains(k.as_str()))
        })
        .count() as f64;

    let weighted = name_matches * name_multiplier + content_matches;
    (weighted / keywords.len() as f64).min(1.0)
}

fn numeric_ratio(content: &[&[String]], unit_tokens: &[String]) -> f64 {
    let cells: Vec<&String> = content.iter().flat_map(|row| row.iter()).filter(|c| !c.trim().is_empty()).collect();
    if cells.is_empty() {
        return 0.0;
    }
    let numeric = cells
        .iter()
        .filter(|c| is_any_numeric_pattern(c, unit_tokens))
        .count() as f64;
    numeric / cells.len() as f64
}

fn pattern_score(sheet: &Sheet, financial_tokens: &[String]) -> f64 {
    let mut hits = 0.0;
    let mut checks = 0.0;

    checks += 1.0;
    let has_financial_aggregator = sheet.rows().any(|row| {
        row.iter().any(|cell| {
            let lower = cell.to_lowercase();
            financial_tokens.iter().any(|t| lower.contains(t.as_str()))
        })
    });
    if has_financial_aggregator {
        hits += 1.0;
    }

    checks += 1.0;
    if let Some(first_row) = sheet.row(0) {
        let non_empty = first_row.iter().filter(|c| !c.trim().is_empty()).count();
        let is_header_like = non_empty as f64 >= sheet.col_count() as f64 * 0.6;
        let consistent_width = sheet.col_count() > 1;
        if is_header_like && consistent_width {
            hits += 1.0;
        }
    }

    checks += 1.0;
    let mut empty_row_runs = 0usize;
    let mut prev_empty = false;
    for row in sheet.rows().take(SAMPLE_ROWS) {
        let empty = row.iter().all(|c| c.trim().is_empty());
        if empty && !prev_empty {
            empty_row_runs += 1;
        }
        prev_empty = empty;
    }
    if empty_row_runs > 0 && empty_row_runs <= 5 {
        hits += 1.0;
    }

    if checks == 0.0 {
        0.0
    } else {
        hits / checks
    }
}

pub fn classify_sheet(sheet: &Sheet, config: &Config) -> SheetClassification {
    let thresholds = &config.sheet_classifier;
    let content: Vec<&[String]> = sheet.rows().take(SAMPLE_ROWS).collect();

    let numeric = numeric_ratio(&content, &config.vocabulary.unit_tokens);
    let pattern = pattern_score(sheet, &config.vocabulary.financial_aggregator_tokens);

    let mut scored = Vec::new();
    for (key, sheet_type) in SCORED_TYPES {
        let keywords = config
            .vocabulary
            .sheet_type_keywords
            .get(key)
            .cloned()
            .unwrap_or_default();
        let keyword = keyword_score(&sheet.name, &content, &keywords, thresholds.sheet_name_multiplier);
        let score = thresholds.keyword_weight * keyword
            + thresholds.numeric_ratio_weight * numeric
            + thresholds.pattern_weight * pattern;
        scored.push((sheet_type, score, keyword));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

    let qualifying: Vec<_> = scored
        .iter()
        .filter(|(_, score, _)| *score >= thresholds.min_confidence)
        .collect();

    match qualifying.len() {
        0 => SheetClassification {
            sheet_type: SheetType::Unknown,
            confidence: 0.0,
            reasoning: vec!["no sheet type reached the minimum confidence".to_string()],
        },
        1 => {
            let (sheet_type, score, keyword) = *qualifying[0];
            SheetClassification {
                sheet_type,
                confidence: score,
                reasoning: vec![format!(
                    "keyword={:.2} numeric={:.2} pattern={:.2}",
                    keyword, numeric, pattern
                )],
            }
        }
        _ => {
            let min_score = qualifying.iter().map(|(_, s, _)| *s).fold(f64::MAX, f64::min);
            SheetClassification {
                sheet_type: SheetType::Mixed,
                confidence: min_score,
                reasoning: vec![format!(
                    "{} sheet types tied above the confidence floor",
                    qualifying.len()
                )],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sheet;

    #[test]
    fn boq_main_sheet_with_numeric_line_items_classifies_correctly() {
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
        let result = classify_sheet(&sheet, &config);
        assert_eq!(result.sheet_type, SheetType::BoqMain);
        assert!(result.confidence > 0.0);
    }

    #[test]
    fn sheet_with_no_signal_classifies_unknown() {
        let config = Config::default();
        let sheet = Sheet::new("Misc", true, vec![vec!["x".into(), "y".into()]]);
        let result = classify_sheet(&sheet, &config);
        assert_eq!(result.sheet_type, SheetType::Unknown);
        assert_eq!(result.confidence, 0.0);
    }
}
