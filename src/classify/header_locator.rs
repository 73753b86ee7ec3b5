//! C4 — Header Locator (§4.2).
//!
//! Searches the first N rows; for each candidate computes the max confidence
//! across four independent detectors (keyword, data-pattern, positional,
//! merged) and picks the highest-confidence candidate overall.

use crate::config::Config;
use crate::model::{HeaderInfo, HeaderMethod, Sheet};
use crate::parsing::is_any_numeric_pattern;
use crate::text::normalize_header;

struct Detection {
    confidence: f64,
    method: HeaderMethod,
    reasoning: String,
    is_merged: bool,
}

fn keyword_detector(sheet: &Sheet, row_idx: usize, config: &Config) -> Option<Detection> {
    let row = sheet.row(row_idx)?;
    if row.iter().all(|c| c.trim().is_empty()) {
        return None;
    }
    let abbreviations = &config.vocabulary.abbreviations;
    let total_weight: f64 = row
        .iter()
        .map(|cell| {
            let normalized = normalize_header(cell, abbreviations);
            config
                .vocabulary
                .roles
                .iter()
                .filter(|rk| rk.keywords.iter().any(|k| normalized.contains(k.as_str())))
                .map(|rk| rk.weight)
                .fold(0.0, f64::max)
        })
        .sum();
    let confidence = (total_weight / row.len().max(1) as f64).min(1.0);
    if confidence >= config.header_locator.keyword_accept {
        Some(Detection {
            confidence,
            method: HeaderMethod::Keyword,
            reasoning: format!("row {row_idx}: keyword weight sum {total_weight:.2} normalized to {confidence:.2}"),
            is_merged: false,
        })
    } else {
        None
    }
}

fn data_pattern_detector(sheet: &Sheet, row_idx: usize, config: &Config) -> Option<Detection> {
    let row = sheet.row(row_idx)?;
    let non_empty: Vec<&String> = row.iter().filter(|c| !c.trim().is_empty()).collect();
    if non_empty.is_empty() {
        return None;
    }
    let unit_tokens = &config.vocabulary.unit_tokens;
    let text_like = non_empty
        .iter()
        .filter(|c| !is_any_numeric_pattern(c, unit_tokens))
        .count() as f64;
    let is_mostly_text = text_like / non_empty.len() as f64 >= 0.6;
    if !is_mostly_text {
        return None;
    }

    let following_numeric_ratio = (1..=3)
        .filter_map(|offset| sheet.row(row_idx + offset))
        .map(|next| {
            let non_empty: Vec<&String> = next.iter().filter(|c| !c.trim().is_empty()).collect();
            if non_empty.is_empty() {
                0.0
            } else {
                non_empty.iter().filter(|c| is_any_numeric_pattern(c, unit_tokens)).count() as f64
                    / non_empty.len() as f64
            }
        })
        .fold(0.0, f64::max);

    let confidence = following_numeric_ratio;
    if confidence >= config.header_locator.data_pattern_accept {
        Some(Detection {
            confidence,
            method: HeaderMethod::DataPattern,
            reasoning: format!(
                "row {row_idx} is mostly text; following rows are {confidence:.2} numeric"
            ),
            is_merged: false,
        })
    } else {
        None
    }
}

fn positional_detector(sheet: &Sheet, row_idx: usize, config: &Config) -> Option<Detection> {
    let row = sheet.row(row_idx)?;
    if row.len() < 3 {
        return None;
    }
    let abbreviations = &config.vocabulary.abbreviations;
    let left = normalize_header(&row[0], abbreviations);
    let right = normalize_header(row.last().unwrap(), abbreviations);

    let desc_keywords = config.vocabulary.role_keywords(crate::model::ColumnRole::Description);
    let total_keywords = config.vocabulary.role_keywords(crate::model::ColumnRole::TotalPrice);

    let left_is_description = desc_keywords.iter().any(|k| left.contains(k.as_str())) || left.len() > right.len();
    let right_is_total = total_keywords.iter().any(|k| right.contains(k.as_str()));

    if !left_is_description || !right_is_total {
        return None;
    }

    let middle_score = if row.len() > 2 { 0.1 } else { 0.0 };
    let confidence = (0.3 + middle_score).min(1.0);
    if confidence >= config.header_locator.positional_accept {
        Some(Detection {
            confidence,
            method: HeaderMethod::Positional,
            reasoning: format!("row {row_idx}: description-like left cell, total-like right cell"),
            is_merged: false,
        })
    } else {
        None
    }
}

fn merged_detector(sheet: &Sheet, row_idx: usize, config: &Config) -> Option<Detection> {
    let row = sheet.row(row_idx)?;
    let empty_count = row.iter().filter(|c| c.trim().is_empty()).count();
    let content_count = row.len() - empty_count;
    if empty_count == 0 || content_count == 0 {
        return None;
    }
    let is_sparse = empty_count as f64 / row.len() as f64 >= 0.3;
    if !is_sparse {
        return None;
    }
    let next = sheet.row(row_idx + 1)?;
    let next_non_empty = next.iter().filter(|c| !c.trim().is_empty()).count();
    let richer = next_non_empty > content_count;
    if !richer {
        return None;
    }
    let confidence = (content_count as f64 / row.len() as f64 + 0.4).min(1.0).max(config.header_locator.merged_accept);
    if confidence >= config.header_locator.merged_accept {
        Some(Detection {
            confidence,
            method: HeaderMethod::Merged,
            reasoning: format!("row {row_idx} is sparse, row {} below is richer", row_idx + 1),
            is_merged: true,
        })
    } else {
        None
    }
}

fn combine_headers(sheet: &Sheet, row_idx: usize) -> Vec<String> {
    let upper = sheet.row(row_idx).unwrap_or(&[]);
    let lower = sheet.row(row_idx + 1).unwrap_or(&[]);
    let width = upper.len().max(lower.len());
    (0..width)
        .map(|i| {
            let u = upper.get(i).map(String::as_str).unwrap_or("");
            let l = lower.get(i).map(String::as_str).unwrap_or("");
            if !l.trim().is_empty() {
                l.to_string()
            } else {
                u.to_string()
            }
        })
        .collect()
}

/// Locates the header row of `sheet`, searching up to `config`'s configured
/// search-row count (default 10, user-adjustable up to 20).
pub fn locate_header(sheet: &Sheet, config: &Config) -> HeaderInfo {
    let search_rows = config
        .header_locator
        .search_rows
        .min(config.header_locator.max_search_rows)
        .min(sheet.row_count());

    let mut best: Option<(usize, Detection)> = None;

    for row_idx in 0..search_rows {
        let detections = [
            keyword_detector(sheet, row_idx, config),
            data_pattern_detector(sheet, row_idx, config),
            positional_detector(sheet, row_idx, config),
            merged_detector(sheet, row_idx, config),
        ];
        for detection in detections.into_iter().flatten() {
            let better = best
                .as_ref()
                .map(|(_, b)| detection.confidence > b.confidence)
                .unwrap_or(true);
            if better {
                best = Some((row_idx, detection));
            }
        }
    }

    match best {
        Some((row_idx, detection)) => {
            let headers = if detection.is_merged {
                combine_headers(sheet, row_idx)
            } else {
                sheet.row(row_idx).unwrap_or(&[]).to_vec()
            };
            HeaderInfo {
                row_index: row_idx,
                confidence: detection.confidence,
                method: detection.method,
                reasoning: vec![detection.reasoning],
                headers,
                is_merged: detection.is_merged,
            }
        }
        None => {
            let fallback_idx = (0..sheet.row_count())
                .find(|&i| sheet.row(i).map(|r| r.iter().any(|c| !c.trim().is_empty())).unwrap_or(false))
                .unwrap_or(0);
            HeaderInfo::synthetic(fallback_idx, sheet.row(fallback_idx).unwrap_or(&[]).to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_single_row_header_detected_with_keyword_method() {
        let config = Config::default();
        let sheet = Sheet::new(
            "Sheet1",
            true,
            vec![
                vec!["Item Code".into(), "Description".into(), "Unit".into(), "Quantity".into(), "Unit Price".into(), "Total Amount".into()],
                vec!["001".into(), "Excavation".into(), "m3".into(), "100".into(), "25.50".into(), "2550.00".into()],
                vec!["002".into(), "Concrete".into(), "m3".into(), "50".into(), "150.00".into(), "7500.00".into()],
            ],
        );
        let header = locate_header(&sheet, &config);
        assert_eq!(header.row_index, 0);
        assert!(header.confidence >= 0.7);
        assert_eq!(header.method, HeaderMethod::Keyword);
    }

    #[test]
    fn merged_header_resolves_to_row_with_correct_tokens() {
        let config = Config::default();
        let sheet = Sheet::new(
            "Sheet1",
            true,
            vec![
                vec!["".into(), "".into(), "Quantity".into(), "".into(), "".into()],
                vec!["Code".into(), "Description".into(), "Unit".into(), "Rate".into(), "Amount".into()],
            ],
        );
        let header = locate_header(&sheet, &config);
        assert!(header.row_index == 0 || header.row_index == 1);
        if header.row_index == 0 {
            assert!(header.is_merged);
            assert_eq!(header.method, HeaderMethod::Merged);
        } else {
            assert_eq!(header.method, HeaderMethod::Keyword);
        }
        assert!(header.headers.iter().any(|h| h.to_lowercase().contains("description")));
    }

    #[test]
    fn falls_back_to_first_non_empty_row_with_low_confidence() {
        let config = Config::default();
        let sheet = Sheet::new("Sheet1", true, vec![vec!["".into()], vec!["xyz".into(), "abc".into()]]);
        let header = locate_header(&sheet, &config);
        assert_eq!(header.row_index, 1);
        assert_eq!(header.confidence, 0.1);
    }
}
