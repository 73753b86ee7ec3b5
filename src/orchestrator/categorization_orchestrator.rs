//! C10 — Categorization Orchestrator (§4.8).
//!
//! Drives the dictionary through auto-categorization, review-artifact
//! generation, manual application, and learning, with a short-circuit when
//! nothing needs review and a rollback if anything fails after the Step E
//! backup.

use std::collections::HashMap;

use crate::dictionary::CategoryDictionary;
use crate::errors::{BoqError, Result};
use crate::model::normalize_description;

/// One row of the normalized line-item table the orchestrator works over.
/// `category` is written in place by Step A / Step D.
#[derive(Debug, Clone)]
pub struct CategorizableRow {
    pub description: String,
    pub source_sheet: String,
    pub row_number: usize,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UnmatchedDescription {
    pub description_normalized: String,
    pub source_sheet: String,
    pub first_row_number: usize,
    pub frequency: usize,
    pub sample_rows: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct ReviewArtifactRow {
    pub description: String,
    pub source_sheet: String,
    pub frequency: usize,
    pub auto_category: Option<String>,
    pub match_type: &'static str,
    pub confidence: f64,
    pub category_to_fill: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AutoCategorizeStats {
    pub total_rows: usize,
    pub matched_rows: usize,
    pub unmatched_rows: usize,
    pub match_rate: f64,
}

#[derive(Debug, Clone)]
pub struct ApplyManualStats {
    pub rows_updated: usize,
    pub remaining_unmatched: usize,
    pub coverage_rate: f64,
}

#[derive(Debug, Clone)]
pub struct CategoryConflict {
    pub description: String,
    pub existing_category: String,
    pub proposed_category: String,
}

#[derive(Debug, Clone)]
pub struct LearnStats {
    pub added: usize,
    pub updated: usize,
    pub conflicts: Vec<CategoryConflict>,
}

pub struct CategorizationOutcome {
    pub auto_stats: AutoCategorizeStats,
    pub manual_categorization_needed: bool,
    pub review_items: Vec<UnmatchedDescription>,
    pub review_artifact: Option<Vec<ReviewArtifactRow>>,
}

/// Step A: looks up every row's description in `dictionary`, writing
/// `category` on hit and incrementing the mapping's usage count.
pub fn auto_categorize(rows: &mut [CategorizableRow], dictionary: &mut CategoryDictionary) -> AutoCategorizeStats {
    let mut matched = 0;
    for row in rows.iter_mut() {
        let result = dictionary.find_category(&row.description);
        if let Some(category) = result.category {
            dictionary.record_hit(&row.description);
            row.category = Some(category);
            matched += 1;
        }
    }
    let total = rows.len();
    AutoCategorizeStats {
        total_rows: total,
        matched_rows: matched,
        unmatched_rows: total - matched,
        match_rate: if total == 0 { 1.0 } else { matched as f64 / total as f64 },
    }
}

/// Step B: deduplicated, frequency-descending list of rows still needing a
/// category.
pub fn collect_review_items(rows: &[CategorizableRow]) -> Vec<UnmatchedDescription> {
    let mut by_key: HashMap<String, UnmatchedDescription> = HashMap::new();
    for row in rows.iter().filter(|r| r.category.is_none()) {
        let key = normalize_description(&row.description);
        by_key
            .entry(key.clone())
            .and_modify(|entry| {
                entry.frequency += 1;
                entry.sample_rows.push(row.row_number);
            })
            .or_insert_with(|| UnmatchedDescription {
                description_normalized: key,
                source_sheet: row.source_sheet.clone(),
                first_row_number: row.row_number,
                frequency: 1,
                sample_rows: vec![row.row_number],
            });
    }
    let mut items: Vec<UnmatchedDescription> = by_key.into_values().collect();
    items.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.description_normalized.cmp(&b.description_normalized)));
    items
}

/// Step C: the logical review-artifact schema (physical encoding is the
/// export collaborator's concern).
pub fn generate_review_artifact(items: &[UnmatchedDescription], dictionary: &CategoryDictionary) -> Vec<ReviewArtifactRow> {
    items
        .iter()
        .map(|item| {
            let result = dictionary.find_category(&item.description_normalized);
            ReviewArtifactRow {
                description: item.description_normalized.clone(),
                source_sheet: item.source_sheet.clone(),
                frequency: item.frequency,
                auto_category: result.category,
                match_type: result.match_type,
                confidence: result.confidence,
                category_to_fill: None,
                notes: None,
            }
        })
        .collect()
}

/// Runs Steps A–C, short-circuiting C if Step A left nothing unmatched.
pub fn run_auto_pass(rows: &mut [CategorizableRow], dictionary: &mut CategoryDictionary) -> CategorizationOutcome {
    let auto_stats = auto_categorize(rows, dictionary);
    if auto_stats.unmatched_rows == 0 {
        return CategorizationOutcome {
            auto_stats,
            manual_categorization_needed: false,
            review_items: Vec::new(),
            review_artifact: None,
        };
    }
    let review_items = collect_review_items(rows);
    let review_artifact = generate_review_artifact(&review_items, dictionary);
    CategorizationOutcome {
        auto_stats,
        manual_categorization_needed: true,
        review_items,
        review_artifact: Some(review_artifact),
    }
}

/// Step D: applies a completed review artifact's `Description → Category`
/// map back onto `rows`. `case_sensitive` controls the key comparison.
pub fn apply_manual(rows: &mut [CategorizableRow], filled: &[ReviewArtifactRow], case_sensitive: bool) -> Result<ApplyManualStats> {
    let mut manual_map: HashMap<String, String> = HashMap::new();
    for entry in filled {
        let Some(category) = &entry.category_to_fill else { continue };
        if category.trim().is_empty() {
            continue;
        }
        let key = if case_sensitive {
            entry.description.clone()
        } else {
            entry.description.to_lowercase()
        };
        manual_map.insert(key, category.clone());
    }
    if manual_map.is_empty() && filled.iter().all(|e| e.category_to_fill.is_none()) {
        return Err(BoqError::ReviewArtifact("review artifact contains no filled categories".to_string()));
    }

    let mut updated = 0;
    for row in rows.iter_mut().filter(|r| r.category.is_none()) {
        let normalized = normalize_description(&row.description);
        let key = if case_sensitive { normalized.clone() } else { normalized.to_lowercase() };
        if let Some(category) = manual_map.get(&key) {
            row.category = Some(category.clone());
            updated += 1;
        }
    }

    let total = rows.len();
    let remaining_unmatched = rows.iter().filter(|r| r.category.is_none()).count();
    Ok(ApplyManualStats {
        rows_updated: updated,
        remaining_unmatched,
        coverage_rate: if total == 0 {
            1.0
        } else {
            (total - remaining_unmatched) as f64 / total as f64
        },
    })
}

/// Step E: upserts user-confirmed `(description, category)` pairs, backing
/// up the dictionary file first and rolling back on any failure after the
/// backup succeeds. Conflicting descriptions (already mapped to a
/// *different* category) are reported, not overwritten.
pub fn learn(
    dictionary: &mut CategoryDictionary,
    dictionary_path: &std::path::Path,
    confirmed: &[(String, String)],
) -> Result<LearnStats> {
    let backup_path = dictionary.backup_current_file(dictionary_path)?;

    let result = (|| -> Result<LearnStats> {
        let mut conflicts = Vec::new();
        let mut to_upsert = Vec::new();
        for (description, category) in confirmed {
            if description.trim().is_empty() {
                continue;
            }
            let existing = dictionary.find_category(description);
            match existing.category {
                Some(existing_category) if existing_category != *category => {
                    conflicts.push(CategoryConflict {
                        description: description.clone(),
                        existing_category,
                        proposed_category: category.clone(),
                    });
                }
                _ => to_upsert.push((description.clone(), category.clone())),
            }
        }
        let (added, updated) = dictionary.upsert_mappings(&to_upsert);
        dictionary.save(dictionary_path)?;
        Ok(LearnStats { added, updated, conflicts })
    })();

    match result {
        Ok(stats) => Ok(stats),
        Err(e) => {
            if let Some(backup) = backup_path {
                std::fs::copy(&backup, dictionary_path).map_err(|io_err| BoqError::io(dictionary_path, io_err))?;
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rows() -> Vec<CategorizableRow> {
        vec![
            CategorizableRow { description: "Concrete Foundation".into(), source_sheet: "Sheet1".into(), row_number: 2, category: None },
            CategorizableRow { description: "Unknown Widget".into(), source_sheet: "Sheet1".into(), row_number: 3, category: None },
            CategorizableRow { description: "unknown widget".into(), source_sheet: "Sheet1".into(), row_number: 4, category: None },
        ]
    }

    #[test]
    fn short_circuits_when_everything_matches() {
        let mut dict = CategoryDictionary::load(&tempdir().unwrap().path().join("d.json"), None).unwrap();
        dict.add_mapping("Concrete Foundation", "Civil Works");
        let mut single = vec![rows().remove(0)];
        let outcome = run_auto_pass(&mut single, &mut dict);
        assert!(!outcome.manual_categorization_needed);
        assert!(outcome.review_artifact.is_none());
    }

    #[test]
    fn auto_categorize_increments_matched_mapping_usage_count() {
        let mut dict = CategoryDictionary::load(&tempdir().unwrap().path().join("d.json"), None).unwrap();
        dict.add_mapping("Concrete Foundation", "Civil Works");
        let mut single = vec![rows().remove(0)];
        auto_categorize(&mut single, &mut dict);
        let mapping = dict.list_mappings().into_iter().find(|m| m.description_normalized == "concrete foundation").unwrap();
        assert_eq!(mapping.usage_count, 1);
    }

    #[test]
    fn collects_deduplicated_review_items_ordered_by_frequency() {
        let mut dict = CategoryDictionary::load(&tempdir().unwrap().path().join("d.json"), None).unwrap();
        let mut all = rows();
        let outcome = run_auto_pass(&mut all, &mut dict);
        assert!(outcome.manual_categorization_needed);
        assert_eq!(outcome.review_items.len(), 2);
        assert_eq!(outcome.review_items[0].frequency, 2);
    }

    #[test]
    fn apply_manual_fills_remaining_rows_case_insensitively() {
        let mut all = rows();
        let filled = vec![ReviewArtifactRow {
            description: "unknown widget".into(),
            source_sheet: "Sheet1".into(),
            frequency: 2,
            auto_category: None,
            match_type: "none",
            confidence: 0.0,
            category_to_fill: Some("Other".into()),
            notes: None,
        }];
        let stats = apply_manual(&mut all, &filled, false).unwrap();
        assert_eq!(stats.rows_updated, 2);
        assert_eq!(stats.remaining_unmatched, 0);
    }

    #[test]
    fn learn_reports_conflict_without_overwriting() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("d.json");
        let mut dict = CategoryDictionary::load(&path, None).unwrap();
        dict.add_mapping("Concrete Foundation", "Civil Works");
        dict.save(&path).unwrap();

        let stats = learn(&mut dict, &path, &[("Concrete Foundation".to_string(), "Other".to_string())]).unwrap();
        assert_eq!(stats.conflicts.len(), 1);
        assert_eq!(dict.find_category("Concrete Foundation").category.as_deref(), Some("Civil Works"));
    }
}
