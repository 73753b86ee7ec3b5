//! C9 — Category Dictionary (§4.7).
//!
//! Owns the description → category mapping table. Persisted as JSON with a
//! deterministic on-disk order so diffs are meaningful; writes go through
//! [`super::atomic_io::write_atomically`].

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{BoqError, Result};
use crate::model::{normalize_description, CategoryMapping, PRETTY_CATEGORIES};

use super::atomic_io::write_atomically;

/// §6 / §4.7: counts plus an ISO-8601 UTC `last_updated`, recomputed fresh
/// on every write. Unknown/missing on read is fine — it's ignored, not
/// relied on, since [`CategoryDictionary::from_file`] rebuilds it on the
/// next save.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DictionaryFileMetadata {
    mapping_count: usize,
    category_count: usize,
    last_updated: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct DictionaryFile {
    #[serde(default)]
    mappings: Vec<CategoryMapping>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    metadata: Option<DictionaryFileMetadata>,
}

pub struct MatchResult {
    pub category: Option<String>,
    pub match_type: &'static str,
    pub confidence: f64,
    pub suggestions: Vec<String>,
}

pub struct CategoryDictionary {
    mappings: HashMap<String, CategoryMapping>,
    /// Categories present in the global set regardless of whether any
    /// mapping currently references them (seeded from `PRETTY_CATEGORIES`
    /// plus anything explicitly added).
    categories: HashSet<String>,
}

impl CategoryDictionary {
    fn minimal_defaults() -> Self {
        Self {
            mappings: HashMap::new(),
            categories: PRETTY_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn from_file(file: DictionaryFile) -> Self {
        let mut categories: HashSet<String> = PRETTY_CATEGORIES.iter().map(|s| s.to_string()).collect();
        categories.extend(file.categories);
        let mappings = file
            .mappings
            .into_iter()
            .map(|m| (m.description_normalized.clone(), m))
            .collect();
        Self { mappings, categories }
    }

    fn to_file(&self) -> DictionaryFile {
        let mut mappings: Vec<CategoryMapping> = self.mappings.values().cloned().collect();
        mappings.sort_by(|a, b| a.description_normalized.cmp(&b.description_normalized));
        let mut categories: Vec<String> = self.categories.iter().cloned().collect();
        categories.sort();
        let metadata = DictionaryFileMetadata {
            mapping_count: mappings.len(),
            category_count: categories.len(),
            last_updated: Utc::now(),
        };
        DictionaryFile { mappings, categories, metadata: Some(metadata) }
    }

    /// Loads the dictionary from `path`; if absent, attempts `bundle_path`
    /// (a read-only bundled default), then falls back to a minimal defaults
    /// snapshot which is immediately saved to `path`.
    pub fn load(path: &Path, bundle_path: Option<&Path>) -> Result<Self> {
        if let Some(dict) = Self::try_read(path) {
            return Ok(dict);
        }
        if let Some(bundle) = bundle_path {
            if let Some(dict) = Self::try_read(bundle) {
                dict.save(path)?;
                return Ok(dict);
            }
        }
        let dict = Self::minimal_defaults();
        dict.save(path)?;
        Ok(dict)
    }

    fn try_read(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let file: DictionaryFile = serde_json::from_str(&contents).ok()?;
        Some(Self::from_file(file))
    }

    /// Atomic write with deterministic ordering.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.to_file())
            .map_err(|e| BoqError::Dictionary(e.to_string()))?;
        write_atomically(path, &json)
    }

    /// Copies the current file to a timestamped sibling, e.g.
    /// `dict.json.bak.20260727T160512Z`. Returns `None` if `path` doesn't
    /// exist yet.
    pub fn backup_current_file(&self, path: &Path) -> Result<Option<PathBuf>> {
        if !path.exists() {
            return Ok(None);
        }
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let backup_path = PathBuf::from(format!("{}.bak.{stamp}", path.display()));
        std::fs::copy(path, &backup_path).map_err(|e| BoqError::io(&backup_path, e))?;
        Ok(Some(backup_path))
    }

    /// Exact-match lookup only (§4.7: "the current contract is
    /// exact-match-only"). On miss, returns up to 5 category suggestions
    /// drawn from the global set.
    pub fn find_category(&self, description: &str) -> MatchResult {
        let key = normalize_description(description);
        if let Some(mapping) = self.mappings.get(&key) {
            return MatchResult {
                category: Some(mapping.category.clone()),
                match_type: "exact",
                confidence: mapping.confidence,
                suggestions: Vec::new(),
            };
        }
        let mut suggestions: Vec<String> = self.categories.iter().cloned().collect();
        suggestions.sort();
        suggestions.truncate(5);
        MatchResult {
            category: None,
            match_type: "none",
            confidence: 0.0,
            suggestions,
        }
    }

    /// Increments the matched mapping's usage count. No-op if `description`
    /// doesn't resolve to an existing mapping (e.g. a miss).
    pub fn record_hit(&mut self, description: &str) {
        let key = normalize_description(description);
        if let Some(mapping) = self.mappings.get_mut(&key) {
            mapping.usage_count += 1;
        }
    }

    fn prune_unreferenced(&mut self, category: &str) {
        if PRETTY_CATEGORIES.contains(&category) {
            return;
        }
        let still_referenced = self.mappings.values().any(|m| m.category == category);
        if !still_referenced {
            self.categories.remove(category);
        }
    }

    pub fn add_mapping(&mut self, description: &str, category: impl Into<String>) {
        let category = category.into();
        let key = normalize_description(description);
        self.categories.insert(category.clone());
        let mut mapping = CategoryMapping::new(key.clone(), category);
        mapping.original_description = Some(description.to_string());
        mapping.created_at = Some(Utc::now());
        self.mappings.insert(key, mapping);
    }

    pub fn update_mapping(&mut self, description: &str, category: impl Into<String>) {
        let category = category.into();
        let key = normalize_description(description);
        let old_category = self.mappings.get(&key).map(|m| m.category.clone());
        self.categories.insert(category.clone());
        if let Some(mapping) = self.mappings.get_mut(&key) {
            mapping.category = category;
        } else {
            self.add_mapping(description, category);
            return;
        }
        if let Some(old) = old_category {
            self.prune_unreferenced(&old);
        }
    }

    pub fn remove_mapping(&mut self, description: &str) {
        let key = normalize_description(description);
        if let Some(mapping) = self.mappings.remove(&key) {
            self.prune_unreferenced(&mapping.category);
        }
    }

    /// Batched insert/update. Skips empty descriptions. Returns
    /// `(added_count, updated_count)`.
    pub fn upsert_mappings(&mut self, batch: &[(String, String)]) -> (usize, usize) {
        let mut added = 0;
        let mut updated = 0;
        for (description, category) in batch {
            if description.trim().is_empty() {
                continue;
            }
            let key = normalize_description(description);
            if self.mappings.contains_key(&key) {
                self.update_mapping(description, category.clone());
                updated += 1;
            } else {
                self.add_mapping(description, category.clone());
                added += 1;
            }
        }
        (added, updated)
    }

    /// Removes mappings by description, returning the removed count.
    pub fn delete_mappings(&mut self, descriptions: &[String]) -> usize {
        let mut removed = 0;
        for description in descriptions {
            let key = normalize_description(description);
            if let Some(mapping) = self.mappings.remove(&key) {
                self.prune_unreferenced(&mapping.category);
                removed += 1;
            }
        }
        removed
    }

    /// Renames the category for every mapping in `descriptions`. Returns
    /// the count actually updated.
    pub fn rename_category_for_descriptions(&mut self, descriptions: &[String], new_category: &str) -> usize {
        self.categories.insert(new_category.to_string());
        let mut updated = 0;
        let mut old_categories = Vec::new();
        for description in descriptions {
            let key = normalize_description(description);
            if let Some(mapping) = self.mappings.get_mut(&key) {
                old_categories.push(mapping.category.clone());
                mapping.category = new_category.to_string();
                updated += 1;
            }
        }
        for old in old_categories {
            self.prune_unreferenced(&old);
        }
        updated
    }

    /// Stable, sorted snapshot suitable for a UI listing.
    pub fn list_mappings(&self) -> Vec<CategoryMapping> {
        let mut list: Vec<CategoryMapping> = self.mappings.values().cloned().collect();
        list.sort_by(|a, b| a.description_normalized.cmp(&b.description_normalized));
        list
    }

    /// Supplemented operation (grounded on the original's free-text category
    /// normalization pass): remaps every mapping whose category is not in
    /// [`PRETTY_CATEGORIES`] onto `fallback`, returning the count changed.
    pub fn migrate_legacy_categories(&mut self, fallback: &str) -> usize {
        self.categories.insert(fallback.to_string());
        let mut migrated = 0;
        let mut old_categories = Vec::new();
        for mapping in self.mappings.values_mut() {
            if !PRETTY_CATEGORIES.contains(&mapping.category.as_str()) {
                old_categories.push(mapping.category.clone());
                mapping.category = fallback.to_string();
                migrated += 1;
            }
        }
        for old in old_categories {
            self.prune_unreferenced(&old);
        }
        migrated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_on_missing_file_seeds_minimal_defaults_and_saves() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dict.json");
        let dict = CategoryDictionary::load(&path, None).unwrap();
        assert!(path.exists());
        assert!(dict.categories.contains("General Costs"));
    }

    #[test]
    fn add_then_find_category_is_exact_match() {
        let mut dict = CategoryDictionary::minimal_defaults();
        dict.add_mapping("Concrete Foundation", "Civil Works");
        let result = dict.find_category("  concrete   foundation ");
        assert_eq!(result.category.as_deref(), Some("Civil Works"));
        assert_eq!(result.match_type, "exact");
    }

    #[test]
    fn miss_returns_suggestions_capped_at_five() {
        let dict = CategoryDictionary::minimal_defaults();
        let result = dict.find_category("unknown item");
        assert!(result.category.is_none());
        assert!(result.suggestions.len() <= 5);
    }

    #[test]
    fn removing_last_mapping_prunes_non_pretty_category() {
        let mut dict = CategoryDictionary::minimal_defaults();
        dict.add_mapping("Widget X", "Custom Category");
        assert!(dict.categories.contains("Custom Category"));
        dict.remove_mapping("Widget X");
        assert!(!dict.categories.contains("Custom Category"));
    }

    #[test]
    fn pretty_category_survives_pruning_even_with_no_mappings() {
        let mut dict = CategoryDictionary::minimal_defaults();
        dict.add_mapping("Widget X", "Civil Works");
        dict.remove_mapping("Widget X");
        assert!(dict.categories.contains("Civil Works"));
    }

    #[test]
    fn upsert_mappings_skips_empty_descriptions_and_counts_correctly() {
        let mut dict = CategoryDictionary::minimal_defaults();
        let batch = vec![
            ("Concrete".to_string(), "Civil Works".to_string()),
            ("".to_string(), "Other".to_string()),
        ];
        let (added, updated) = dict.upsert_mappings(&batch);
        assert_eq!(added, 1);
        assert_eq!(updated, 0);

        let (added2, updated2) = dict.upsert_mappings(&[("Concrete".to_string(), "Other".to_string())]);
        assert_eq!(added2, 0);
        assert_eq!(updated2, 1);
    }

    #[test]
    fn record_hit_increments_usage_count_and_ignores_misses() {
        let mut dict = CategoryDictionary::minimal_defaults();
        dict.add_mapping("Concrete Foundation", "Civil Works");
        dict.record_hit("  Concrete   Foundation ");
        dict.record_hit("concrete foundation");
        dict.record_hit("no such description");
        let mapping = dict.list_mappings().into_iter().find(|m| m.description_normalized == "concrete foundation").unwrap();
        assert_eq!(mapping.usage_count, 2);
    }

    #[test]
    fn migrate_legacy_categories_remaps_non_pretty_categories() {
        let mut dict = CategoryDictionary::minimal_defaults();
        dict.add_mapping("Old Item", "Legacy Bucket");
        let migrated = dict.migrate_legacy_categories("Other");
        assert_eq!(migrated, 1);
        assert_eq!(dict.find_category("Old Item").category.as_deref(), Some("Other"));
    }

    #[test]
    fn save_writes_metadata_section_with_counts_and_iso8601_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dict.json");
        let mut dict = CategoryDictionary::minimal_defaults();
        dict.add_mapping("Concrete Foundation", "Civil Works");
        dict.save(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let file: DictionaryFile = serde_json::from_str(&contents).unwrap();
        let metadata = file.metadata.expect("metadata section must be present");
        assert_eq!(metadata.mapping_count, 1);
        assert_eq!(metadata.category_count, dict.categories.len());
        assert!(contents.contains("\"last_updated\""));
        assert_eq!(metadata.last_updated.format("%z").to_string(), "+0000");
    }

    #[test]
    fn save_and_reload_round_trips_and_is_deterministically_ordered() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dict.json");
        let mut dict = CategoryDictionary::minimal_defaults();
        dict.add_mapping("Zeta Item", "Other");
        dict.add_mapping("Alpha Item", "Other");
        dict.save(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let alpha_pos = contents.find("alpha item").unwrap();
        let zeta_pos = contents.find("zeta item").unwrap();
        assert!(alpha_pos < zeta_pos);

        let reloaded = CategoryDictionary::load(&path, None).unwrap();
        assert_eq!(reloaded.list_mappings().len(), 2);
    }
}
