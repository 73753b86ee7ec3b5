//! Config and canonical-alias-file loading.
//!
//! Mirrors `debtmap::config::loader::load_config`'s ancestor-directory walk,
//! but adds the bundle-dir / first-run seeding behavior §6 requires for the
//! canonical-alias file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::ColumnRole;

use super::{Config, Vocabulary};

const CONFIG_FILE_NAME: &str = ".boq-tools.toml";
const CONFIG_ENV_VAR: &str = "BOQ_TOOLS_CONFIG";
const BUNDLE_DIR_ENV_VAR: &str = "BOQ_TOOLS_BUNDLE_DIR";
const ALIAS_FILE_NAME: &str = "column_aliases.json";
const MAX_TRAVERSAL_DEPTH: usize = 10;

fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

fn try_load_from_path(path: &Path) -> Option<Config> {
    let contents = fs::read_to_string(path).ok()?;
    match toml::from_str::<Config>(&contents) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config");
            Some(config)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to parse config, using defaults");
            None
        }
    }
}

/// Loads [`Config`], checking `BOQ_TOOLS_CONFIG` first, then walking
/// ancestor directories for `.boq-tools.toml`, falling back to defaults.
pub fn load_config() -> Config {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if let Some(config) = try_load_from_path(Path::new(&path)) {
            return config;
        }
    }

    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!(error = %e, "failed to get current directory, using default config");
            return Config::default();
        }
    };

    directory_ancestors(current, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_from_path(&path))
        .unwrap_or_default()
}

/// JSON document shape of the on-disk canonical-alias file: required-role
/// name → array of alias strings (§6).
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct AliasFile(HashMap<String, Vec<String>>);

fn role_from_name(name: &str) -> Option<ColumnRole> {
    match name {
        "description" => Some(ColumnRole::Description),
        "quantity" => Some(ColumnRole::Quantity),
        "unit_price" => Some(ColumnRole::UnitPrice),
        "total_price" => Some(ColumnRole::TotalPrice),
        "unit" => Some(ColumnRole::Unit),
        "code" => Some(ColumnRole::Code),
        _ => None,
    }
}

fn role_name(role: ColumnRole) -> &'static str {
    role.as_str()
}

fn alias_file_to_map(file: AliasFile) -> HashMap<String, ColumnRole> {
    let mut map = HashMap::new();
    for (role_name, aliases) in file.0 {
        if let Some(role) = role_from_name(&role_name) {
            for alias in aliases {
                map.insert(alias, role);
            }
        }
    }
    map
}

fn map_to_alias_file(map: &HashMap<String, ColumnRole>) -> AliasFile {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for (alias, role) in map {
        if role.is_required() {
            grouped
                .entry(role_name(*role).to_string())
                .or_default()
                .push(alias.clone());
        }
    }
    for aliases in grouped.values_mut() {
        aliases.sort();
    }
    AliasFile(grouped)
}

/// Loads the vocabulary (keyword sets come from defaults; canonical aliases
/// are resolved per §6's first-run sequence: user copy at `user_path`, else
/// the bundled default under `BOQ_TOOLS_BUNDLE_DIR`, else the in-code
/// defaults — written out to `user_path` so the next run finds a copy).
pub fn load_vocabulary(user_path: &Path) -> Vocabulary {
    let mut vocabulary = Vocabulary::default();

    if let Some(map) = load_alias_file(user_path) {
        vocabulary.canonical_aliases = map;
        return vocabulary;
    }

    if let Ok(bundle_dir) = std::env::var(BUNDLE_DIR_ENV_VAR) {
        let bundled_path = PathBuf::from(bundle_dir).join(ALIAS_FILE_NAME);
        if let Some(map) = load_alias_file(&bundled_path) {
            vocabulary.canonical_aliases = map.clone();
            let _ = save_alias_file(user_path, &map);
            return vocabulary;
        }
    }

    let _ = save_alias_file(user_path, &vocabulary.canonical_aliases);
    vocabulary
}

fn load_alias_file(path: &Path) -> Option<HashMap<String, ColumnRole>> {
    let contents = fs::read_to_string(path).ok()?;
    let file: AliasFile = serde_json::from_str(&contents).ok()?;
    Some(alias_file_to_map(file))
}

fn save_alias_file(path: &Path, map: &HashMap<String, ColumnRole>) -> crate::errors::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| crate::errors::BoqError::io(parent, e))?;
        }
    }
    let file = map_to_alias_file(map);
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| crate::errors::BoqError::Config(e.to_string()))?;
    fs::write(path, json).map_err(|e| crate::errors::BoqError::io(path, e))
}

/// Learning hook: insert a user-confirmed header → role association into
/// the alias table (keyed by the header *as typed*, not lowercased, per
/// §4.3) and persist it back to `user_path`.
pub fn learn_alias(
    vocabulary: &mut Vocabulary,
    user_path: &Path,
    original_header: &str,
    role: ColumnRole,
) -> crate::errors::Result<()> {
    vocabulary
        .canonical_aliases
        .insert(original_header.to_string(), role);
    save_alias_file(user_path, &vocabulary.canonical_aliases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn alias_file_round_trips_through_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aliases.json");

        let vocab = load_vocabulary(&path);
        assert!(path.exists());
        assert!(vocab.canonical_aliases.contains_key("description"));

        let reloaded = load_vocabulary(&path);
        assert_eq!(
            reloaded.canonical_aliases.len(),
            vocab.canonical_aliases.len()
        );
    }

    #[test]
    fn learn_alias_persists_new_mapping() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aliases.json");
        let mut vocab = load_vocabulary(&path);

        learn_alias(&mut vocab, &path, "Qté Matériel", ColumnRole::Quantity).unwrap();

        let reloaded = load_vocabulary(&path);
        assert_eq!(
            reloaded.canonical_aliases.get("Qté Matériel"),
            Some(&ColumnRole::Quantity)
        );
    }
}
