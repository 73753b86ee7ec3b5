//! Atomic JSON file writes: write to a sibling temp file, then rename.
//!
//! Grounded on the teacher's `cache::atomic_io` retry/temp-path pattern,
//! trimmed to what the category dictionary needs (single write, no retry —
//! the dictionary's caller decides whether to retry a failed save).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::{BoqError, Result};

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_path_for(target: &Path) -> PathBuf {
    let counter = TEMP_FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let pid = std::process::id();
    let file_name = target.file_name().and_then(|n| n.to_str()).unwrap_or("temp");
    let temp_name = format!(".{file_name}.tmp.{pid}.{counter}");
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(temp_name),
        _ => PathBuf::from(temp_name),
    }
}

/// Writes `contents` to `target` via a temp file + rename, so a reader never
/// observes a partially written file.
pub fn write_atomically(target: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| BoqError::io(parent, e))?;
        }
    }
    let temp_path = temp_path_for(target);
    fs::write(&temp_path, contents).map_err(|e| BoqError::io(&temp_path, e))?;
    fs::rename(&temp_path, target).map_err(|e| BoqError::io(target, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_and_overwrites_target_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dict.json");

        write_atomically(&path, "{\"a\":1}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":1}");

        write_atomically(&path, "{\"a\":2}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":2}");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deep/dict.json");
        write_atomically(&path, "{}").unwrap();
        assert!(path.exists());
    }
}
