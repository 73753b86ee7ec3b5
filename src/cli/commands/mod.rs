//! Command handlers, one module per subcommand (teacher's
//! `cli::commands` layout).

pub mod clear;
pub mod export_cmd;
pub mod list;
pub mod process;
pub mod status;

pub use clear::handle_clear_command;
pub use export_cmd::handle_export_command;
pub use list::handle_list_command;
pub use process::handle_process_command;
pub use status::handle_status_command;

use std::path::{Path, PathBuf};

use crate::errors::{BoqError, Result};
use crate::model::FileMapping;

const SESSION_DIR: &str = ".boq-tools";
const LAST_MAPPING_FILE: &str = "last_mapping.json";

fn session_dir() -> PathBuf {
    PathBuf::from(SESSION_DIR)
}

fn last_mapping_path() -> PathBuf {
    session_dir().join(LAST_MAPPING_FILE)
}

/// Persists the most recently processed [`FileMapping`] so `export`,
/// `list`, and `status` can find it without re-running the pipeline.
pub fn save_last_mapping(mapping: &FileMapping) -> Result<()> {
    let path = last_mapping_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BoqError::io(parent, e))?;
    }
    let json = crate::export::export_file_mapping_json(mapping)?;
    crate::dictionary::atomic_io::write_atomically(&path, &json)
}

/// Loads the last processed [`FileMapping`], if any session state exists.
pub fn load_last_mapping() -> Result<Option<FileMapping>> {
    load_mapping_from(&last_mapping_path())
}

fn load_mapping_from(path: &Path) -> Result<Option<FileMapping>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|e| BoqError::io(path, e))?;
    let mapping = serde_json::from_str(&contents).map_err(|e| BoqError::Dictionary(e.to_string()))?;
    Ok(Some(mapping))
}

/// Clears session state (the cached last mapping). Returns whether
/// anything was actually removed.
pub fn clear_session() -> Result<bool> {
    let path = last_mapping_path();
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(&path).map_err(|e| BoqError::io(&path, e))?;
    Ok(true)
}
