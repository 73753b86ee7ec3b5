use std::path::PathBuf;

use crate::errors::{BoqError, Result};
use crate::export::{export, ExportFormat};

use super::load_last_mapping;

/// `export <key> <path> [--format FORMAT]`. `key` selects the artifact;
/// currently only `mapping` (the last processed [`crate::model::FileMapping`])
/// is available from session state.
pub fn handle_export_command(key: String, path: PathBuf, format: String) -> Result<()> {
    if key != "mapping" {
        return Err(BoqError::Config(format!("unknown export key '{key}'; expected 'mapping'")));
    }
    let mapping = load_last_mapping()?.ok_or_else(|| BoqError::Config("no processed file yet; run `process` first".to_string()))?;
    let format = ExportFormat::parse(&format)?;
    let rendered = export(&mapping, format)?;
    std::fs::write(&path, rendered).map_err(|e| BoqError::io(&path, e))?;
    println!("wrote {}", path.display());
    Ok(())
}
