use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::config::Config;
use crate::errors::Result;
use crate::export::export_summary;
use crate::pipeline::{process_workbook, CancellationToken, NullProgressObserver};
use crate::sheet_source::FileSheetSource;

use super::save_last_mapping;

/// `process <file>` (and `--batch` over a directory): run the pipeline,
/// print a terminal summary, cache the mapping for `export`/`status`.
pub fn handle_process_command(file: PathBuf, batch: bool, output: Option<PathBuf>, config: &Config) -> Result<()> {
    let targets: Vec<PathBuf> = if batch {
        std::fs::read_dir(&file)
            .map_err(|e| crate::errors::BoqError::io(&file, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect()
    } else {
        vec![file]
    };

    let mut any_failed = false;
    for path in targets {
        match process_one(&path, config) {
            Ok(mapping) => {
                println!("{}", export_summary(&mapping));
                if let Some(ref output_path) = output {
                    let json = crate::export::export_file_mapping_json(&mapping)?;
                    std::fs::write(output_path, json).map_err(|e| crate::errors::BoqError::io(output_path, e))?;
                }
                save_last_mapping(&mapping)?;
            }
            Err(e) => {
                any_failed = true;
                eprintln!("{} {}: {}", "error:".red().bold(), path.display(), e.user_message());
            }
        }
    }

    if any_failed {
        Err(crate::errors::BoqError::Config("one or more files failed to process".to_string()))
    } else {
        Ok(())
    }
}

fn process_one(path: &Path, config: &Config) -> Result<crate::model::FileMapping> {
    let source = FileSheetSource::new(path);
    process_workbook(&source, config, &NullProgressObserver, &CancellationToken::new())
}
