use colored::Colorize;

use crate::errors::Result;

use super::load_last_mapping;

/// `status`: one-line file-level readout of the last processed file.
pub fn handle_status_command() -> Result<()> {
    let Some(mapping) = load_last_mapping()? else {
        println!("no processed file yet; run `process` first");
        return Ok(());
    };

    let readiness = if mapping.export_ready {
        "export_ready".green()
    } else {
        "needs_review".yellow()
    };
    println!(
        "{}: global_confidence={:.2} {} ({} sheets, {} errors, {} warnings)",
        mapping.metadata.filename,
        mapping.global_confidence,
        readiness,
        mapping.sheets.len(),
        mapping.processing_summary.total_errors,
        mapping.processing_summary.total_warnings,
    );
    Ok(())
}
