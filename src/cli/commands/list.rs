use comfy_table::Table;

use crate::errors::Result;

use super::load_last_mapping;

/// `list`: the sheets of the last processed file and their current status.
pub fn handle_list_command() -> Result<()> {
    let Some(mapping) = load_last_mapping()? else {
        println!("no processed file yet; run `process` first");
        return Ok(());
    };

    let mut table = Table::new();
    table.set_header(vec!["Sheet", "Type", "Status", "Overall", "Rows", "Errors"]);
    for sheet in &mapping.sheets {
        table.add_row(vec![
            sheet.sheet_name.clone(),
            format!("{:?}", sheet.sheet_type),
            format!("{:?}", sheet.processing_status),
            format!("{:.2}", sheet.confidences.overall),
            sheet.row_count().to_string(),
            sheet.error_count().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
