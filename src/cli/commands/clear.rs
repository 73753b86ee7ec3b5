use crate::errors::Result;

use super::clear_session;

/// `clear`: drops the cached last-processed mapping.
pub fn handle_clear_command() -> Result<()> {
    if clear_session()? {
        println!("cleared cached session state");
    } else {
        println!("nothing to clear");
    }
    Ok(())
}
