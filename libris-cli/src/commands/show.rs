//! Show command implementation

use super::{find, print_details};
use crate::config::Config;
use anyhow::Result;

/// Display one book in full
pub fn show(config: &Config, id: &str, json: bool) -> Result<()> {
    let library = config.open_library();
    let book = find(library.books(), id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(book)?);
    } else {
        print_details(book);
    }

    Ok(())
}
