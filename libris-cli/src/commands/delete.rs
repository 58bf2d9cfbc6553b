//! Delete command implementation

use super::{confirm, find};
use crate::config::Config;
use anyhow::{Context, Result};

/// Remove a book after confirmation
pub fn delete(config: &Config, id: &str, yes: bool) -> Result<()> {
    let mut library = config.open_library();
    let title = find(library.books(), id)?.title.clone();

    if !yes && !confirm(&format!("Delete {:?}?", title))? {
        println!("Cancelled");
        return Ok(());
    }

    library.delete(id).context("Failed to delete book")?;
    println!("Deleted {:?}", title);
    Ok(())
}
