//! Status command implementation

use super::find;
use crate::config::Config;
use anyhow::Result;
use libris_core::ReadingStatus;

/// Advance a book's reading status, or set it directly
pub fn status(config: &Config, id: &str, set: Option<ReadingStatus>) -> Result<()> {
    let mut library = config.open_library();
    let title = find(library.books(), id)?.title.clone();

    let status = match set {
        Some(status) => library.set_status(id, status)?.status,
        None => library.toggle_status(id)?,
    };

    println!("{}: {}", title, status.label());
    Ok(())
}
