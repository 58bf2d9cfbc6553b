//! Add command implementation

use super::{print_details, BookFields};
use crate::config::Config;
use anyhow::{bail, Context, Result};
use libris_core::NewBook;

/// Add a book entered by hand
pub fn add(config: &Config, fields: BookFields) -> Result<()> {
    if fields.title.is_none() && fields.author.is_none() {
        bail!("A book needs at least a title or an author");
    }

    let mut new = NewBook::new(
        fields.title.unwrap_or_default(),
        fields.author.unwrap_or_default(),
    )
    .with_tags(fields.tags);
    if let Some(year) = fields.year {
        new = new.with_year(year);
    }
    if let Some(summary) = fields.summary {
        new = new.with_summary(summary);
    }
    if let Some(cover) = fields.cover {
        new = new.with_cover(cover);
    }
    if let Some(drive) = fields.drive {
        new = new.with_drive_link(drive);
    }

    let mut library = config.open_library();
    let book = library.add_new(new).context("Failed to save book")?;

    tracing::info!("Added {:?}", book.title);
    print_details(&book);
    Ok(())
}
