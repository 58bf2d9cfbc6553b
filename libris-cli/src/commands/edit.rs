//! Edit command implementation

use super::{find, print_details, BookFields};
use crate::config::Config;
use anyhow::{Context, Result};

/// Change a book's details; fields not given are left alone
pub fn edit(config: &Config, id: &str, fields: BookFields) -> Result<()> {
    let mut library = config.open_library();
    let mut book = find(library.books(), id)?.clone();

    if let Some(title) = fields.title {
        book.title = title.trim().to_string();
    }
    if let Some(author) = fields.author {
        book.author = author.trim().to_string();
    }
    if let Some(year) = fields.year {
        book.year = year.trim().to_string();
    }
    if let Some(summary) = fields.summary {
        book.summary = summary.trim().to_string();
    }
    if !fields.tags.is_empty() {
        book.tags = fields.tags;
    }
    if let Some(cover) = fields.cover {
        book.cover_url = cover.trim().to_string();
    }
    if let Some(drive) = fields.drive {
        book.drive_url = drive.trim().to_string();
    }

    let book = library.update(book).context("Failed to save book")?;
    print_details(&book);
    Ok(())
}
