//! List command implementation

use super::print_summary;
use crate::config::Config;
use anyhow::Result;
use libris_core::{Book, ReadingStatus};

/// List books, newest first, optionally filtered
pub fn list(
    config: &Config,
    status: Option<ReadingStatus>,
    tag: Option<&str>,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let library = config.open_library();

    let books: Vec<&Book> = library
        .books()
        .iter()
        .filter(|b| status.map_or(true, |s| b.status == s))
        .filter(|b| tag.map_or(true, |t| b.has_tag(t)))
        .filter(|b| search.map_or(true, |q| b.matches_text(q)))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&books)?);
        return Ok(());
    }

    if books.is_empty() {
        if library.is_empty() {
            println!("Your library is empty. Add a book with `libris add` or `libris search`.");
        } else {
            println!("No books match.");
        }
        return Ok(());
    }

    for book in &books {
        print_summary(book);
    }

    if books.len() != library.len() {
        println!("\n{} of {} books", books.len(), library.len());
    } else {
        println!("\n{} books", books.len());
    }

    Ok(())
}
