//! Import command implementation

use super::confirm;
use crate::config::Config;
use anyhow::{Context, Result};
use libris_core::library::now_millis;
use libris_core::parse_import;
use std::fs;
use std::path::Path;

/// Merge an exported library file into the current library
pub fn import(config: &Config, input: &Path, yes: bool) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read import file: {}", input.display()))?;

    let batch = parse_import(&text, now_millis())
        .with_context(|| format!("{} is not a library export", input.display()))?;

    if batch.books.is_empty() {
        println!("No importable books found in {}", input.display());
        return Ok(());
    }

    if !yes && !confirm(&format!("Import {} books?", batch.books.len()))? {
        println!("Cancelled");
        return Ok(());
    }

    let mut library = config.open_library();
    let report = library.import_batch(batch).context("Failed to save library")?;

    println!("Imported {} new books", report.added);
    if report.skipped() > 0 {
        println!("Skipped {} already in the library", report.skipped());
    }
    let invalid = report.found - report.valid;
    if invalid > 0 {
        println!("Ignored {} entries without a title or author", invalid);
    }

    Ok(())
}
