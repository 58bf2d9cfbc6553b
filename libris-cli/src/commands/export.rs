//! Export command implementation

use crate::config::Config;
use anyhow::{bail, Context, Result};
use libris_core::library::now_millis;
use std::fs;
use std::path::PathBuf;

/// Write the whole library to a JSON file
pub fn export(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let library = config.open_library();
    if library.is_empty() {
        bail!("Nothing to export: the library is empty");
    }

    let output = output.unwrap_or_else(|| PathBuf::from(format!("library_{}.json", now_millis())));
    let json = library.export()?;
    fs::write(&output, json)
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;

    println!("Exported {} books to {}", library.len(), output.display());
    Ok(())
}
