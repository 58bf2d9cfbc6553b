//! AI search command implementation

use super::{confirm, display_reference, print_details, with_spinner};
use crate::config::Config;
use anyhow::{Context, Result};
use libris_core::{placeholder_cover, IngestionFlow, PreviewRecord};

fn print_preview(preview: &PreviewRecord) {
    let m = &preview.metadata;
    println!("Title:       {}", m.title);
    println!("Author:      {}", m.author);
    if !m.year.is_empty() {
        println!("Year:        {}", m.year);
    }
    if !m.tags.is_empty() {
        println!("Tags:        {}", m.tags.join(", "));
    }

    let cover = if !preview.drive_link.is_empty() {
        preview.drive_link.clone()
    } else if let Some(image) = &preview.cover_image {
        display_reference(image)
    } else {
        format!("{} (no image generated)", placeholder_cover(&m.title))
    };
    println!("Cover:       {}", cover);

    if !m.summary.is_empty() {
        println!();
        println!("{}", m.summary);
    }
}

/// Look a book up with the AI service, preview it, and add it on confirmation
pub async fn search(
    config: &Config,
    query: &str,
    drive: Option<&str>,
    regenerate: u32,
    yes: bool,
) -> Result<()> {
    let flow = IngestionFlow::new(config.service()?).with_timeout(config.timeout);

    let mut preview = with_spinner(format!("Searching for {:?}", query), flow.search(query))
        .await
        .context("Search failed")?;

    for attempt in 1..=regenerate {
        match with_spinner(
            format!("Generating cover {}/{}", attempt, regenerate),
            flow.regenerate_cover(),
        )
        .await
        {
            Ok(updated) => preview = updated,
            Err(e) => {
                tracing::warn!("Cover regeneration failed, keeping the previous cover: {}", e);
                break;
            }
        }
    }

    if let Some(link) = drive {
        flow.set_drive_link(link)?;
        preview.drive_link = link.trim().to_string();
    }

    print_preview(&preview);
    println!();

    if !yes && !confirm("Add this book to your library?")? {
        flow.discard();
        println!("Discarded");
        return Ok(());
    }

    let mut library = config.open_library();
    let book = flow.commit(&mut library).context("Failed to save book")?;

    println!("Added to your library:\n");
    print_details(&book);
    Ok(())
}
