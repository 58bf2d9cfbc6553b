//! CLI command implementations

mod add;
mod bio;
mod cover;
mod delete;
mod edit;
mod export;
mod import;
mod list;
mod rate;
mod search;
mod show;
mod status;
mod theme;

pub use add::add;
pub use bio::bio;
pub use cover::cover;
pub use delete::delete;
pub use edit::edit;
pub use export::export;
pub use import::import;
pub use list::list;
pub use rate::rate;
pub use search::search;
pub use show::show;
pub use status::status;
pub use theme::{theme, ThemeChoice};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use libris_core::types::MAX_RATING;
use libris_core::{resolve_cover_source, Book};
use std::future::Future;
use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Book details accepted by `add` and `edit`
#[derive(Args, Debug, Default)]
pub struct BookFields {
    /// Title
    #[arg(long)]
    pub title: Option<String>,

    /// Author
    #[arg(long)]
    pub author: Option<String>,

    /// Publication year
    #[arg(long)]
    pub year: Option<String>,

    /// Short summary
    #[arg(long)]
    pub summary: Option<String>,

    /// Tag (repeat for several)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Cover image URL (an empty value clears it)
    #[arg(long, value_name = "URL")]
    pub cover: Option<String>,

    /// External image link, wins over the cover (an empty value clears it)
    #[arg(long, value_name = "URL")]
    pub drive: Option<String>,
}

/// Ask a yes/no question on stdin; anything but "y"/"yes" declines
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Run `task` behind a spinner; the UI stays "busy" until it resolves
pub(crate) async fn with_spinner<T>(message: String, task: impl Future<Output = T>) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let output = task.await;
    spinner.finish_and_clear();
    output
}

/// Look a book up or fail with a readable message
pub(crate) fn find<'a>(books: &'a [Book], id: &str) -> Result<&'a Book> {
    books
        .iter()
        .find(|b| b.id == id)
        .with_context(|| format!("No book with id {}", id))
}

pub(crate) fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(MAX_RATING));
    format!(
        "{}{}",
        "★".repeat(filled),
        "☆".repeat(usize::from(MAX_RATING) - filled)
    )
}

/// One-line listing entry
pub(crate) fn print_summary(book: &Book) {
    println!(
        "{}  {:<12}  {}  {} by {}",
        book.id,
        book.status.label(),
        stars(book.rating),
        book.title,
        book.author
    );
}

/// Every field of a book
pub(crate) fn print_details(book: &Book) {
    println!("Id:          {}", book.id);
    println!("Title:       {}", book.title);
    println!("Author:      {}", book.author);
    if !book.year.is_empty() {
        println!("Year:        {}", book.year);
    }
    println!("Status:      {}", book.status.label());
    println!("Rating:      {}", stars(book.rating));
    if !book.tags.is_empty() {
        println!("Tags:        {}", book.tags.join(", "));
    }
    println!("Cover:       {}", display_reference(resolve_cover_source(book).url()));
    if let Some(added) = chrono::DateTime::from_timestamp_millis(book.date_added) {
        println!("Added:       {}", added.format("%Y-%m-%d %H:%M"));
    }
    if !book.summary.is_empty() {
        println!();
        println!("{}", book.summary);
    }
}

/// Shorten inline images so they do not flood the terminal
pub(crate) fn display_reference(url: &str) -> String {
    match url.split_once(',') {
        Some((header, data)) if url.starts_with("data:") => {
            format!("{},<{} bytes>", header, data.len())
        }
        _ => url.to_string(),
    }
}
