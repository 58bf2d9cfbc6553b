//! Libris CLI - personal book library tracker

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use libris_core::ReadingStatus;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse a rating argument (0 clears, 1-5 stars)
fn parse_rating(s: &str) -> Result<u8, String> {
    let n: u8 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n > libris_core::types::MAX_RATING {
        Err("rating must be between 0 and 5".to_string())
    } else {
        Ok(n)
    }
}

#[derive(Parser)]
#[command(name = "libris")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the library (defaults to the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List books, newest first
    List {
        /// Only books with this status
        #[arg(long)]
        status: Option<ReadingStatus>,

        /// Only books with this tag
        #[arg(long)]
        tag: Option<String>,

        /// Only books whose title or author contains this text
        #[arg(long)]
        search: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one book in full
    Show {
        /// Book id
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a book by hand
    Add {
        #[command(flatten)]
        fields: commands::BookFields,
    },

    /// Edit a book's details
    Edit {
        /// Book id
        id: String,

        #[command(flatten)]
        fields: commands::BookFields,
    },

    /// Delete a book
    Delete {
        /// Book id
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Advance a book to its next reading status, or set one directly
    Status {
        /// Book id
        id: String,

        /// Status to set (want-to-read, reading, read, re-reading, abandoned)
        #[arg(long)]
        set: Option<ReadingStatus>,
    },

    /// Rate a book from 0 (unrated) to 5
    Rate {
        /// Book id
        id: String,

        /// Stars
        #[arg(value_parser = parse_rating)]
        rating: u8,
    },

    /// Merge books from an exported JSON file
    Import {
        /// Input file path
        input: PathBuf,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Write the library to a JSON file
    Export {
        /// Output file path (defaults to library_<timestamp>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Look a book up with the AI service and add it
    Search {
        /// Title, author or any description of the book
        query: String,

        /// External image link to use as the cover
        #[arg(long, value_name = "URL")]
        drive: Option<String>,

        /// Generate this many replacement covers before deciding
        #[arg(long, default_value = "0")]
        regenerate: u32,

        /// Add without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Short biography of an author
    Bio {
        /// Author name
        author: String,
    },

    /// Show which image represents a book
    Cover {
        /// Book id
        id: String,

        /// Fall back to the placeholder when the image reference is unusable
        #[arg(long)]
        check: bool,
    },

    /// Show or change the display theme
    Theme {
        /// dark, light or toggle
        choice: Option<commands::ThemeChoice>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "libris_cli=debug,libris_core=debug"
    } else {
        "libris_cli=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::resolve(cli.data_dir)?;

    match cli.command {
        Commands::List {
            status,
            tag,
            search,
            json,
        } => commands::list(&config, status, tag.as_deref(), search.as_deref(), json),

        Commands::Show { id, json } => commands::show(&config, &id, json),

        Commands::Add { fields } => commands::add(&config, fields),

        Commands::Edit { id, fields } => commands::edit(&config, &id, fields),

        Commands::Delete { id, yes } => commands::delete(&config, &id, yes),

        Commands::Status { id, set } => commands::status(&config, &id, set),

        Commands::Rate { id, rating } => commands::rate(&config, &id, rating),

        Commands::Import { input, yes } => commands::import(&config, &input, yes),

        Commands::Export { output } => commands::export(&config, output),

        Commands::Search {
            query,
            drive,
            regenerate,
            yes,
        } => commands::search(&config, &query, drive.as_deref(), regenerate, yes).await,

        Commands::Bio { author } => commands::bio(&config, &author).await,

        Commands::Cover { id, check } => commands::cover(&config, &id, check),

        Commands::Theme { choice } => commands::theme(&config, choice),
    }
}
