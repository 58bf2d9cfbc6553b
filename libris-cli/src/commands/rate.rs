//! Rate command implementation

use super::stars;
use crate::config::Config;
use anyhow::Result;

/// Set a book's star rating
pub fn rate(config: &Config, id: &str, rating: u8) -> Result<()> {
    let mut library = config.open_library();
    let book = library.set_rating(id, rating)?;

    println!("{}: {}", book.title, stars(book.rating));
    Ok(())
}
