//! Cover command implementation

use super::find;
use crate::config::Config;
use anyhow::Result;
use libris_core::{placeholder_cover, resolve_cover_source, CoverSource};

/// Whether an image reference looks loadable at all
fn is_usable(url: &str) -> bool {
    if let Some(rest) = url.strip_prefix("data:") {
        return rest.starts_with("image/")
            && rest
                .split_once(";base64,")
                .is_some_and(|(_, data)| !data.is_empty());
    }
    url.starts_with("https://") || url.starts_with("http://")
}

/// Print the image reference that represents a book
pub fn cover(config: &Config, id: &str, check: bool) -> Result<()> {
    let library = config.open_library();
    let book = find(library.books(), id)?;

    let source = resolve_cover_source(book);
    let (rule, url) = match &source {
        CoverSource::Drive(url) => ("external link", url.clone()),
        CoverSource::Local(url) => ("stored cover", url.clone()),
        CoverSource::Placeholder(url) => ("placeholder", url.clone()),
    };

    if check && !is_usable(&url) {
        tracing::warn!("Cover for {:?} is unusable, using placeholder", book.title);
        println!("placeholder\t{}", placeholder_cover(&book.title));
        return Ok(());
    }

    println!("{}\t{}", rule, url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_references() {
        assert!(is_usable("https://lh3.googleusercontent.com/u/0/d/XYZ123"));
        assert!(is_usable("data:image/png;base64,iVBORw0KGgo="));
        assert!(!is_usable("data:image/png;base64,"));
        assert!(!is_usable("data:text/html;base64,PGgxPg=="));
        assert!(!is_usable("my-cover.jpg"));
    }
}
