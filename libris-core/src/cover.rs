//! Cover resolution: which image represents a book

use crate::types::Book;
use regex::Regex;
use std::sync::OnceLock;

/// Direct-image endpoint for Google Drive file ids
const DRIVE_IMAGE_BASE: &str = "https://lh3.googleusercontent.com/u/0/d/";

/// Placeholder image service (400x600, indigo background, white text)
const PLACEHOLDER_BASE: &str = "https://placehold.co/400x600/4f46e5/ffffff?text=";

/// Hosts whose share links can be rewritten to a direct image
const DRIVE_HOSTS: [&str; 2] = ["drive.google.com", "docs.google.com"];

/// The image reference chosen for a book, tagged with the rule that chose it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverSource {
    /// From the user's external link (rewritten when a file id was found)
    Drive(String),

    /// The locally held cover
    Local(String),

    /// Generated from the title
    Placeholder(String),
}

impl CoverSource {
    pub fn url(&self) -> &str {
        match self {
            CoverSource::Drive(url) | CoverSource::Local(url) | CoverSource::Placeholder(url) => {
                url
            }
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, CoverSource::Placeholder(_))
    }
}

/// Pick the displayable image for a book.
///
/// External link first, then the local cover, then a title placeholder.
pub fn resolve_cover_source(book: &Book) -> CoverSource {
    let drive_url = book.drive_url.trim();
    if !drive_url.is_empty() {
        return CoverSource::Drive(direct_drive_link(drive_url));
    }

    let cover_url = book.cover_url.trim();
    if !cover_url.is_empty() {
        return CoverSource::Local(cover_url.to_string());
    }

    CoverSource::Placeholder(placeholder_cover(&book.title))
}

/// Placeholder image showing `title`; also the fallback when an image
/// fails to load
pub fn placeholder_cover(title: &str) -> String {
    format!("{}{}", PLACEHOLDER_BASE, urlencoding::encode(title))
}

/// Rewrite a Drive share link to a direct image URL, or return it unchanged
pub fn direct_drive_link(url: &str) -> String {
    match drive_file_id(url) {
        Some(id) => format!("{}{}", DRIVE_IMAGE_BASE, id),
        None => url.to_string(),
    }
}

/// Extract the file id from `/d/<id>` or `?id=<id>` Drive link shapes
pub fn drive_file_id(url: &str) -> Option<&str> {
    static PATH_ID: OnceLock<Regex> = OnceLock::new();
    static QUERY_ID: OnceLock<Regex> = OnceLock::new();

    if !DRIVE_HOSTS.iter().any(|host| url.contains(host)) {
        return None;
    }

    let path_id = PATH_ID.get_or_init(|| Regex::new(r"/d/([^/?#&]+)").expect("valid regex"));
    let query_id =
        QUERY_ID.get_or_init(|| Regex::new(r"[?&]id=([^&#]+)").expect("valid regex"));

    path_id
        .captures(url)
        .or_else(|| query_id.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
