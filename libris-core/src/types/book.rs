//! The Book record - the one entity the library tracks

use super::{dedup_tags, ReadingStatus};
use serde::{Deserialize, Serialize};

/// Title used when a record arrives without one
pub const DEFAULT_TITLE: &str = "Untitled";

/// Author used when a record arrives without one
pub const DEFAULT_AUTHOR: &str = "Unknown author";

/// Highest rating a book can carry; 0 means unrated
pub const MAX_RATING: u8 = 5;

/// A catalogued book
///
/// Field names serialize in camelCase so snapshots and exports stay
/// readable by any other tool speaking the same document shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Opaque unique identifier, never reassigned
    pub id: String,

    pub title: String,

    pub author: String,

    /// Free-form publication year (not necessarily numeric)
    #[serde(default)]
    pub year: String,

    #[serde(default)]
    pub summary: String,

    /// Category tags in insertion order
    #[serde(default)]
    pub tags: Vec<String>,

    /// Locally held image: inline `data:` URL, remote URL, or empty
    #[serde(default)]
    pub cover_url: String,

    /// User-supplied external image link; wins over `cover_url`
    #[serde(default)]
    pub drive_url: String,

    #[serde(default)]
    pub status: ReadingStatus,

    /// 0 (unrated) through 5
    #[serde(default)]
    pub rating: u8,

    /// Epoch milliseconds, set once at creation
    #[serde(default)]
    pub date_added: i64,
}

impl Book {
    /// Create a brand-new book added at `date_added`
    pub fn new(title: impl Into<String>, author: impl Into<String>, date_added: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            author: author.into(),
            year: String::new(),
            summary: String::new(),
            tags: Vec::new(),
            cover_url: String::new(),
            drive_url: String::new(),
            status: ReadingStatus::WantToRead,
            rating: 0,
            date_added,
        }
    }

    /// Set the tags
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the local cover image
    pub fn with_cover(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = cover_url.into();
        self.clear_redundant_cover();
        self
    }

    /// Set the external image link (clears the local cover)
    pub fn with_drive_link(mut self, drive_url: impl Into<String>) -> Self {
        self.drive_url = drive_url.into();
        self.clear_redundant_cover();
        self
    }

    /// Drop the local cover when an external link is present.
    ///
    /// The two are never both the effective source: `drive_url` wins.
    pub fn clear_redundant_cover(&mut self) {
        if !self.drive_url.trim().is_empty() {
            self.cover_url.clear();
        }
    }

    /// Restore the record invariants after free-form edits.
    ///
    /// Blank names fall back to the defaults and the rating is clamped.
    pub fn canonicalize(&mut self) {
        for field in [
            &mut self.title,
            &mut self.author,
            &mut self.year,
            &mut self.summary,
            &mut self.cover_url,
            &mut self.drive_url,
        ] {
            *field = field.trim().to_string();
        }
        if self.title.is_empty() {
            self.title = DEFAULT_TITLE.to_string();
        }
        if self.author.is_empty() {
            self.author = DEFAULT_AUTHOR.to_string();
        }
        self.tags = dedup_tags(&self.tags);
        self.rating = self.rating.min(MAX_RATING);
        self.clear_redundant_cover();
    }

    /// Case-insensitive tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.trim().to_lowercase();
        self.tags.iter().any(|t| t.trim().to_lowercase() == wanted)
    }

    /// Case-insensitive substring match on title or author
    pub fn matches_text(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.title.to_lowercase().contains(&query) || self.author.to_lowercase().contains(&query)
    }
}
