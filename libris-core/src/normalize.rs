//! Normalization of incoming records into canonical [`Book`]s
//!
//! Every path that creates a book (manual entry, AI preview commit,
//! import) goes through here, so defaults and the cover exclusivity rule
//! are applied in exactly one place.

use crate::types::{Book, Field, RawBook, ReadingStatus, DEFAULT_AUTHOR, DEFAULT_TITLE};
use serde_json::Value;

/// Where a candidate record comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// A brand-new book: manual entry or a committed AI preview.
    /// Status, rating and date are always reset.
    Fresh,

    /// A record from an import document. Valid status, rating and date
    /// values are preserved.
    Imported,
}

/// Generate a new book identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Normalize a raw record.
///
/// Returns `None` only for imported records that carry neither a title nor
/// an author; fresh records always produce a book.
pub fn normalize(raw: &RawBook, provenance: Provenance, now_ms: i64) -> Option<Book> {
    match provenance {
        Provenance::Fresh => Some(normalize_new(raw, now_ms)),
        Provenance::Imported => normalize_imported(raw, now_ms),
    }
}

/// Normalize a brand-new book
pub fn normalize_new(raw: &RawBook, now_ms: i64) -> Book {
    let mut book = base(raw);
    book.date_added = now_ms;
    book
}

/// Normalize an imported record, or reject it when it has neither a title
/// nor an author
pub fn normalize_imported(raw: &RawBook, now_ms: i64) -> Option<Book> {
    if raw.text(Field::Title).is_none() && raw.text(Field::Author).is_none() {
        return None;
    }

    let mut book = base(raw);
    book.status = raw.status().unwrap_or_default();
    book.rating = raw.rating().unwrap_or(0);
    book.date_added = raw.timestamp(Field::DateAdded).unwrap_or(now_ms);
    Some(book)
}

fn base(raw: &RawBook) -> Book {
    let mut book = Book {
        id: raw.text(Field::Id).unwrap_or_else(new_id),
        title: raw
            .text(Field::Title)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        author: raw
            .text(Field::Author)
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        year: raw.text(Field::Year).unwrap_or_default(),
        summary: raw.text(Field::Summary).unwrap_or_default(),
        tags: raw.tags(),
        cover_url: raw.text(Field::CoverUrl).unwrap_or_default(),
        drive_url: raw.text(Field::DriveUrl).unwrap_or_default(),
        status: ReadingStatus::WantToRead,
        rating: 0,
        date_added: 0,
    };
    book.clear_redundant_cover();
    book
}

/// A book typed in by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub cover_url: String,
    pub drive_url: String,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Self::default()
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cover(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = cover_url.into();
        self
    }

    pub fn with_drive_link(mut self, drive_url: impl Into<String>) -> Self {
        self.drive_url = drive_url.into();
        self
    }

    /// Normalize into a fresh book added at `now_ms`
    pub fn build(self, now_ms: i64) -> Book {
        normalize_new(&RawBook::from(self), now_ms)
    }
}

impl From<NewBook> for RawBook {
    fn from(new: NewBook) -> Self {
        RawBook::default()
            .with(Field::Title, new.title)
            .with(Field::Author, new.author)
            .with(Field::Year, new.year)
            .with(Field::Summary, new.summary)
            .with(
                Field::Tags,
                Value::Array(new.tags.into_iter().map(Value::String).collect()),
            )
            .with(Field::CoverUrl, new.cover_url)
            .with(Field::DriveUrl, new.drive_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawBook {
        RawBook::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let book = normalize_imported(&raw(json!({"title": "Solaris"})), 99).unwrap();
        assert_eq!(book.title, "Solaris");
        assert_eq!(book.author, DEFAULT_AUTHOR);
        assert!(book.year.is_empty());
        assert!(book.tags.is_empty());
        assert_eq!(book.status, ReadingStatus::WantToRead);
        assert_eq!(book.rating, 0);
        assert_eq!(book.date_added, 99);
        assert!(!book.id.is_empty());
    }

    #[test]
    fn test_author_only_record_gets_default_title() {
        let book = normalize_imported(&raw(json!({"author": "Stanisław Lem"})), 1).unwrap();
        assert_eq!(book.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_record_without_title_and_author_is_excluded() {
        assert!(normalize_imported(&raw(json!({"year": "1961", "rating": 5})), 1).is_none());
        assert!(normalize_imported(&raw(json!({"title": "", "author": "  "})), 1).is_none());
    }

    #[test]
    fn test_import_preserves_valid_status_and_rating() {
        let book = normalize_imported(
            &raw(json!({
                "id": "keep-me",
                "title": "Solaris",
                "status": "re-reading",
                "rating": 4,
                "dateAdded": 1234
            })),
            99,
        )
        .unwrap();
        assert_eq!(book.id, "keep-me");
        assert_eq!(book.status, ReadingStatus::ReReading);
        assert_eq!(book.rating, 4);
        assert_eq!(book.date_added, 1234);
    }

    #[test]
    fn test_import_defaults_invalid_status() {
        let book =
            normalize_imported(&raw(json!({"title": "Solaris", "status": "finished"})), 1).unwrap();
        assert_eq!(book.status, ReadingStatus::WantToRead);
    }

    #[test]
    fn test_fresh_books_reset_lifecycle_fields() {
        let staged = raw(json!({
            "title": "Solaris",
            "status": "read",
            "rating": 5,
            "dateAdded": 1
        }));
        let book = normalize(&staged, Provenance::Fresh, 500).unwrap();
        assert_eq!(book.status, ReadingStatus::WantToRead);
        assert_eq!(book.rating, 0);
        assert_eq!(book.date_added, 500);
    }

    #[test]
    fn test_fresh_book_without_names_uses_defaults() {
        let book = normalize_new(&RawBook::default(), 1);
        assert_eq!(book.title, DEFAULT_TITLE);
        assert_eq!(book.author, DEFAULT_AUTHOR);
    }

    #[test]
    fn test_drive_link_clears_cover() {
        let book = normalize_imported(
            &raw(json!({
                "title": "Solaris",
                "coverUrl": "data:image/png;base64,AAAA",
                "driveUrl": "https://drive.google.com/open?id=XYZ"
            })),
            1,
        )
        .unwrap();
        assert!(book.cover_url.is_empty());
        assert_eq!(book.drive_url, "https://drive.google.com/open?id=XYZ");
    }

    #[test]
    fn test_new_book_builds_through_normalization() {
        let book = NewBook::new("  Solaris ", "Stanisław Lem")
            .with_year("1961")
            .with_tags(["SF", "sf", "Classic"])
            .with_cover("https://example.com/c.jpg")
            .build(10);
        assert_eq!(book.title, "Solaris");
        assert_eq!(book.tags, vec!["SF", "Classic"]);
        assert_eq!(book.cover_url, "https://example.com/c.jpg");
        assert_eq!(book.date_added, 10);
    }
}
