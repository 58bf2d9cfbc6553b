//! The Library Store: the authoritative book collection
//!
//! All mutations are pure transforms over a copy of the current collection
//! that end in [`Library::replace_all`], which persists first and only then
//! swaps the in-memory state. A caller that gets `Ok` back can rely on the
//! snapshot already matching memory.

use crate::error::{LibraryError, Result};
use crate::normalize::NewBook;
use crate::storage::KeyValueStore;
use crate::types::{dedup_tags, Book, ReadingStatus, MAX_RATING};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::broadcast;

/// Store slot holding the serialized collection
pub const BOOKS_KEY: &str = "libris.books";

/// Version written into every snapshot
pub const SCHEMA_VERSION: u32 = 1;

/// Current time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Persisted form of the collection
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    schema_version: u32,
    books: &'a [Book],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    #[serde(default)]
    schema_version: u32,
    books: Vec<Book>,
}

/// Snapshots written before versioning were a bare array of books
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredSnapshot {
    Versioned(Snapshot),
    Legacy(Vec<Book>),
}

/// Change notifications, sent after the snapshot has been written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryEvent {
    /// The collection was replaced wholesale
    Replaced { count: usize },

    BookAdded { id: String, title: String },

    BookUpdated { id: String },

    BookDeleted { id: String },

    /// An import committed `added` new books
    Imported { added: usize },
}

/// In-memory collection kept in lockstep with a key-value store
pub struct Library<S: KeyValueStore> {
    store: S,
    books: Vec<Book>,
    events: broadcast::Sender<LibraryEvent>,
}

impl<S: KeyValueStore> Library<S> {
    /// Load the collection from `store`.
    ///
    /// A missing or unreadable snapshot yields an empty library; the
    /// problem is logged, never returned.
    pub fn load(store: S) -> Self {
        let books = match store.get(BOOKS_KEY) {
            Ok(Some(data)) => parse_snapshot(&data),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read library snapshot, starting empty: {}", e);
                Vec::new()
            }
        };

        let mut books = unique_by_id(books);
        books.iter_mut().for_each(Book::canonicalize);
        sort_newest_first(&mut books);
        tracing::debug!("Loaded library with {} books", books.len());

        let (events, _) = broadcast::channel(64);
        Self {
            store,
            books,
            events,
        }
    }

    /// Replace the whole collection.
    ///
    /// Sorts by `date_added` descending (stable for ties), writes the
    /// snapshot, then updates memory. Fails without side effects when the
    /// books contain a repeated id or the write fails.
    pub fn replace_all(&mut self, books: Vec<Book>) -> Result<()> {
        let count = books.len();
        self.commit(books, LibraryEvent::Replaced { count })
    }

    /// Canonicalize, check ids, sort, persist, then swap memory and notify
    pub(crate) fn commit(&mut self, mut books: Vec<Book>, event: LibraryEvent) -> Result<()> {
        books.iter_mut().for_each(Book::canonicalize);

        let mut seen = HashSet::with_capacity(books.len());
        if let Some(dup) = books.iter().find(|b| !seen.insert(b.id.as_str())) {
            return Err(LibraryError::DuplicateId(dup.id.clone()));
        }

        sort_newest_first(&mut books);

        let data = serde_json::to_string(&SnapshotRef {
            schema_version: SCHEMA_VERSION,
            books: &books,
        })?;
        self.store.set(BOOKS_KEY, &data)?;
        tracing::debug!("Persisted {} books ({} bytes)", books.len(), data.len());

        self.books = books;
        // No subscribers is fine
        let _ = self.events.send(event);
        Ok(())
    }

    /// Add a book, canonicalized first
    pub fn add(&mut self, mut book: Book) -> Result<()> {
        book.canonicalize();
        if self.get(&book.id).is_some() {
            return Err(LibraryError::DuplicateId(book.id));
        }

        let event = LibraryEvent::BookAdded {
            id: book.id.clone(),
            title: book.title.clone(),
        };
        let mut books = Vec::with_capacity(self.books.len() + 1);
        books.push(book);
        books.extend(self.books.iter().cloned());
        self.commit(books, event)
    }

    /// Normalize a manually entered book, add it, and return it
    pub fn add_new(&mut self, new: NewBook) -> Result<Book> {
        let mut book = new.build(now_millis());
        book.canonicalize();
        self.add(book.clone())?;
        Ok(book)
    }

    /// Replace the stored record with the same id.
    ///
    /// `id` and `date_added` are immutable and kept from the stored record.
    /// Blank names fall back to the defaults and a non-empty drive link
    /// clears the local cover.
    pub fn update(&mut self, book: Book) -> Result<Book> {
        if book.rating > MAX_RATING {
            return Err(LibraryError::InvalidRating(book.rating));
        }

        let id = book.id.clone();
        self.modify(&id, LibraryEvent::BookUpdated { id: id.clone() }, |stored| {
            let date_added = stored.date_added;
            *stored = Book { date_added, ..book };
        })
    }

    /// Remove a book. Confirmation is the caller's job; this always deletes.
    pub fn delete(&mut self, id: &str) -> Result<Book> {
        let removed = self
            .get(id)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;

        let books = self.books.iter().filter(|b| b.id != id).cloned().collect();
        self.commit(books, LibraryEvent::BookDeleted { id: id.to_string() })?;
        Ok(removed)
    }

    pub fn set_status(&mut self, id: &str, status: ReadingStatus) -> Result<Book> {
        let event = LibraryEvent::BookUpdated { id: id.to_string() };
        self.modify(id, event, |book| book.status = status)
    }

    /// Advance a book one step through the reading cycle
    pub fn toggle_status(&mut self, id: &str) -> Result<ReadingStatus> {
        let event = LibraryEvent::BookUpdated { id: id.to_string() };
        let book = self.modify(id, event, |book| book.status = book.status.next())?;
        Ok(book.status)
    }

    pub fn set_rating(&mut self, id: &str, rating: u8) -> Result<Book> {
        if rating > MAX_RATING {
            return Err(LibraryError::InvalidRating(rating));
        }
        let event = LibraryEvent::BookUpdated { id: id.to_string() };
        self.modify(id, event, |book| book.rating = rating)
    }

    /// Apply `change` to a copy of one book and commit the new collection
    fn modify(
        &mut self,
        id: &str,
        event: LibraryEvent,
        change: impl FnOnce(&mut Book),
    ) -> Result<Book> {
        let mut books = self.books.clone();
        let book = books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
        change(book);
        book.canonicalize();
        let changed = book.clone();

        self.commit(books, event)?;
        Ok(changed)
    }

    /// All books, newest first
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn by_status(&self, status: ReadingStatus) -> Vec<&Book> {
        self.books.iter().filter(|b| b.status == status).collect()
    }

    pub fn by_tag(&self, tag: &str) -> Vec<&Book> {
        self.books.iter().filter(|b| b.has_tag(tag)).collect()
    }

    /// Books whose title or author contains `query` (case-insensitive)
    pub fn search(&self, query: &str) -> Vec<&Book> {
        self.books.iter().filter(|b| b.matches_text(query)).collect()
    }

    /// Every distinct tag in the collection, first spelling wins
    pub fn tags(&self) -> Vec<String> {
        dedup_tags(self.books.iter().flat_map(|b| b.tags.iter()))
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<LibraryEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn parse_snapshot(data: &str) -> Vec<Book> {
    match serde_json::from_str::<StoredSnapshot>(data) {
        Ok(StoredSnapshot::Versioned(snapshot)) => {
            if snapshot.schema_version > SCHEMA_VERSION {
                tracing::warn!(
                    "Snapshot schema version {} is newer than supported {}",
                    snapshot.schema_version,
                    SCHEMA_VERSION
                );
            }
            snapshot.books
        }
        Ok(StoredSnapshot::Legacy(books)) => books,
        Err(e) => {
            tracing::warn!("Discarding corrupt library snapshot: {}", e);
            Vec::new()
        }
    }
}

fn unique_by_id(books: Vec<Book>) -> Vec<Book> {
    let mut seen = HashSet::with_capacity(books.len());
    books
        .into_iter()
        .filter(|book| {
            let fresh = seen.insert(book.id.clone());
            if !fresh {
                tracing::warn!("Dropping duplicate book id {} from snapshot", book.id);
            }
            fresh
        })
        .collect()
}

fn sort_newest_first(books: &mut [Book]) {
    books.sort_by(|a, b| b.date_added.cmp(&a.date_added));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::{DEFAULT_AUTHOR, DEFAULT_TITLE};

    fn book(id: &str, date_added: i64) -> Book {
        Book {
            id: id.to_string(),
            ..Book::new(format!("Book {}", id), "Author", date_added)
        }
    }

    fn persisted_ids<S: KeyValueStore>(library: &Library<S>) -> Vec<String> {
        let data = library.store().get(BOOKS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
        value["books"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["id"].as_str().unwrap().to_string())
            .collect()
    }

    fn ids(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_empty_store_loads_empty_library() {
        let library = Library::load(MemoryStore::new());
        assert!(library.is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty_library() {
        let store = MemoryStore::new().with_entry(BOOKS_KEY, "{not json");
        assert!(Library::load(store).is_empty());

        let store = MemoryStore::new().with_entry(BOOKS_KEY, r#"{"books": 3}"#);
        assert!(Library::load(store).is_empty());
    }

    #[test]
    fn test_legacy_array_snapshot_loads() {
        let legacy = r#"[
            {"id":"a","title":"Old","author":"X","year":"","summary":"","tags":[],
             "coverUrl":"","status":"read","rating":3,"dateAdded":5}
        ]"#;
        let library = Library::load(MemoryStore::new().with_entry(BOOKS_KEY, legacy));
        assert_eq!(library.len(), 1);
        assert_eq!(library.books()[0].status, ReadingStatus::Read);
    }

    #[test]
    fn test_snapshot_duplicates_are_dropped_on_load() {
        let data = serde_json::to_string(&vec![book("a", 1), book("a", 2), book("b", 3)]).unwrap();
        let library = Library::load(MemoryStore::new().with_entry(BOOKS_KEY, data));
        assert_eq!(ids(library.books()), vec!["b", "a"]);
        assert_eq!(library.get("a").unwrap().date_added, 1);
    }

    #[test]
    fn test_add_orders_newest_first() {
        let mut library = Library::load(MemoryStore::new());
        library.add(book("old", 100)).unwrap();
        library.add(book("new", 200)).unwrap();

        assert_eq!(ids(library.books()), vec!["new", "old"]);
        assert_eq!(persisted_ids(&library), vec!["new", "old"]);

        library.add(book("older", 50)).unwrap();
        assert_eq!(ids(library.books()), vec!["new", "old", "older"]);
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut library = Library::load(MemoryStore::new());
        library.add(book("a", 1)).unwrap();
        let err = library.add(book("a", 2)).unwrap_err();
        assert!(matches!(err, LibraryError::DuplicateId(id) if id == "a"));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_replace_all_rejects_duplicates_without_writing() {
        let mut library = Library::load(MemoryStore::new());
        library.add(book("a", 1)).unwrap();
        assert!(library.replace_all(vec![book("x", 1), book("x", 2)]).is_err());
        assert_eq!(ids(library.books()), vec!["a"]);
        assert_eq!(persisted_ids(&library), vec!["a"]);
    }

    #[test]
    fn test_update_keeps_id_and_date_and_clears_cover() {
        let mut library = Library::load(MemoryStore::new());
        library
            .add(book("a", 10).with_cover("data:image/png;base64,AAAA"))
            .unwrap();

        let mut edited = library.get("a").unwrap().clone();
        edited.title = "Renamed".to_string();
        edited.date_added = 999;
        edited.drive_url = "https://drive.google.com/file/d/F/view".to_string();
        edited.tags = vec!["x".into(), "X".into()];
        library.update(edited).unwrap();

        let stored = library.get("a").unwrap();
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.date_added, 10);
        assert!(stored.cover_url.is_empty());
        assert_eq!(stored.tags, vec!["x"]);
    }

    #[test]
    fn test_update_with_blank_names_keeps_the_book_importable() {
        let mut library = Library::load(MemoryStore::new());
        library.add(book("a", 10)).unwrap();

        let mut edited = library.get("a").unwrap().clone();
        edited.title = String::new();
        edited.author = "   ".to_string();
        let stored = library.update(edited).unwrap();
        assert_eq!(stored.title, DEFAULT_TITLE);
        assert_eq!(stored.author, DEFAULT_AUTHOR);
        assert_eq!(library.get("a"), Some(&stored));

        let mut target = Library::load(MemoryStore::new());
        let report = target.import(&library.export().unwrap()).unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(target.books(), library.books());
    }

    #[test]
    fn test_every_write_path_enforces_cover_exclusivity_and_rating_range() {
        let mut library = Library::load(MemoryStore::new());
        library
            .add(Book {
                cover_url: "data:image/png;base64,AAAA".to_string(),
                drive_url: "https://drive.google.com/file/d/X/view".to_string(),
                ..book("added", 1)
            })
            .unwrap();
        let added = library.get("added").unwrap().clone();
        library
            .replace_all(vec![
                added,
                Book {
                    cover_url: "https://example.com/c.jpg".to_string(),
                    drive_url: "https://drive.google.com/file/d/Y/view".to_string(),
                    rating: 42,
                    ..book("replaced", 2)
                },
            ])
            .unwrap();

        for stored in library.books() {
            assert!(stored.cover_url.is_empty(), "{} kept its cover", stored.id);
            assert!(stored.rating <= MAX_RATING);
        }

        let reloaded = Library::load(library.store().clone());
        assert_eq!(reloaded.books(), library.books());
    }

    #[test]
    fn test_load_repairs_stored_records() {
        let legacy = r#"[
            {"id":"a","title":"  ","author":"","coverUrl":"data:image/png;base64,AAAA",
             "driveUrl":"https://drive.google.com/file/d/X/view","rating":9,"dateAdded":5}
        ]"#;
        let library = Library::load(MemoryStore::new().with_entry(BOOKS_KEY, legacy));

        let stored = library.get("a").unwrap();
        assert_eq!(stored.title, DEFAULT_TITLE);
        assert_eq!(stored.author, DEFAULT_AUTHOR);
        assert!(stored.cover_url.is_empty());
        assert_eq!(stored.rating, MAX_RATING);
    }

    #[test]
    fn test_update_unknown_book_fails() {
        let mut library = Library::load(MemoryStore::new());
        let err = library.update(book("ghost", 1)).unwrap_err();
        assert!(matches!(err, LibraryError::NotFound(_)));
    }

    #[test]
    fn test_delete_removes_from_memory_and_snapshot() {
        let mut library = Library::load(MemoryStore::new());
        library.add(book("a", 1)).unwrap();
        library.add(book("b", 2)).unwrap();

        let removed = library.delete("a").unwrap();
        assert_eq!(removed.id, "a");
        assert_eq!(ids(library.books()), vec!["b"]);
        assert_eq!(persisted_ids(&library), vec!["b"]);

        assert!(matches!(library.delete("a"), Err(LibraryError::NotFound(_))));
    }

    #[test]
    fn test_toggle_status_walks_the_cycle() {
        let mut library = Library::load(MemoryStore::new());
        library.add(book("a", 1)).unwrap();

        let seen: Vec<_> = (0..5).map(|_| library.toggle_status("a").unwrap()).collect();
        assert_eq!(
            seen,
            vec![
                ReadingStatus::Reading,
                ReadingStatus::Read,
                ReadingStatus::ReReading,
                ReadingStatus::Abandoned,
                ReadingStatus::WantToRead,
            ]
        );
    }

    #[test]
    fn test_rating_is_independent_of_status() {
        let mut library = Library::load(MemoryStore::new());
        library.add(book("a", 1)).unwrap();

        library.set_rating("a", 4).unwrap();
        library.set_status("a", ReadingStatus::Abandoned).unwrap();
        assert_eq!(library.get("a").unwrap().rating, 4);

        assert!(matches!(
            library.set_rating("a", 6),
            Err(LibraryError::InvalidRating(6))
        ));
        assert_eq!(library.get("a").unwrap().rating, 4);
    }

    #[test]
    fn test_filters_do_not_touch_the_store() {
        let mut library = Library::load(MemoryStore::new());
        library.add(book("a", 1).with_tags(["Poetry"])).unwrap();
        library.add(book("b", 2)).unwrap();
        library.set_status("b", ReadingStatus::Read).unwrap();
        let before = library.store().get(BOOKS_KEY).unwrap();

        assert_eq!(library.by_tag("poetry").len(), 1);
        assert_eq!(library.by_status(ReadingStatus::Read)[0].id, "b");
        assert_eq!(library.search("book A").len(), 1);
        assert_eq!(library.tags(), vec!["Poetry"]);
        assert_eq!(library.store().get(BOOKS_KEY).unwrap(), before);
    }

    #[test]
    fn test_events_follow_successful_writes() {
        let mut library = Library::load(MemoryStore::new());
        let mut rx = library.subscribe();

        library.add(book("a", 1)).unwrap();
        library.delete("a").unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            LibraryEvent::BookAdded {
                id: "a".into(),
                title: "Book a".into()
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            LibraryEvent::BookDeleted { id: "a".into() }
        );
        assert!(rx.try_recv().is_err());
    }
}
