//! Library Store behaviour against real and failing stores

use libris_core::error::{LibraryError, StorageError};
use libris_core::library::BOOKS_KEY;
use libris_core::storage::StorageResult;
use libris_core::{Book, FileStore, KeyValueStore, Library, MemoryStore, NewBook, ReadingStatus};
use tempfile::TempDir;

fn book(id: &str, date_added: i64) -> Book {
    Book {
        id: id.to_string(),
        ..Book::new(format!("Title {}", id), "Author", date_added)
    }
}

fn dates<S: KeyValueStore>(library: &Library<S>) -> Vec<i64> {
    library.books().iter().map(|b| b.date_added).collect()
}

/// Memory store whose writes can be switched off
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: bool,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes {
            return Err(StorageError::Backend("disk full".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.inner.remove(key)
    }
}

#[test]
fn test_newer_book_is_listed_first() {
    let mut library = Library::load(MemoryStore::new());
    library.add(book("first", 100)).unwrap();
    library.add(book("second", 200)).unwrap();

    assert_eq!(dates(&library), vec![200, 100]);
}

#[test]
fn test_ties_keep_a_stable_order() {
    let mut library = Library::load(MemoryStore::new());
    library
        .replace_all(vec![book("a", 5), book("b", 5), book("c", 9)])
        .unwrap();

    let ids: Vec<_> = library.books().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[test]
fn test_every_mutation_is_visible_after_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.json");

    let mut library = Library::load(FileStore::new(&path));
    let added = library
        .add_new(NewBook::new("Piranesi", "Susanna Clarke").with_tags(["Fantasy"]))
        .unwrap();
    library.add(book("other", 1)).unwrap();
    library.toggle_status(&added.id).unwrap();
    library.set_rating(&added.id, 5).unwrap();
    library.delete("other").unwrap();

    let reloaded = Library::load(FileStore::new(&path));
    assert_eq!(reloaded.books(), library.books());

    let stored = reloaded.get(&added.id).unwrap();
    assert_eq!(stored.status, ReadingStatus::Reading);
    assert_eq!(stored.rating, 5);
}

#[test]
fn test_failed_write_leaves_memory_untouched() {
    let mut seed = Library::load(MemoryStore::new());
    seed.add(book("a", 1)).unwrap();
    let snapshot = seed.store().get(BOOKS_KEY).unwrap().unwrap();

    let mut library = Library::load(FlakyStore {
        inner: MemoryStore::new().with_entry(BOOKS_KEY, snapshot),
        fail_writes: true,
    });
    assert_eq!(library.books(), seed.books());

    let err = library.add(book("b", 2)).unwrap_err();
    assert!(matches!(err, LibraryError::Storage(_)));
    assert!(library.toggle_status("a").is_err());
    assert!(library.delete("a").is_err());

    assert_eq!(library.len(), 1);
    assert_eq!(library.get("a").unwrap().status, ReadingStatus::WantToRead);
}

#[test]
fn test_unreadable_store_starts_empty_and_recovers() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.json");
    std::fs::write(&path, "\u{0}\u{0}garbage").unwrap();

    let mut library = Library::load(FileStore::new(&path));
    assert!(library.is_empty());

    library.add(book("a", 1)).unwrap();
    assert_eq!(Library::load(FileStore::new(&path)).len(), 1);
}

#[test]
fn test_drive_link_clears_cover_on_direct_add() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.json");

    let mut library = Library::load(FileStore::new(&path));
    library
        .add(Book {
            cover_url: "data:image/png;base64,AAAA".to_string(),
            drive_url: "https://drive.google.com/file/d/XYZ123/view".to_string(),
            rating: 8,
            ..book("a", 1)
        })
        .unwrap();

    for reloaded in [library.get("a").cloned(), Library::load(FileStore::new(&path)).get("a").cloned()] {
        let stored = reloaded.unwrap();
        assert!(stored.cover_url.is_empty());
        assert_eq!(stored.drive_url, "https://drive.google.com/file/d/XYZ123/view");
        assert_eq!(stored.rating, 5);
    }
}

#[test]
fn test_filters_are_read_only_views() {
    let mut library = Library::load(MemoryStore::new());
    library.add(book("a", 1).with_tags(["Essays"])).unwrap();
    library.add(book("b", 2).with_tags(["essays", "Memoir"])).unwrap();
    library.set_status("a", ReadingStatus::Abandoned).unwrap();

    assert_eq!(library.by_tag("ESSAYS").len(), 2);
    assert_eq!(library.by_tag("memoir").len(), 1);
    assert_eq!(library.by_status(ReadingStatus::Abandoned).len(), 1);
    assert_eq!(library.by_status(ReadingStatus::Read).len(), 0);
    assert_eq!(library.len(), 2);
}
