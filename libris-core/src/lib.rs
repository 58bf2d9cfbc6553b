//! Libris Core Library
//!
//! The state machine behind a personal book tracker: the book record model
//! and its normalization rules, cover selection, a write-through Library
//! Store over a key-value port, import/export reconciliation, the reading
//! status cycle, and the AI-assisted ingestion flow.

pub mod cover;
pub mod error;
pub mod ingest;
pub mod library;
pub mod normalize;
pub mod service;
pub mod storage;
pub mod theme;
pub mod transfer;
pub mod types;

pub use cover::{placeholder_cover, resolve_cover_source, CoverSource};
pub use error::{IngestError, ImportError, LibraryError, Result, ServiceError, StorageError};
pub use ingest::{FlowState, IngestionFlow, PreviewRecord};
pub use library::{Library, LibraryEvent};
pub use normalize::{normalize, NewBook, Provenance};
pub use service::{BookMetadata, BookService, GeminiClient, GeminiConfig};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use theme::Theme;
pub use transfer::{export_json, parse_import, ImportReport};
pub use types::{Book, RawBook, ReadingStatus};
