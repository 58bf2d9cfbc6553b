//! AI-assisted ingestion: search, preview, then commit or discard
//!
//! A search produces an uncommitted [`PreviewRecord`]. Nothing reaches the
//! library until [`IngestionFlow::commit`], which normalizes the preview
//! into a fresh book and adds it in one step.

use crate::error::{IngestError, ServiceError};
use crate::library::{now_millis, Library};
use crate::normalize::normalize_new;
use crate::service::{BookMetadata, BookService, BIO_UNAVAILABLE};
use crate::storage::KeyValueStore;
use crate::types::{Book, Field, RawBook};
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Default bound on each external-service call
pub const DEFAULT_SERVICE_TIMEOUT: Duration = Duration::from_secs(60);

/// A candidate book assembled from service output, not yet in the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRecord {
    pub metadata: BookMetadata,

    /// Most recently generated cover (`data:` URL), if any
    pub cover_image: Option<String>,

    /// User-supplied external image link for this book
    pub drive_link: String,
}

impl PreviewRecord {
    fn to_raw(&self) -> RawBook {
        let m = &self.metadata;
        RawBook::default()
            .with(Field::Title, m.title.clone())
            .with(Field::Author, m.author.clone())
            .with(Field::Year, m.year.clone())
            .with(Field::Summary, m.summary.clone())
            .with(
                Field::Tags,
                Value::Array(m.tags.iter().cloned().map(Value::String).collect()),
            )
            .with(Field::CoverUrl, self.cover_image.clone().unwrap_or_default())
            .with(Field::DriveUrl, self.drive_link.clone())
    }

    /// Normalize into a fresh book added at `now_ms`
    pub fn to_book(&self, now_ms: i64) -> Book {
        normalize_new(&self.to_raw(), now_ms)
    }
}

/// What the flow is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,

    /// A service request is in flight; new submissions are refused
    Searching,

    /// A preview is waiting for commit or discard
    Previewing,
}

/// Single-request-at-a-time ingestion over a [`BookService`]
pub struct IngestionFlow<B: BookService> {
    service: B,
    timeout: Duration,
    busy: AtomicBool,
    bio_busy: AtomicBool,
    preview: Mutex<Option<PreviewRecord>>,
}

/// Holds a busy flag for the duration of one request, releasing it even if
/// the request future is dropped mid-flight
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, IngestError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(flag))
            .map_err(|_| IngestError::Busy)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, ServiceError>>,
) -> Result<T, ServiceError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| ServiceError::Timeout(limit))?
}

impl<B: BookService> IngestionFlow<B> {
    pub fn new(service: B) -> Self {
        Self {
            service,
            timeout: DEFAULT_SERVICE_TIMEOUT,
            busy: AtomicBool::new(false),
            bio_busy: AtomicBool::new(false),
            preview: Mutex::new(None),
        }
    }

    /// Bound each service call; expiry counts as a service failure
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn service(&self) -> &B {
        &self.service
    }

    fn slot(&self) -> MutexGuard<'_, Option<PreviewRecord>> {
        self.preview.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> FlowState {
        if self.is_busy() {
            FlowState::Searching
        } else if self.slot().is_some() {
            FlowState::Previewing
        } else {
            FlowState::Idle
        }
    }

    /// Whether submissions should be disabled
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// The current preview, if any
    pub fn preview(&self) -> Option<PreviewRecord> {
        self.slot().clone()
    }

    /// Look up `query` and stage a preview.
    ///
    /// Any previous preview is dropped first. On failure the flow is left
    /// idle with no preview.
    pub async fn search(&self, query: &str) -> Result<PreviewRecord, IngestError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(IngestError::EmptyQuery);
        }

        let _busy = BusyGuard::acquire(&self.busy)?;
        self.slot().take();
        tracing::info!("Searching for {:?}", query);

        let result = self.fetch_preview(query).await;
        match &result {
            Ok(preview) => {
                tracing::info!(
                    "Staged preview {:?} by {:?}",
                    preview.metadata.title,
                    preview.metadata.author
                );
                *self.slot() = Some(preview.clone());
            }
            Err(e) => tracing::warn!("Search for {:?} failed: {}", query, e),
        }
        result
    }

    async fn fetch_preview(&self, query: &str) -> Result<PreviewRecord, IngestError> {
        let metadata = bounded(self.timeout, self.service.fetch_book_metadata(query)).await?;
        let cover_image = bounded(
            self.timeout,
            self.service
                .generate_cover_image(&metadata.title, &metadata.author, &metadata.image_prompt),
        )
        .await?;

        Ok(PreviewRecord {
            metadata,
            cover_image: cover_image.filter(|img| !img.is_empty()),
            drive_link: String::new(),
        })
    }

    /// Generate a new cover for the staged metadata, replacing the old one.
    ///
    /// On failure the existing preview is kept as it was.
    pub async fn regenerate_cover(&self) -> Result<PreviewRecord, IngestError> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        let metadata = self
            .slot()
            .as_ref()
            .map(|p| p.metadata.clone())
            .ok_or(IngestError::NoPreview)?;

        let cover_image = bounded(
            self.timeout,
            self.service
                .generate_cover_image(&metadata.title, &metadata.author, &metadata.image_prompt),
        )
        .await?;

        let mut slot = self.slot();
        // Discarded while the image was generating
        let preview = slot.as_mut().ok_or(IngestError::NoPreview)?;
        preview.cover_image = cover_image.filter(|img| !img.is_empty());
        Ok(preview.clone())
    }

    /// Attach (or clear, with an empty string) an external image link
    pub fn set_drive_link(&self, link: &str) -> Result<(), IngestError> {
        let mut slot = self.slot();
        let preview = slot.as_mut().ok_or(IngestError::NoPreview)?;
        preview.drive_link = link.trim().to_string();
        Ok(())
    }

    /// Drop the preview without touching the library
    pub fn discard(&self) {
        if self.slot().take().is_some() {
            tracing::debug!("Preview discarded");
        }
    }

    /// Normalize the preview into a fresh book and add it to `library`.
    ///
    /// If the library refuses the book the preview is put back so the user
    /// can retry.
    pub fn commit<S: KeyValueStore>(&self, library: &mut Library<S>) -> Result<Book, IngestError> {
        if self.is_busy() {
            return Err(IngestError::Busy);
        }

        let preview = self.slot().take().ok_or(IngestError::NoPreview)?;
        let book = preview.to_book(now_millis());

        match library.add(book.clone()) {
            Ok(()) => {
                tracing::info!("Committed {:?} as {}", book.title, book.id);
                Ok(book)
            }
            Err(e) => {
                *self.slot() = Some(preview);
                Err(e.into())
            }
        }
    }

    /// Fetch an author bio; service trouble yields [`BIO_UNAVAILABLE`]
    pub async fn author_bio(&self, name: &str) -> Result<String, IngestError> {
        let _busy = BusyGuard::acquire(&self.bio_busy)?;
        let bio = tokio::time::timeout(self.timeout, self.service.fetch_author_bio(name))
            .await
            .unwrap_or_else(|_| {
                tracing::warn!("Author bio lookup for {:?} timed out", name);
                BIO_UNAVAILABLE.to_string()
            });
        Ok(bio)
    }
}
