//! External generative-AI service port
//!
//! The library only cares about the contract: metadata lookup may fail,
//! cover generation is best-effort, and author bios never fail (they fall
//! back to [`BIO_UNAVAILABLE`]).

mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};

use crate::error::ServiceError;
use crate::types::{Field, RawBook};
use async_trait::async_trait;
use serde_json::Value;

/// Returned by [`BookService::fetch_author_bio`] when no bio could be fetched
pub const BIO_UNAVAILABLE: &str = "Not available.";

/// Book details proposed by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub year: String,
    pub summary: String,
    pub tags: Vec<String>,

    /// Art direction for the cover image generator
    pub image_prompt: String,
}

impl BookMetadata {
    /// Build metadata from a loosely-typed JSON object.
    ///
    /// A response that names neither a title nor an author is rejected
    /// outright rather than half-filled.
    pub fn from_json(value: Value) -> Result<Self, ServiceError> {
        let image_prompt = value
            .get("imagePrompt")
            .or_else(|| value.get("image_prompt"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();

        let raw = RawBook::from_value(value).ok_or_else(|| {
            ServiceError::InvalidResponse("metadata is not a JSON object".to_string())
        })?;

        let title = raw.text(Field::Title);
        let author = raw.text(Field::Author);
        if title.is_none() && author.is_none() {
            return Err(ServiceError::InvalidResponse(
                "metadata has neither title nor author".to_string(),
            ));
        }

        Ok(Self {
            title: title.unwrap_or_default(),
            author: author.unwrap_or_default(),
            year: raw.text(Field::Year).unwrap_or_default(),
            summary: raw.text(Field::Summary).unwrap_or_default(),
            tags: raw.tags(),
            image_prompt,
        })
    }
}

/// The generative-AI capabilities the library consumes
#[async_trait]
pub trait BookService: Send + Sync {
    /// Look up details for a free-text query; fails on any network or
    /// service error
    async fn fetch_book_metadata(&self, query: &str) -> Result<BookMetadata, ServiceError>;

    /// Generate a cover as an inline `data:` URL. `Ok(None)` means the
    /// service produced no image, which is not an error.
    async fn generate_cover_image(
        &self,
        title: &str,
        author: &str,
        style: &str,
    ) -> Result<Option<String>, ServiceError>;

    /// Short literary biography, or [`BIO_UNAVAILABLE`]
    async fn fetch_author_bio(&self, name: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_from_full_response() {
        let metadata = BookMetadata::from_json(json!({
            "title": "Kindred",
            "author": "Octavia E. Butler",
            "year": 1979,
            "summary": "A time-travel novel.",
            "tags": ["Science Fiction", "Historical"],
            "imagePrompt": "sepia photograph, torn paper"
        }))
        .unwrap();
        assert_eq!(metadata.year, "1979");
        assert_eq!(metadata.tags.len(), 2);
        assert_eq!(metadata.image_prompt, "sepia photograph, torn paper");
    }

    #[test]
    fn test_metadata_without_names_is_rejected() {
        let err = BookMetadata::from_json(json!({"summary": "???"})).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)));
        assert!(BookMetadata::from_json(json!(["not", "an", "object"])).is_err());
    }
}
