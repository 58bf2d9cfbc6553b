//! Gemini `generateContent` REST client

use super::{BookMetadata, BookService, BIO_UNAVAILABLE};
use crate::error::ServiceError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for [`GeminiClient`]
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// [`BookService`] backed by the Gemini API
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ServiceError> {
        if config.api_key.trim().is_empty() {
            return Err(ServiceError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("libris/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    async fn generate(&self, model: &str, body: Value) -> Result<GenerateContentResponse, ServiceError> {
        let url = format!("{}/models/{}:generateContent", self.config.base_url, model);
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                code: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout(self.config.timeout)
        } else {
            ServiceError::Http(e)
        }
    }
}

#[async_trait]
impl BookService for GeminiClient {
    async fn fetch_book_metadata(&self, query: &str) -> Result<BookMetadata, ServiceError> {
        let response = self
            .generate(&self.config.text_model, metadata_request(query))
            .await?;
        let text = response
            .text()
            .ok_or_else(|| ServiceError::InvalidResponse("empty metadata response".to_string()))?;
        parse_metadata(&text)
    }

    async fn generate_cover_image(
        &self,
        title: &str,
        author: &str,
        style: &str,
    ) -> Result<Option<String>, ServiceError> {
        let response = self
            .generate(&self.config.image_model, cover_request(title, author, style))
            .await?;
        Ok(response.inline_image())
    }

    async fn fetch_author_bio(&self, name: &str) -> String {
        match self.generate(&self.config.text_model, bio_request(name)).await {
            Ok(response) => response.text().unwrap_or_else(|| BIO_UNAVAILABLE.to_string()),
            Err(e) => {
                tracing::warn!("Author bio lookup for {:?} failed: {}", name, e);
                BIO_UNAVAILABLE.to_string()
            }
        }
    }
}

fn metadata_request(query: &str) -> Value {
    json!({
        "contents": [{
            "parts": [{
                "text": format!(
                    "Find details for the book \"{}\". Return JSON with: title, author, year, summary, tags, imagePrompt.",
                    query
                )
            }]
        }],
        "tools": [{ "google_search": {} }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING" },
                    "author": { "type": "STRING" },
                    "year": { "type": "STRING" },
                    "summary": { "type": "STRING" },
                    "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "imagePrompt": { "type": "STRING" }
                },
                "required": ["title", "author", "year", "summary", "tags", "imagePrompt"]
            }
        }
    })
}

fn cover_prompt(title: &str, author: &str, style: &str) -> String {
    format!(
        "A professional book cover for \"{title}\" by {author}. \
         The cover MUST clearly display the title \"{title}\" and the author name \"{author}\" \
         in elegant, readable typography. Style: {style}. \
         High quality graphic design, cinematic lighting."
    )
}

fn cover_request(title: &str, author: &str, style: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": cover_prompt(title, author, style) }] }],
        "generationConfig": { "imageConfig": { "aspectRatio": "2:3" } }
    })
}

fn bio_request(name: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": format!("A short literary biography of {}.", name) }] }],
        "tools": [{ "google_search": {} }]
    })
}

/// Parse the metadata JSON the text model returns, tolerating a Markdown
/// code fence around it
fn parse_metadata(text: &str) -> Result<BookMetadata, ServiceError> {
    let body = strip_code_fence(text);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ServiceError::InvalidResponse(format!("metadata is not JSON: {}", e)))?;
    BookMetadata::from_json(value)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|content| content.parts.iter())
    }

    /// Concatenated text parts of the first candidate, if any
    fn text(&self) -> Option<String> {
        let text: String = self.parts().filter_map(|p| p.text.as_deref()).collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// First inline image of the first candidate as a `data:` URL
    fn inline_image(&self) -> Option<String> {
        self.parts()
            .find_map(|p| p.inline_data.as_ref())
            .filter(|img| !img.data.is_empty())
            .map(|img| format!("data:{};base64,{}", img.mime_type, img.data))
    }
}
