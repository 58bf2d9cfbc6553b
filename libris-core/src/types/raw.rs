//! Loosely-shaped book records as they arrive from outside

use super::ReadingStatus;
use serde_json::{Map, Value};

/// Canonical fields of a book record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Title,
    Author,
    Year,
    Summary,
    Tags,
    CoverUrl,
    DriveUrl,
    Status,
    Rating,
    DateAdded,
}

impl Field {
    /// Accepted key spellings, canonical first, all lowercase.
    ///
    /// Exports from other tools (and the Spanish-labelled UI this format
    /// started in) use different names for the same field.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            Field::Id => &["id", "uuid"],
            Field::Title => &["title", "titulo", "título", "name"],
            Field::Author => &["author", "autor", "writer", "authors"],
            Field::Year => &["year", "año", "anio", "published", "publicado"],
            Field::Summary => &[
                "summary",
                "resumen",
                "description",
                "descripcion",
                "descripción",
                "sinopsis",
            ],
            Field::Tags => &[
                "tags",
                "etiquetas",
                "categories",
                "categorias",
                "categorías",
                "genres",
                "generos",
                "géneros",
            ],
            Field::CoverUrl => &[
                "coverurl",
                "cover_url",
                "cover",
                "portada",
                "coverimage",
                "tempbase64",
            ],
            Field::DriveUrl => &["driveurl", "drive_url", "drive", "drivelink", "enlacedrive"],
            Field::Status => &["status", "estado"],
            Field::Rating => &[
                "rating",
                "valoracion",
                "valoración",
                "puntuacion",
                "puntuación",
                "stars",
            ],
            Field::DateAdded => &[
                "dateadded",
                "date_added",
                "fechaagregado",
                "added_at",
                "addedat",
            ],
        }
    }
}

/// A book-like JSON object whose fields may be missing, mistyped or
/// spelled differently from the canonical schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBook {
    fields: Map<String, Value>,
}

impl RawBook {
    /// Wrap a JSON value; anything other than an object is not a record
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Set a canonical field
    pub fn set(&mut self, field: Field, value: impl Into<Value>) {
        self.fields.insert(field.names()[0].to_string(), value.into());
    }

    /// Builder form of [`RawBook::set`]
    pub fn with(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// All values present for a field, canonical spelling first
    fn candidates(&self, field: Field) -> impl Iterator<Item = &Value> + '_ {
        field.names().iter().flat_map(move |name| {
            self.fields
                .iter()
                .filter(move |(key, _)| key.to_lowercase() == *name)
                .map(|(_, value)| value)
        })
    }

    /// Non-empty trimmed text for a field.
    ///
    /// Numbers are rendered as text and string arrays are joined with ", ".
    pub fn text(&self, field: Field) -> Option<String> {
        self.candidates(field).find_map(|value| {
            let text = match value {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => String::new(),
            };
            (!text.is_empty()).then_some(text)
        })
    }

    /// Tags from an array of strings or a single comma-separated string.
    ///
    /// Trimmed, empties dropped, case-insensitive duplicates dropped keeping
    /// the first spelling.
    pub fn tags(&self) -> Vec<String> {
        let raw: Vec<String> = self
            .candidates(Field::Tags)
            .find_map(|value| match value {
                Value::Array(items) => Some(
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                ),
                Value::String(s) => Some(s.split(',').map(str::to_string).collect()),
                _ => None,
            })
            .unwrap_or_default();

        dedup_tags(raw)
    }

    /// A recognised status, if the record carries one
    pub fn status(&self) -> Option<ReadingStatus> {
        self.candidates(Field::Status)
            .find_map(|value| value.as_str().and_then(|s| s.parse().ok()))
    }

    /// Rating rounded and clamped to 0..=5
    pub fn rating(&self) -> Option<u8> {
        self.candidates(Field::Rating).find_map(|value| {
            let number = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }?;
            number
                .is_finite()
                .then(|| number.round().clamp(0.0, f64::from(super::MAX_RATING)) as u8)
        })
    }

    /// Positive epoch-millisecond timestamp.
    ///
    /// Accepts a number, a numeric string, or an RFC 3339 date.
    pub fn timestamp(&self, field: Field) -> Option<i64> {
        self.candidates(field).find_map(|value| {
            let millis = match value {
                Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
                Value::String(s) => {
                    let s = s.trim();
                    s.parse::<i64>().ok().or_else(|| {
                        chrono::DateTime::parse_from_rfc3339(s)
                            .ok()
                            .map(|dt| dt.timestamp_millis())
                    })
                }
                _ => None,
            }?;
            (millis > 0).then_some(millis)
        })
    }
}

/// Trim, drop empties and drop case-insensitive repeats, keeping order
pub fn dedup_tags<I, T>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect()
}
