//! Core types for the book record model

mod book;
mod raw;
mod status;

pub use book::{Book, DEFAULT_AUTHOR, DEFAULT_TITLE, MAX_RATING};
pub use raw::{dedup_tags, Field, RawBook};
pub use status::{ReadingStatus, UnknownStatus};
