//! Book model representing a catalog record from any provider.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Placeholder used when a provider has no title for a record
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Placeholder used when a provider has no author for a record
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Where a book sits on the reader's list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    /// Already read
    Past,
    /// Want to read (default for search results)
    #[default]
    Future,
}

impl std::fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadingStatus::Past => write!(f, "past"),
            ReadingStatus::Future => write!(f, "future"),
        }
    }
}

/// A book from any catalog
///
/// Identifiers are scoped to the provider that produced the record; the same
/// physical book has unrelated ids in different catalogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Provider-scoped identifier (Google volume id, Open Library work id)
    pub id: String,

    /// Book title
    pub title: String,

    /// Primary author
    pub author: String,

    /// Cover image URL
    pub cover_image: Option<String>,

    /// Plain-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    /// Publication date as reported by the provider (free-form)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,

    /// Language code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Subject tags / categories
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,

    /// ISBN (13-digit when available)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,

    /// Open Library edition key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition_key: Option<String>,

    /// Open Library work key (`/works/OL...W`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_key: Option<String>,

    /// Reading status
    #[serde(default)]
    pub status: ReadingStatus,
}

impl Book {
    /// Create a new book with required fields
    pub fn new(id: String, title: String, author: String) -> Self {
        Self {
            id,
            title,
            author,
            cover_image: None,
            description: None,
            publisher: None,
            publish_date: None,
            page_count: None,
            language: None,
            subjects: Vec::new(),
            isbn: None,
            edition_key: None,
            work_key: None,
            status: ReadingStatus::Future,
        }
    }

    /// Case-insensitive (title, author) pair identifying "the same book" across catalogs
    pub fn dedup_key(&self) -> (String, String) {
        (self.title.to_lowercase(), self.author.to_lowercase())
    }

    /// First standalone four-digit run in the publish date
    /// (`"2005-08-02"`, `"Aug 02, 2005"`, `"1 September 1990"`)
    pub fn publish_year(&self) -> Option<&str> {
        static YEAR: OnceLock<Regex> = OnceLock::new();
        let year = YEAR.get_or_init(|| Regex::new(r"\b(\d{4})\b").expect("valid regex"));

        let date = self.publish_date.as_deref()?;
        year.captures(date)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Builder for constructing Book objects
#[derive(Debug, Clone)]
pub struct BookBuilder {
    book: Book,
}

impl BookBuilder {
    /// Create a new builder with required fields
    pub fn new(id: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            book: Book::new(id.into(), title.into(), author.into()),
        }
    }

    pub fn cover_image(mut self, url: Option<String>) -> Self {
        self.book.cover_image = url;
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.book.description = description;
        self
    }

    pub fn publisher(mut self, publisher: Option<String>) -> Self {
        self.book.publisher = publisher;
        self
    }

    pub fn publish_date(mut self, date: Option<String>) -> Self {
        self.book.publish_date = date;
        self
    }

    pub fn page_count(mut self, pages: Option<u32>) -> Self {
        self.book.page_count = pages;
        self
    }

    pub fn language(mut self, language: Option<String>) -> Self {
        self.book.language = language;
        self
    }

    pub fn subjects(mut self, subjects: Vec<String>) -> Self {
        self.book.subjects = subjects;
        self
    }

    pub fn isbn(mut self, isbn: Option<String>) -> Self {
        self.book.isbn = isbn;
        self
    }

    pub fn edition_key(mut self, key: Option<String>) -> Self {
        self.book.edition_key = key;
        self
    }

    pub fn work_key(mut self, key: Option<String>) -> Self {
        self.book.work_key = key;
        self
    }

    pub fn status(mut self, status: ReadingStatus) -> Self {
        self.book.status = status;
        self
    }

    /// Build the Book
    pub fn build(self) -> Book {
        self.book
    }
}
