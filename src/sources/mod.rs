//! Book catalog plugins with extensible trait-based architecture.
//!
//! This module defines the [`Source`] trait that every catalog implements.
//! New catalogs can be added by implementing this trait and registering them
//! with the [`SourceRegistry`]. The registry is ordered: registration order is
//! the precedence used when resolving a single book by id.
//!
//! Built-in catalogs:
//!
//! - `google_books` - Google Books volumes API (search, lookup by volume id)
//! - `open_library` - Open Library search, edition, work and author resources
//!   (search, lookup by work id)
//!
//! [`MockSource`] is an in-memory catalog for tests.

mod google_books;
mod mock;
mod open_library;
mod registry;

pub use google_books::GoogleBooksSource;
pub use mock::{make_book, MockSource};
pub use open_library::OpenLibrarySource;
pub use registry::{SourceCapabilities, SourceRegistry};

use crate::models::{Book, SearchQuery, SearchResponse};
use async_trait::async_trait;

/// The Source trait defines the interface for all catalog plugins.
///
/// # Implementing a New Source
///
/// 1. Create a new struct that implements `Source`
/// 2. Implement the required methods (`id`, `name`) and whichever of
///    `search` / `get_by_id` the catalog supports
/// 3. Advertise them through `capabilities`
/// 4. Register the source with a [`SourceRegistry`]
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "google_books")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Describe the capabilities of this source
    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH
    }

    /// Whether this source supports search
    fn supports_search(&self) -> bool {
        self.capabilities().contains(SourceCapabilities::SEARCH)
    }

    /// Whether this source supports lookup by id
    fn supports_id_lookup(&self) -> bool {
        self.capabilities().contains(SourceCapabilities::ID_LOOKUP)
    }

    /// Search for books matching the query
    async fn search(&self, _query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        Err(SourceError::NotImplemented)
    }

    /// Get a book by its id (source-specific).
    ///
    /// Returns [`SourceError::NotFound`] when the catalog has no such record.
    async fn get_by_id(&self, _id: &str) -> Result<Book, SourceError> {
        Err(SourceError::NotImplemented)
    }
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The requested operation is not implemented for this source
    #[error("Operation not implemented for this source")]
    NotImplemented,

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (JSON, unexpected shape)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Book not found
    #[error("Book not found: {0}")]
    NotFound(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),

    /// Source could not be set up
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl SourceError {
    /// Whether this error means "no such record" rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
