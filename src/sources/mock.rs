//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{Book, BookBuilder, SearchQuery, SearchResponse};
use crate::sources::{Source, SourceCapabilities, SourceError};

/// A mock source for testing that returns predefined responses.
#[derive(Debug)]
pub struct MockSource {
    id: String,
    capabilities: SourceCapabilities,
    search_books: Mutex<Vec<Book>>,
    search_error: Mutex<Option<String>>,
    books_by_id: Mutex<HashMap<String, Book>>,
    search_calls: AtomicUsize,
    lookup_calls: AtomicUsize,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::with_id("mock")
    }
}

impl MockSource {
    /// Create a new mock source with id "mock".
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a searchable, lookup-capable mock source with the given id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capabilities: SourceCapabilities::SEARCH | SourceCapabilities::ID_LOOKUP,
            search_books: Mutex::new(Vec::new()),
            search_error: Mutex::new(None),
            books_by_id: Mutex::new(HashMap::new()),
            search_calls: AtomicUsize::new(0),
            lookup_calls: AtomicUsize::new(0),
        }
    }

    /// Override the advertised capabilities.
    pub fn with_capabilities(mut self, capabilities: SourceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Return these books from every search.
    pub fn with_books(self, books: Vec<Book>) -> Self {
        self.set_search_books(books);
        self
    }

    /// Fail every search with a network error.
    pub fn failing(self, message: impl Into<String>) -> Self {
        self.set_search_error(message);
        self
    }

    /// Make `book` resolvable through `get_by_id` under its own id.
    pub fn with_lookup(self, book: Book) -> Self {
        self.lock(&self.books_by_id).insert(book.id.clone(), book);
        self
    }

    /// Set the books returned by search.
    pub fn set_search_books(&self, books: Vec<Book>) {
        *self.lock(&self.search_books) = books;
    }

    /// Set the error returned by search.
    pub fn set_search_error(&self, message: impl Into<String>) {
        *self.lock(&self.search_error) = Some(message.into());
    }

    /// Clear the configured books and error.
    pub fn clear_response(&self) {
        self.lock(&self.search_books).clear();
        *self.lock(&self.search_error) = None;
    }

    /// How many times `search` was called.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// How many times `get_by_id` was called.
    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    fn capabilities(&self) -> SourceCapabilities {
        self.capabilities
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        let error = self.lock(&self.search_error).clone();
        if let Some(message) = error {
            return Err(SourceError::Network(message));
        }

        let books = self.lock(&self.search_books).clone();
        Ok(SearchResponse::new(books, self.name(), &query.query))
    }

    async fn get_by_id(&self, id: &str) -> Result<Book, SourceError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);

        self.lock(&self.books_by_id)
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}

/// Helper function to create a mock book for testing.
pub fn make_book(id: &str, title: &str, author: &str) -> Book {
    BookBuilder::new(id, title, author).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_search_returns_configured_books() {
        let source = MockSource::new().with_books(vec![make_book("1", "Dune", "Frank Herbert")]);

        let response = source.search(&SearchQuery::new("dune")).await.unwrap();
        assert_eq!(response.books.len(), 1);
        assert_eq!(response.query, "dune");
        assert_eq!(source.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_search_error() {
        let source = MockSource::new().failing("connection reset");

        let result = source.search(&SearchQuery::new("dune")).await;
        assert!(matches!(result, Err(SourceError::Network(_))));

        source.clear_response();
        assert!(source.search(&SearchQuery::new("dune")).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_lookup() {
        let source = MockSource::new().with_lookup(make_book("OL1W", "Dune", "Frank Herbert"));

        assert_eq!(source.get_by_id("OL1W").await.unwrap().title, "Dune");
        assert!(source.get_by_id("OL2W").await.unwrap_err().is_not_found());
        assert_eq!(source.lookup_calls(), 2);
    }
}
