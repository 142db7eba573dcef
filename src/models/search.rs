//! Search request and response models.

use serde::{Deserialize, Serialize};

use super::Book;

/// Default per-provider page size
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Search query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query string
    pub query: String,

    /// Maximum number of results to request from each provider
    pub max_results: usize,

    /// Whether to fetch detailed information (slower but more complete)
    pub fetch_details: bool,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            max_results: DEFAULT_PAGE_SIZE,
            fetch_details: true,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set maximum results per provider
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Enable/disable detailed fetching
    pub fn fetch_details(mut self, fetch: bool) -> Self {
        self.fetch_details = fetch;
        self
    }
}

/// One provider's answer to a search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Books found, in provider order
    pub books: Vec<Book>,

    /// Total number of results the provider reported (may exceed `books.len()`)
    pub total_results: Option<usize>,

    /// Name of the provider
    pub source: String,

    /// Query that was executed
    pub query: String,
}

impl SearchResponse {
    /// Create a new search response
    pub fn new(books: Vec<Book>, source: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            books,
            total_results: None,
            source: source.into(),
            query: query.into(),
        }
    }

    /// An empty response
    pub fn empty(source: impl Into<String>, query: impl Into<String>) -> Self {
        Self::new(Vec::new(), source, query)
    }

    /// Set total results
    pub fn total_results(mut self, total: usize) -> Self {
        self.total_results = Some(total);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_defaults() {
        let query = SearchQuery::new("dune");
        assert_eq!(query.query, "dune");
        assert_eq!(query.max_results, 10);
        assert!(query.fetch_details);
    }

    #[test]
    fn test_search_query_builder() {
        let query = SearchQuery::new("dune").max_results(20).fetch_details(false);
        assert_eq!(query.max_results, 20);
        assert!(!query.fetch_details);
    }

    #[test]
    fn test_search_response_total() {
        let response = SearchResponse::empty("Open Library", "dune").total_results(42);
        assert!(response.books.is_empty());
        assert_eq!(response.total_results, Some(42));
        assert_eq!(response.source, "Open Library");
    }
}
