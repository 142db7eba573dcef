//! Core data models for books and search operations.

mod book;
mod search;

pub use book::{Book, BookBuilder, ReadingStatus, UNKNOWN_AUTHOR, UNKNOWN_TITLE};
pub use search::{SearchQuery, SearchResponse, DEFAULT_PAGE_SIZE};
