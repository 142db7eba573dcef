//! Utility modules supporting catalog operations.
//!
//! - [`HttpClient`]: shared HTTP client built from [`HttpConfig`](crate::config::HttpConfig)
//! - [`clean_description`]: turn catalog HTML descriptions into plain text
//! - [`last_path_segment`]: ids from hierarchical Open Library keys
//! - [`books_table`] / [`book_plain`]: terminal rendering for the CLI

mod display;
mod http;
mod text;

pub use display::{book_plain, books_table, truncate_with_ellipsis};
pub use http::{redact_key, HttpClient, DEFAULT_USER_AGENT};
pub use text::{clean_description, last_path_segment, secure_url};
