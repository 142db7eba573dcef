//! # Bookshelf Search
//!
//! Search two public book catalogs (Google Books and Open Library) at once
//! and get back one ranked, deduplicated list.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Book, SearchQuery, SearchResponse)
//! - [`sources`]: Catalog plugins behind the [`Source`] trait, held in an ordered [`SourceRegistry`]
//! - [`aggregator`]: Concurrent fan-out, match scoring, ranking and deduplication
//! - [`utils`]: HTTP client, text cleanup and terminal rendering
//! - [`config`]: Configuration management
//!
//! ```rust,no_run
//! use bookshelf_search::{Config, SearchAggregator};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let aggregator = SearchAggregator::from_config(&Config::default())?;
//! for book in aggregator.search("dune").await? {
//!     println!("{} - {}", book.title, book.author);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use aggregator::{AggregatorError, PartialFailurePolicy, SearchAggregator};
pub use config::Config;
pub use models::{Book, ReadingStatus};
pub use sources::{Source, SourceError, SourceRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
