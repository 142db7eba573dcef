//! Multi-catalog search aggregation.
//!
//! [`SearchAggregator`] fans a query out to every searchable source in the
//! registry, waits for all of them, then scores, ranks and deduplicates the
//! combined candidates (see [`merge`]). Single-book lookups walk the sources
//! in registration order until one of them has the id.
//!
//! # Pipeline
//!
//! 1. Query every searchable source concurrently with `join_all`
//! 2. Apply the [`PartialFailurePolicy`] to any source that failed
//! 3. Score each candidate against the query ([`scoring::match_score`])
//! 4. Stable sort by descending score
//! 5. Collapse duplicates sharing a case-insensitive (title, author)
//! 6. Strip scores and return the books

pub mod merge;
pub mod scoring;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::models::{Book, SearchQuery, DEFAULT_PAGE_SIZE};
use crate::sources::{SourceError, SourceRegistry};

pub use merge::{aggregate, merge_candidates, rank_candidates, score_candidates, ScoredCandidate};
pub use scoring::match_score;

/// What a search does when some, but not all, sources fail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialFailurePolicy {
    /// Any failed source fails the whole search
    #[default]
    FailFast,
    /// Failed sources are logged and skipped; the search fails only if every source failed
    Tolerate,
}

impl std::fmt::Display for PartialFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartialFailurePolicy::FailFast => write!(f, "fail_fast"),
            PartialFailurePolicy::Tolerate => write!(f, "tolerate"),
        }
    }
}

/// Errors returned by [`SearchAggregator::search`]
#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    /// A source failed under [`PartialFailurePolicy::FailFast`]
    #[error("search failed: {source_id}: {source}")]
    SearchFailed {
        source_id: String,
        #[source]
        source: SourceError,
    },

    /// Every source failed
    #[error("search failed: all sources failed: {0}")]
    AllSourcesFailed(String),

    /// Nothing to search
    #[error("search failed: no searchable sources registered")]
    NoSources,
}

/// Searches several catalogs at once and merges their answers
#[derive(Debug, Clone)]
pub struct SearchAggregator {
    registry: SourceRegistry,
    policy: PartialFailurePolicy,
    page_size: usize,
    fetch_details: bool,
}

impl SearchAggregator {
    /// Aggregate over the given sources with default settings
    pub fn new(registry: SourceRegistry) -> Self {
        Self {
            registry,
            policy: PartialFailurePolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
            fetch_details: true,
        }
    }

    /// Aggregate over the built-in catalogs, configured from `config`
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Ok(Self::new(SourceRegistry::from_config(config)?)
            .with_policy(config.search.failure_policy)
            .with_page_size(config.providers.page_size)
            .with_fetch_details(config.search.fetch_details))
    }

    pub fn with_policy(mut self, policy: PartialFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Results requested from each source per search
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_fetch_details(mut self, fetch_details: bool) -> Self {
        self.fetch_details = fetch_details;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn policy(&self) -> PartialFailurePolicy {
        self.policy
    }

    /// Search all catalogs for `query` and return one ranked, deduplicated list.
    ///
    /// Empty or whitespace-only queries are not filtered here.
    pub async fn search(&self, query: &str) -> Result<Vec<Book>, AggregatorError> {
        let query = SearchQuery::new(query)
            .max_results(self.page_size)
            .fetch_details(self.fetch_details);
        self.search_query(&query).await
    }

    /// Like [`search`](Self::search) with explicit per-source parameters
    pub async fn search_query(&self, query: &SearchQuery) -> Result<Vec<Book>, AggregatorError> {
        let ranked = self.search_scored(query).await?;
        Ok(ranked.into_iter().map(|candidate| candidate.book).collect())
    }

    /// Ranked candidates with their scores and source ids
    pub async fn search_scored(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<ScoredCandidate>, AggregatorError> {
        let sources = self.registry.searchable();
        if sources.is_empty() {
            return Err(AggregatorError::NoSources);
        }

        let outcomes = join_all(sources.iter().map(|source| async move {
            (source.id().to_string(), source.search(query).await)
        }))
        .await;

        let mut results: Vec<(String, Vec<Book>)> = Vec::with_capacity(outcomes.len());
        let mut errors: Vec<String> = Vec::new();

        for (source_id, outcome) in outcomes {
            match outcome {
                Ok(response) => {
                    tracing::debug!(source = %source_id, count = response.books.len(), "source returned results");
                    results.push((source_id, response.books));
                }
                Err(err) => {
                    tracing::warn!(source = %source_id, error = %err, "source search failed");
                    if self.policy == PartialFailurePolicy::FailFast {
                        return Err(AggregatorError::SearchFailed {
                            source_id,
                            source: err,
                        });
                    }
                    errors.push(format!("{}: {}", source_id, err));
                }
            }
        }

        if results.is_empty() {
            return Err(AggregatorError::AllSourcesFailed(errors.join("; ")));
        }

        let ranked = aggregate(&query.query, results);
        tracing::info!(
            query = %query.query,
            results = ranked.len(),
            failed_sources = errors.len(),
            "search complete"
        );

        Ok(ranked)
    }

    /// Resolve one book by id, trying lookup-capable sources in registration order.
    ///
    /// A source that does not know the id, or that fails, passes to the next
    /// one. Returns `None` when no source has it.
    pub async fn get_details(&self, id: &str) -> Option<Book> {
        for source in self.registry.lookups() {
            match source.get_by_id(id).await {
                Ok(book) => {
                    tracing::debug!(source = source.id(), %id, "resolved book details");
                    return Some(book);
                }
                Err(err) if err.is_not_found() => {
                    tracing::debug!(source = source.id(), %id, "book not found in source");
                }
                Err(err) => {
                    tracing::warn!(source = source.id(), %id, error = %err, "book lookup failed");
                }
            }
        }

        tracing::debug!(%id, "book not found in any source");
        None
    }
}
