//! Score, rank and deduplicate candidates gathered from several catalogs.
//!
//! The pipeline is pure: given the query and each source's books it always
//! produces the same ordering, so it is tested without any network.

use std::collections::HashMap;

use super::scoring::match_score;
use crate::models::Book;

/// A book paired with the source that returned it and its match score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub book: Book,
    /// Id of the source that returned the book
    pub source: String,
    pub score: u32,
}

impl ScoredCandidate {
    pub fn new(book: Book, source: impl Into<String>, score: u32) -> Self {
        Self {
            book,
            source: source.into(),
            score,
        }
    }
}

/// Score every book of one source, keeping the source's order
pub fn score_candidates(query: &str, source: &str, books: Vec<Book>) -> Vec<ScoredCandidate> {
    books
        .into_iter()
        .map(|book| {
            let score = match_score(query, &book);
            ScoredCandidate::new(book, source, score)
        })
        .collect()
}

/// Sort by descending score. The sort is stable: equal scores keep their input order.
pub fn rank_candidates(mut candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

/// Collapse candidates that share a case-insensitive (title, author) pair.
///
/// Single left-to-right pass: the first occurrence of a key claims a slot; a
/// later occurrence with a strictly higher score replaces the occupant of
/// that slot without moving it. Ties keep the first-seen candidate.
pub fn merge_candidates(candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    let mut merged: Vec<ScoredCandidate> = Vec::with_capacity(candidates.len());
    let mut slots: HashMap<(String, String), usize> = HashMap::new();

    for candidate in candidates {
        let key = candidate.book.dedup_key();
        match slots.get(&key) {
            Some(&index) => {
                if candidate.score > merged[index].score {
                    merged[index] = candidate;
                }
            }
            None => {
                slots.insert(key, merged.len());
                merged.push(candidate);
            }
        }
    }

    merged
}

/// Full pipeline: score each source's books, rank, deduplicate.
///
/// `results` holds `(source id, books)` pairs in source precedence order.
pub fn aggregate(query: &str, results: Vec<(String, Vec<Book>)>) -> Vec<ScoredCandidate> {
    let candidates: Vec<ScoredCandidate> = results
        .into_iter()
        .flat_map(|(source, books)| score_candidates(query, &source, books))
        .collect();

    merge_candidates(rank_candidates(candidates))
}
