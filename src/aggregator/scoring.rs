//! Text-match scoring of a candidate book against a free-text query.
//!
//! Points, all additive:
//!
//! | condition                                           | points |
//! |-----------------------------------------------------|--------|
//! | lower-cased title equals the lower-cased query      | 100    |
//! | every query token is a substring of the title       | 50     |
//! | lower-cased author contains the lower-cased query   | 30     |
//! | each query token that is a substring of the title   | 10     |
//!
//! Tokens are the whitespace-separated pieces of the lower-cased query.
//! A token counted by the all-tokens bonus is counted again per token.

use crate::models::Book;

pub const EXACT_TITLE_POINTS: u32 = 100;
pub const ALL_TOKENS_POINTS: u32 = 50;
pub const AUTHOR_POINTS: u32 = 30;
pub const TOKEN_POINTS: u32 = 10;

/// Score how well `book` matches `query`. Never negative, never capped.
pub fn match_score(query: &str, book: &Book) -> u32 {
    let query = query.to_lowercase();
    let title = book.title.to_lowercase();
    let author = book.author.to_lowercase();
    let tokens: Vec<&str> = query.split_whitespace().collect();

    let mut score = 0;

    if title == query {
        score += EXACT_TITLE_POINTS;
    }

    if !tokens.is_empty() && tokens.iter().all(|token| title.contains(token)) {
        score += ALL_TOKENS_POINTS;
    }

    if author.contains(query.as_str()) {
        score += AUTHOR_POINTS;
    }

    let matched = tokens.iter().filter(|token| title.contains(*token)).count() as u32;
    score += matched * TOKEN_POINTS;

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::make_book;

    #[test]
    fn exact_title_scores_all_title_bonuses() {
        let book = make_book("1", "Dune", "Frank Herbert");
        assert_eq!(match_score("dune", &book), 160);
    }

    #[test]
    fn title_containing_query_misses_exact_bonus() {
        let book = make_book("1", "Dune Messiah", "Frank Herbert");
        assert_eq!(match_score("dune", &book), 60);
    }

    #[test]
    fn exact_match_ignores_case() {
        let book = make_book("1", "The Left Hand of Darkness", "Ursula K. Le Guin");
        assert!(match_score("THE LEFT HAND OF DARKNESS", &book) >= EXACT_TITLE_POINTS);
    }

    #[test]
    fn per_token_points_stack() {
        let book = make_book("1", "The Left Hand of Darkness", "Ursula K. Le Guin");
        // 5 tokens, all in the title, title equals query
        assert_eq!(match_score("the left hand of darkness", &book), 100 + 50 + 5 * 10);
    }

    #[test]
    fn partial_token_match() {
        let book = make_book("1", "Children of Dune", "Frank Herbert");
        // "dune" and "children" match, "god" does not
        assert_eq!(match_score("god dune children", &book), 20);
    }

    #[test]
    fn author_match() {
        let book = make_book("1", "Dune", "Frank Herbert");
        assert_eq!(match_score("herbert", &book), 30);
        assert_eq!(match_score("Frank Herbert", &book), 30);
    }

    #[test]
    fn tokens_match_as_substrings() {
        let book = make_book("1", "Foundation", "Isaac Asimov");
        assert_eq!(match_score("found", &book), 60);
    }

    #[test]
    fn no_match_scores_zero() {
        let book = make_book("1", "Neuromancer", "William Gibson");
        assert_eq!(match_score("dune", &book), 0);
    }

    /// Runs of spaces between words do not yield empty tokens, so they add no
    /// per-token points. Splitting on single spaces would score this at 80.
    #[test]
    fn extra_whitespace_does_not_create_tokens() {
        let book = make_book("1", "Dune Messiah", "Frank Herbert");
        assert_eq!(match_score("dune   messiah", &book), 50 + 20);
    }
}
