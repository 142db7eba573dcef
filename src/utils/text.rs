//! Text normalisation helpers for catalog payloads.

use regex::Regex;
use std::sync::OnceLock;

struct DescriptionPatterns {
    bold_block: Regex,
    tag: Regex,
    whitespace: Regex,
    space_before_punct: Regex,
    space_after_punct: Regex,
    sentence_break: Regex,
    blank_lines: Regex,
}

fn patterns() -> &'static DescriptionPatterns {
    static PATTERNS: OnceLock<DescriptionPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| DescriptionPatterns {
        bold_block: Regex::new(r"(?s)<b>.*?</b>").expect("valid regex"),
        tag: Regex::new(r"<[^>]*>").expect("valid regex"),
        whitespace: Regex::new(r"\s+").expect("valid regex"),
        space_before_punct: Regex::new(r"\s+([.,!?])").expect("valid regex"),
        space_after_punct: Regex::new(r"([.,!?])\s+").expect("valid regex"),
        sentence_break: Regex::new(r"([.!?])\s*([A-Z])").expect("valid regex"),
        blank_lines: Regex::new(r"\n\s*\n").expect("valid regex"),
    })
}

/// Turn an HTML-ish catalog description into plain text.
///
/// Bold blocks are dropped entirely (Google Books uses them for taglines and
/// review quotes), remaining tags are stripped, whitespace is collapsed, and
/// sentences are separated by a blank line. Returns `None` when nothing is left.
pub fn clean_description(description: Option<&str>) -> Option<String> {
    let description = description?;
    if description.trim().is_empty() {
        return None;
    }

    let p = patterns();
    let cleaned = p.bold_block.replace_all(description, "");
    let cleaned = p.tag.replace_all(&cleaned, "");
    let cleaned = p.whitespace.replace_all(&cleaned, " ");
    let cleaned = p.space_before_punct.replace_all(&cleaned, "${1}");
    let cleaned = p.space_after_punct.replace_all(&cleaned, "${1} ");
    let cleaned = p.sentence_break.replace_all(&cleaned, "${1}\n\n${2}");
    let cleaned = p.blank_lines.replace_all(&cleaned, "\n\n");
    let cleaned = cleaned.trim();

    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Last `/`-separated segment of a hierarchical key (`/works/OL45883W` -> `OL45883W`)
pub fn last_path_segment(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Rewrite a plain-HTTP image link to HTTPS
pub fn secure_url(url: &str) -> String {
    url.replacen("http://", "https://", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_description_strips_markup() {
        let raw = "<p>A <i>stunning</i> blend of adventure and mysticism.</p>";
        assert_eq!(
            clean_description(Some(raw)).as_deref(),
            Some("A stunning blend of adventure and mysticism.")
        );
    }

    #[test]
    fn test_clean_description_drops_bold_blocks() {
        let raw = "<b>The bestselling classic!</b> Set on the desert planet Arrakis.";
        assert_eq!(
            clean_description(Some(raw)).as_deref(),
            Some("Set on the desert planet Arrakis.")
        );
    }

    #[test]
    fn test_clean_description_breaks_sentences() {
        let raw = "First sentence.Second one , with   spacing !Third";
        assert_eq!(
            clean_description(Some(raw)).as_deref(),
            Some("First sentence.\n\nSecond one, with spacing!\n\nThird")
        );
    }

    #[test]
    fn test_clean_description_empty() {
        assert_eq!(clean_description(None), None);
        assert_eq!(clean_description(Some("   ")), None);
        assert_eq!(clean_description(Some("<b>only bold</b>")), None);
    }

    #[test]
    fn test_last_path_segment() {
        assert_eq!(last_path_segment("/works/OL45883W"), "OL45883W");
        assert_eq!(last_path_segment("/languages/eng"), "eng");
        assert_eq!(last_path_segment("OL45883W"), "OL45883W");
    }

    #[test]
    fn test_secure_url() {
        assert_eq!(
            secure_url("http://books.google.com/books/content?id=1"),
            "https://books.google.com/books/content?id=1"
        );
        assert_eq!(secure_url("https://example.com/a"), "https://example.com/a");
    }
}
