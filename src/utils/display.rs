//! Terminal rendering of book lists.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};

use crate::models::Book;

/// Truncate to at most `max_chars` characters, ending in "..." when cut.
///
/// ```
/// use bookshelf_search::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return ".".repeat(max_chars);
    }

    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", kept.trim_end())
}

/// Books as a table: rank, title, author, year, id
pub fn books_table(books: &[Book]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Title", "Author", "Year", "ID"]);

    for (rank, book) in books.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(truncate_with_ellipsis(&book.title, 50)).add_attribute(Attribute::Bold),
            Cell::new(truncate_with_ellipsis(&book.author, 30)),
            Cell::new(book.publish_year().unwrap_or("")),
            Cell::new(&book.id),
        ]);
    }

    table
}

/// One book, one block of `label: value` lines
pub fn book_plain(book: &Book) -> String {
    let mut lines = vec![format!("{} - {}", book.title, book.author)];

    let mut field = |label: &str, value: Option<&str>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            lines.push(format!("  {}: {}", label, value));
        }
    };

    field("ID", Some(book.id.as_str()));
    field("Published", book.publish_date.as_deref());
    field("Publisher", book.publisher.as_deref());
    let pages = book.page_count.map(|p| p.to_string());
    field("Pages", pages.as_deref());
    field("Language", book.language.as_deref());
    field("ISBN", book.isbn.as_deref());
    let subjects = book.subjects.join(", ");
    field("Subjects", Some(subjects.as_str()));
    field("Cover", book.cover_image.as_deref());

    if let Some(description) = &book.description {
        lines.push(String::new());
        lines.extend(description.lines().map(|l| format!("  {}", l)));
    }

    lines.join("\n")
}
