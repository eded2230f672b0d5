//! Markdown helpers shared by the index engine: title derivation and
//! formatting removal for the searchable text.

use pulldown_cmark::{Event, Parser, Tag};

/// Extracts a title from the first level-1 heading (`# ...`) in `content`.
///
/// Returns `None` when no such heading exists or the heading is empty;
/// the article then stays untitled in the index.
pub fn derive_title(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        line.strip_prefix("# ")
            .map(|rest| rest.trim().to_string())
            .filter(|title| !title.is_empty())
    })
}

/// Strips Markdown formatting from `content`, keeping only the prose.
///
/// Walks the pulldown-cmark event stream and concatenates text and inline
/// code, separating blocks with single spaces. The result is what gets
/// handed to the full-text index, so a search for `cats` matches the word
/// and not surrounding syntax like `**cats**` or `[cats](...)`.
pub fn strip_formatting(content: &str) -> String {
    let mut out = String::with_capacity(content.len());

    for event in Parser::new(content) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(..))
            | Event::End(Tag::Item)
            | Event::End(Tag::CodeBlock(_))
            | Event::End(Tag::BlockQuote)
            | Event::End(Tag::TableCell) => out.push(' '),
            _ => {}
        }
    }

    out.trim().to_string()
}
