//! Markdown rendering for one book's annotations.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

use crate::aggregator::ExportGroup;
use crate::model::BookLookup;

pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A rendered book, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Book title, or the raw asset id when the library has no entry.
    pub title: String,
    pub body: String,
    /// Number of annotations that produced a text line.
    pub entries: usize,
}

/// Render one group. Never fails: missing metadata falls back to the
/// asset id and empty optional fields are left out.
pub fn render<Tz>(group: &ExportGroup, books: &BookLookup, exported_at: &DateTime<Tz>) -> RenderedDocument
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut body = String::new();

    let title = match books.get(&group.book_id) {
        Some(book) => {
            body.push_str(&format!("# {}\n", book.title));
            body.push_str(&format!("- Author: {}\n", book.author));
            body.push_str(&format!("- assetID: {}\n", group.book_id));
            book.title.clone()
        }
        None => {
            body.push_str(&format!("- assetID: {}\n", group.book_id));
            group.book_id.clone()
        }
    };

    body.push_str(&format!(
        "- Export date: {}\n",
        exported_at.format(EXPORT_DATE_FORMAT)
    ));

    let mut entries = 0;
    let mut current_chapter = "";
    for annotation in &group.annotations {
        if !annotation.is_exportable() {
            continue;
        }

        let chapter = annotation.chapter.as_str();
        if !chapter.is_empty() && chapter != current_chapter {
            body.push_str("\n---\n");
            body.push_str(&format!("### Chapter: {}\n", chapter));
            current_chapter = chapter;
        }

        // highlight that repeats the chapter heading
        if annotation.selected_text == current_chapter {
            continue;
        }

        body.push_str(&annotation.selected_text);
        body.push('\n');
        if !annotation.note.is_empty() {
            body.push_str(&format!("> Note: {}\n", annotation.note));
        }
        body.push('\n');
        entries += 1;
    }

    RenderedDocument {
        title,
        body,
        entries,
    }
}
