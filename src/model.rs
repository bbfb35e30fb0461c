use std::collections::HashMap;

/// Book metadata from the library database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
}

/// Books keyed by asset id.
pub type BookLookup = HashMap<String, Book>;

/// A highlight and/or note as stored by the reader. Missing columns are
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub book_id: String,
    pub broader_text: String,
    pub selected_text: String,
    pub note: String,
    pub chapter: String,
    pub created: String,
    pub modified: String,
    pub location: String,
}

impl Annotation {
    /// An annotation with neither selected nor surrounding text has
    /// nothing to export.
    pub fn is_exportable(&self) -> bool {
        !(self.broader_text.is_empty() && self.selected_text.is_empty())
    }
}

/// Index books by id. When an id repeats, the first row wins.
pub fn book_lookup(books: impl IntoIterator<Item = Book>) -> BookLookup {
    let mut lookup = BookLookup::new();
    for book in books {
        lookup.entry(book.id.clone()).or_insert(book);
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, title: &str) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: String::new(),
        }
    }

    #[test]
    fn test_book_lookup_keeps_first_duplicate() {
        let books = book_lookup(vec![
            book("B1", "First row"),
            book("B2", "Other"),
            book("B1", "Second row"),
        ]);

        assert_eq!(books.len(), 2);
        assert_eq!(books["B1"].title, "First row");
    }

    #[test]
    fn test_is_exportable() {
        let mut annotation = Annotation::default();
        assert!(!annotation.is_exportable());

        annotation.broader_text = "context".to_string();
        assert!(annotation.is_exportable());
    }
}
