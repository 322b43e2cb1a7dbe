//! Canonical book record

use crate::user::ItemId;
use serde::{Deserialize, Serialize};

/// Shared, owner-independent metadata for a book.
///
/// Stored once per `item_id` regardless of how many users shelve it. The
/// store treats these records as append-only: the first writer wins and the
/// core never updates a canonical record in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalBook {
    pub item_id: ItemId,
    pub title: String,
    pub authors: Vec<String>,
    pub page_count: u32,
    pub categories: Vec<String>,
    pub cover_url: Option<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
}

impl CanonicalBook {
    /// Create a canonical record with required fields
    pub fn new(item_id: ItemId, title: impl Into<String>) -> Self {
        Self {
            item_id,
            title: title.into(),
            authors: Vec::new(),
            page_count: 0,
            categories: Vec::new(),
            cover_url: None,
            description: None,
            publisher: None,
            published_date: None,
        }
    }

    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = page_count;
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// First listed author, or empty when unknown.
    pub fn first_author(&self) -> &str {
        self.authors.first().map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_defaults() {
        let book = CanonicalBook::new(ItemId::new("b1"), "Dune");
        assert_eq!(book.title, "Dune");
        assert!(book.authors.is_empty());
        assert_eq!(book.page_count, 0);
        assert!(book.categories.is_empty());
        assert!(book.cover_url.is_none());
    }

    #[test]
    fn serde_round_trip() {
        let book = CanonicalBook::new(ItemId::new("b1"), "Dune")
            .with_authors(vec!["Frank Herbert".to_string()])
            .with_page_count(412)
            .with_categories(vec!["Fiction".to_string()]);
        let json = serde_json::to_string(&book).unwrap();
        let back: CanonicalBook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);
    }
}
