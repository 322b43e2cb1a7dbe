//! Joined view model produced by a join cycle

use crate::annotation::{PersonalAnnotation, Rating};
use crate::book::CanonicalBook;
use crate::user::{ItemId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title substituted when the canonical record is missing at join time.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Canonical fields merged with one owner's annotation.
///
/// Derived, never persisted: each join cycle replaces the affected owner's
/// joined books wholesale. `owner_name` is filled only on the friend fan-out
/// path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JoinedBook {
    pub item_id: ItemId,
    pub title: String,
    pub authors: Vec<String>,
    pub page_count: u32,
    pub categories: Vec<String>,
    pub cover_url: Option<String>,
    pub date_added: DateTime<Utc>,
    pub rating: Option<Rating>,
    pub review_text: String,
    pub owner_id: UserId,
    pub owner_name: Option<String>,
}

impl JoinedBook {
    /// Merge an annotation with its canonical record.
    ///
    /// A missing canonical record degrades per field rather than dropping the
    /// item: title falls back to [`UNKNOWN_TITLE`], authors and categories to
    /// empty, page count to 0.
    pub fn join(annotation: PersonalAnnotation, canonical: Option<&CanonicalBook>) -> Self {
        let (title, authors, page_count, categories, cover_url) = match canonical {
            Some(book) => (
                book.title.clone(),
                book.authors.clone(),
                book.page_count,
                book.categories.clone(),
                book.cover_url.clone(),
            ),
            None => (UNKNOWN_TITLE.to_string(), Vec::new(), 0, Vec::new(), None),
        };
        Self {
            item_id: annotation.item_id,
            title,
            authors,
            page_count,
            categories,
            cover_url,
            date_added: annotation.date_added,
            rating: annotation.rating,
            review_text: annotation.review_text,
            owner_id: annotation.owner_id,
            owner_name: None,
        }
    }

    pub fn with_owner_name(mut self, owner_name: Option<String>) -> Self {
        self.owner_name = owner_name;
        self
    }

    /// First listed author, or empty when unknown.
    pub fn first_author(&self) -> &str {
        self.authors.first().map(String::as_str).unwrap_or("")
    }
}
