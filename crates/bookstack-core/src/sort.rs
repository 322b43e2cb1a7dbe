//! Presentation-time sorting of joined books
//!
//! Sorting happens at read time, never at storage time. Keys are compared
//! through a Unicode-normalized, case-folded collation key so "Éco" and
//! "eco" collate together; the sort is stable, so equal keys never reorder
//! across re-renders triggered by unrelated changes.

use bookstack_domain::JoinedBook;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Supported sort keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Title,
    /// First listed author; books without authors collate first.
    Author,
    /// Owner display name (friend fan-out views).
    Owner,
}

/// Collation key: NFKD-decomposed, combining marks stripped, lowercased.
pub fn collation_key(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Stable in-place sort by the given key.
pub fn sort_books(books: &mut [JoinedBook], key: SortKey) {
    books.sort_by_cached_key(|book| match key {
        SortKey::Title => collation_key(&book.title),
        SortKey::Author => collation_key(book.first_author()),
        SortKey::Owner => collation_key(book.owner_name.as_deref().unwrap_or("")),
    });
}
