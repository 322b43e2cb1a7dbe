//! Frequency aggregation over category tags
//!
//! Pure function over the caller's current joined books; recomputed on every
//! own-shelf emission, no subscription of its own.

use std::collections::HashMap;

use bookstack_domain::JoinedBook;
use serde::{Deserialize, Serialize};

/// Number of categories kept by the default ranking.
pub const TOP_CATEGORY_COUNT: usize = 6;

/// Bucket used for books with no category at all.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// One category with its occurrence count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Count category occurrences and keep the top `n` by descending count.
///
/// A book with several categories contributes to each of them; a book with
/// none contributes to the [`UNKNOWN_CATEGORY`] bucket. Ties keep the order
/// in which a category was first encountered (stable sort).
pub fn top_categories(books: &[JoinedBook], n: usize) -> Vec<CategoryCount> {
    let mut first_seen: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for book in books {
        if book.categories.is_empty() {
            bump(UNKNOWN_CATEGORY, &mut first_seen, &mut counts);
        } else {
            for category in &book.categories {
                bump(category, &mut first_seen, &mut counts);
            }
        }
    }

    let mut ranked: Vec<CategoryCount> = first_seen
        .into_iter()
        .map(|category| {
            let count = counts[&category];
            CategoryCount { category, count }
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

fn bump(tag: &str, first_seen: &mut Vec<String>, counts: &mut HashMap<String, usize>) {
    let entry = counts.entry(tag.to_string()).or_insert(0);
    if *entry == 0 {
        first_seen.push(tag.to_string());
    }
    *entry += 1;
}
