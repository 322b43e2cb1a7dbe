//! Personal annotations layered on canonical records

use crate::user::{ItemId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A star rating between 1 and 5.
///
/// Absence of a rating is always `Option<Rating>`, never a sentinel value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

/// Rating outside the 1-5 range
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Rating must be between 1 and 5, got {0}")]
pub struct RatingOutOfRange(pub u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Result<Self, RatingOutOfRange> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(RatingOutOfRange(stars))
        }
    }

    pub fn stars(&self) -> u8 {
        self.0
    }
}

/// Per-user, per-item mutable state.
///
/// Identified by `(owner_id, item_id)`. References the canonical record by
/// identifier only and never duplicates canonical fields. `date_added` is set
/// once at creation; rating and review are mutated only by the owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonalAnnotation {
    pub owner_id: UserId,
    pub item_id: ItemId,
    pub date_added: DateTime<Utc>,
    pub rating: Option<Rating>,
    pub review_text: String,
}

impl PersonalAnnotation {
    /// Create a fresh annotation, timestamped now, with no rating or review.
    pub fn new(owner_id: UserId, item_id: ItemId) -> Self {
        Self {
            owner_id,
            item_id,
            date_added: Utc::now(),
            rating: None,
            review_text: String::new(),
        }
    }
}
