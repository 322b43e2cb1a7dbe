//! Write path: shelving, reviewing, removing
//!
//! Splits each shelved book into its shared canonical record (created at
//! most once per item id) and the owner's personal annotation. No transaction
//! spans the two writes; the existence-check/create race on the canonical
//! record is accepted as benign, since concurrent writers carry an identical
//! payload for the same item id.

use std::sync::Arc;

use bookstack_domain::{
    is_storable, validate_canonical, CanonicalBook, ItemId, PersonalAnnotation, Rating, UserId,
};

use crate::error::{CoreError, Result};
use crate::store::{ShelfStore, StoreError};

/// User-initiated writes against the backing store.
pub struct ShelfService {
    store: Arc<dyn ShelfStore>,
}

impl ShelfService {
    pub fn new(store: Arc<dyn ShelfStore>) -> Self {
        Self { store }
    }

    /// Create the canonical record if and only if it does not already exist.
    ///
    /// Idempotent-create, not upsert: existing canonical data is never
    /// overwritten. Losing the create race to a concurrent owner is treated
    /// as success.
    pub async fn ensure_catalog_entry(&self, book: CanonicalBook) -> Result<()> {
        let issues = validate_canonical(&book);
        if !is_storable(&issues) {
            let summary = issues
                .iter()
                .map(|i| i.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CoreError::InvalidRecord(summary));
        }

        if self.store.catalog_get(&book.item_id).await?.is_some() {
            return Ok(());
        }
        match self.store.catalog_create(book).await {
            Ok(()) => Ok(()),
            // another owner won the race with an identical payload
            Err(StoreError::AlreadyExists(id)) => {
                tracing::debug!(item = %id, "Canonical record created concurrently");
                Ok(())
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Add a book to `owner`'s shelf: ensure the canonical record, then
    /// create the annotation timestamped now, with no rating or review.
    pub async fn add_to_shelf(&self, owner: &UserId, book: CanonicalBook) -> Result<()> {
        let item_id = book.item_id.clone();
        self.ensure_catalog_entry(book).await?;
        let annotation = PersonalAnnotation::new(owner.clone(), item_id.clone());
        self.store.annotation_put(annotation).await?;
        tracing::info!(owner = %owner, item = %item_id, "Book shelved");
        Ok(())
    }

    /// Update the owner's rating and/or review. `None` leaves a field as is.
    pub async fn save_review(
        &self,
        owner: &UserId,
        item: &ItemId,
        rating: Option<Rating>,
        review_text: Option<String>,
    ) -> Result<()> {
        self.store
            .annotation_update(owner, item, rating, review_text)
            .await?;
        Ok(())
    }

    /// Remove the book from the owner's shelf. The canonical record stays:
    /// it is shared and possibly referenced by other owners.
    pub async fn remove_from_shelf(&self, owner: &UserId, item: &ItemId) -> Result<()> {
        self.store.annotation_delete(owner, item).await?;
        tracing::info!(owner = %owner, item = %item, "Book removed from shelf");
        Ok(())
    }
}
