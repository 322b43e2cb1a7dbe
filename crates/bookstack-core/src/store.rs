//! Backing-store traits and live subscriptions
//!
//! The store is the single authoritative backend for three collections: the
//! canonical catalog (shared, append-only), per-user personal annotations,
//! and the per-user friend graph (read-only here). Implementations expose
//! point lookups, a set lookup capped at [`MAX_LOOKUP_BATCH`] identifiers per
//! call, point writes and deletes, and live subscriptions that emit full
//! snapshots of a collection.

use async_trait::async_trait;
use bookstack_domain::{CanonicalBook, ItemId, PersonalAnnotation, UserId, UserProfile};
use tokio::sync::mpsc;

/// Maximum identifier cardinality accepted by a single `catalog_get_many`
/// call, the minimum supported across target backing stores for member-of
/// filter queries.
pub const MAX_LOOKUP_BATCH: usize = 10;

/// Errors from the backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    #[error("Item already exists: {0}")]
    AlreadyExists(ItemId),

    #[error("Batch of {0} exceeds the {MAX_LOOKUP_BATCH}-id lookup limit")]
    BatchTooLarge(usize),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Live subscription to one owner's annotation collection.
///
/// Yields the full current snapshot on every change: the initial state first,
/// then one snapshot per mutation. Dropping the subscription releases it.
pub struct AnnotationSubscription {
    rx: mpsc::UnboundedReceiver<Vec<PersonalAnnotation>>,
}

impl AnnotationSubscription {
    pub fn new(rx: mpsc::UnboundedReceiver<Vec<PersonalAnnotation>>) -> Self {
        Self { rx }
    }

    /// Next snapshot, or `None` once the store side has closed.
    pub async fn next(&mut self) -> Option<Vec<PersonalAnnotation>> {
        self.rx.recv().await
    }
}

/// Live subscription to one user's friend set, same snapshot semantics.
pub struct FriendSubscription {
    rx: mpsc::UnboundedReceiver<Vec<UserId>>,
}

impl FriendSubscription {
    pub fn new(rx: mpsc::UnboundedReceiver<Vec<UserId>>) -> Self {
        Self { rx }
    }

    pub async fn next(&mut self) -> Option<Vec<UserId>> {
        self.rx.recv().await
    }
}

/// The trait that all backing stores implement.
#[async_trait]
pub trait ShelfStore: Send + Sync {
    /// Point lookup of a canonical record.
    async fn catalog_get(&self, id: &ItemId) -> Result<Option<CanonicalBook>, StoreError>;

    /// Set lookup of canonical records, at most [`MAX_LOOKUP_BATCH`] ids per
    /// call. Ids with no matching record are simply absent from the result.
    async fn catalog_get_many(&self, ids: &[ItemId]) -> Result<Vec<CanonicalBook>, StoreError>;

    /// Point create of a canonical record. Fails with `AlreadyExists` if the
    /// id is taken; callers wanting idempotent-create orchestrate around it.
    async fn catalog_create(&self, book: CanonicalBook) -> Result<(), StoreError>;

    /// Point lookup of one annotation by `(owner, item)`.
    async fn annotation_get(
        &self,
        owner: &UserId,
        item: &ItemId,
    ) -> Result<Option<PersonalAnnotation>, StoreError>;

    /// Create or replace an annotation owned by `annotation.owner_id`.
    async fn annotation_put(&self, annotation: PersonalAnnotation) -> Result<(), StoreError>;

    /// Update rating and/or review on an existing annotation. `None` leaves a
    /// field untouched; `date_added` is immutable.
    async fn annotation_update(
        &self,
        owner: &UserId,
        item: &ItemId,
        rating: Option<bookstack_domain::Rating>,
        review_text: Option<String>,
    ) -> Result<(), StoreError>;

    /// Delete one annotation. The canonical record is left untouched.
    async fn annotation_delete(&self, owner: &UserId, item: &ItemId) -> Result<(), StoreError>;

    /// Current friend set of a user.
    async fn friends(&self, user: &UserId) -> Result<Vec<UserId>, StoreError>;

    /// Public profile of a user, if any.
    async fn profile(&self, user: &UserId) -> Result<Option<UserProfile>, StoreError>;

    /// Subscribe to an owner's annotation collection.
    async fn subscribe_annotations(
        &self,
        owner: &UserId,
    ) -> Result<AnnotationSubscription, StoreError>;

    /// Subscribe to a user's friend set.
    async fn subscribe_friends(&self, user: &UserId) -> Result<FriendSubscription, StoreError>;
}
