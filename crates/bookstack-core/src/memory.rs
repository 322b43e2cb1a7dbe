//! In-memory backing store
//!
//! A process-local [`ShelfStore`] used by tests and embedded callers. Live
//! subscriptions receive the full collection snapshot immediately and again
//! after every mutation; closed subscribers are pruned lazily. Test knobs
//! (call counting, failure injection, per-call lookup delays) drive the
//! resolution-failure and stale-result paths without a real backend.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use bookstack_domain::{CanonicalBook, ItemId, PersonalAnnotation, Rating, UserId, UserProfile};
use tokio::sync::mpsc;

use crate::store::{
    AnnotationSubscription, FriendSubscription, ShelfStore, StoreError, MAX_LOOKUP_BATCH,
};

#[derive(Default)]
struct Collections {
    catalog: HashMap<ItemId, CanonicalBook>,
    annotations: HashMap<UserId, BTreeMap<ItemId, PersonalAnnotation>>,
    friends: HashMap<UserId, Vec<UserId>>,
    profiles: HashMap<UserId, UserProfile>,
    annotation_subs: HashMap<UserId, Vec<mpsc::UnboundedSender<Vec<PersonalAnnotation>>>>,
    friend_subs: HashMap<UserId, Vec<mpsc::UnboundedSender<Vec<UserId>>>>,
}

impl Collections {
    fn annotation_snapshot(&self, owner: &UserId) -> Vec<PersonalAnnotation> {
        self.annotations
            .get(owner)
            .map(|per_item| per_item.values().cloned().collect())
            .unwrap_or_default()
    }

    fn notify_annotations(&mut self, owner: &UserId) {
        let snapshot = self.annotation_snapshot(owner);
        if let Some(senders) = self.annotation_subs.get_mut(owner) {
            senders.retain(|tx| tx.send(snapshot.clone()).is_ok());
        }
    }

    fn notify_friends(&mut self, user: &UserId) {
        let snapshot = self.friends.get(user).cloned().unwrap_or_default();
        if let Some(senders) = self.friend_subs.get_mut(user) {
            senders.retain(|tx| tx.send(snapshot.clone()).is_ok());
        }
    }
}

/// Process-local `ShelfStore`.
#[derive(Default)]
pub struct MemoryShelfStore {
    collections: RwLock<Collections>,
    lookup_calls: AtomicUsize,
    fail_lookups: AtomicBool,
    fail_writes: AtomicBool,
    lookup_delays: Mutex<VecDeque<Duration>>,
}

impl MemoryShelfStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a canonical record directly, bypassing create semantics.
    pub fn seed_catalog(&self, book: CanonicalBook) {
        let mut collections = self.collections.write().unwrap();
        collections.catalog.insert(book.item_id.clone(), book);
    }

    /// Register a user profile.
    pub fn insert_profile(&self, profile: UserProfile) {
        let mut collections = self.collections.write().unwrap();
        collections.profiles.insert(profile.user_id.clone(), profile);
    }

    /// Replace a user's friend set and notify friend subscribers.
    pub fn set_friends(&self, user: &UserId, friends: Vec<UserId>) {
        let mut collections = self.collections.write().unwrap();
        collections.friends.insert(user.clone(), friends);
        collections.notify_friends(user);
    }

    /// Number of `catalog_get_many` calls served so far.
    pub fn lookup_call_count(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent batch lookups fail with a backend error.
    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Queue a delay applied to the next batch lookup (one entry per call).
    pub fn push_lookup_delay(&self, delay: Duration) {
        self.lookup_delays.lock().unwrap().push_back(delay);
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Backend("injected write failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ShelfStore for MemoryShelfStore {
    async fn catalog_get(&self, id: &ItemId) -> Result<Option<CanonicalBook>, StoreError> {
        let collections = self.collections.read().unwrap();
        Ok(collections.catalog.get(id).cloned())
    }

    async fn catalog_get_many(&self, ids: &[ItemId]) -> Result<Vec<CanonicalBook>, StoreError> {
        if ids.len() > MAX_LOOKUP_BATCH {
            return Err(StoreError::BatchTooLarge(ids.len()));
        }
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.lookup_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected lookup failure".to_string()));
        }

        let collections = self.collections.read().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| collections.catalog.get(id).cloned())
            .collect())
    }

    async fn catalog_create(&self, book: CanonicalBook) -> Result<(), StoreError> {
        self.check_write()?;
        let mut collections = self.collections.write().unwrap();
        if collections.catalog.contains_key(&book.item_id) {
            return Err(StoreError::AlreadyExists(book.item_id));
        }
        collections.catalog.insert(book.item_id.clone(), book);
        Ok(())
    }

    async fn annotation_get(
        &self,
        owner: &UserId,
        item: &ItemId,
    ) -> Result<Option<PersonalAnnotation>, StoreError> {
        let collections = self.collections.read().unwrap();
        Ok(collections
            .annotations
            .get(owner)
            .and_then(|per_item| per_item.get(item))
            .cloned())
    }

    async fn annotation_put(&self, annotation: PersonalAnnotation) -> Result<(), StoreError> {
        self.check_write()?;
        let owner = annotation.owner_id.clone();
        let mut collections = self.collections.write().unwrap();
        collections
            .annotations
            .entry(owner.clone())
            .or_default()
            .insert(annotation.item_id.clone(), annotation);
        collections.notify_annotations(&owner);
        Ok(())
    }

    async fn annotation_update(
        &self,
        owner: &UserId,
        item: &ItemId,
        rating: Option<Rating>,
        review_text: Option<String>,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        let mut collections = self.collections.write().unwrap();
        let annotation = collections
            .annotations
            .get_mut(owner)
            .and_then(|per_item| per_item.get_mut(item))
            .ok_or_else(|| StoreError::NotFound(item.clone()))?;
        if let Some(rating) = rating {
            annotation.rating = Some(rating);
        }
        if let Some(review_text) = review_text {
            annotation.review_text = review_text;
        }
        collections.notify_annotations(owner);
        Ok(())
    }

    async fn annotation_delete(&self, owner: &UserId, item: &ItemId) -> Result<(), StoreError> {
        self.check_write()?;
        let mut collections = self.collections.write().unwrap();
        let removed = collections
            .annotations
            .get_mut(owner)
            .and_then(|per_item| per_item.remove(item));
        if removed.is_none() {
            return Err(StoreError::NotFound(item.clone()));
        }
        collections.notify_annotations(owner);
        Ok(())
    }

    async fn friends(&self, user: &UserId) -> Result<Vec<UserId>, StoreError> {
        let collections = self.collections.read().unwrap();
        Ok(collections.friends.get(user).cloned().unwrap_or_default())
    }

    async fn profile(&self, user: &UserId) -> Result<Option<UserProfile>, StoreError> {
        let collections = self.collections.read().unwrap();
        Ok(collections.profiles.get(user).cloned())
    }

    async fn subscribe_annotations(
        &self,
        owner: &UserId,
    ) -> Result<AnnotationSubscription, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut collections = self.collections.write().unwrap();
        let snapshot = collections.annotation_snapshot(owner);
        // initial snapshot, then one per mutation
        let _ = tx.send(snapshot);
        collections
            .annotation_subs
            .entry(owner.clone())
            .or_default()
            .push(tx);
        Ok(AnnotationSubscription::new(rx))
    }

    async fn subscribe_friends(&self, user: &UserId) -> Result<FriendSubscription, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut collections = self.collections.write().unwrap();
        let snapshot = collections.friends.get(user).cloned().unwrap_or_default();
        let _ = tx.send(snapshot);
        collections
            .friend_subs
            .entry(user.clone())
            .or_default()
            .push(tx);
        Ok(FriendSubscription::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_rejects_existing_ids() {
        let store = MemoryShelfStore::new();
        let book = CanonicalBook::new(ItemId::new("b1"), "Dune");
        store.catalog_create(book.clone()).await.unwrap();
        let err = store.catalog_create(book).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn batch_lookup_enforces_cardinality_limit() {
        let store = MemoryShelfStore::new();
        let ids: Vec<ItemId> = (0..11).map(|i| ItemId::new(format!("b{i}"))).collect();
        let err = store.catalog_get_many(&ids).await.unwrap_err();
        assert!(matches!(err, StoreError::BatchTooLarge(11)));
    }

    #[tokio::test]
    async fn subscription_sees_initial_snapshot_and_mutations() {
        let store = MemoryShelfStore::new();
        let owner = UserId::new("u1");
        let mut sub = store.subscribe_annotations(&owner).await.unwrap();
        assert_eq!(sub.next().await.unwrap(), vec![]);

        store
            .annotation_put(PersonalAnnotation::new(owner.clone(), ItemId::new("b1")))
            .await
            .unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].item_id, ItemId::new("b1"));

        store
            .annotation_delete(&owner, &ItemId::new("b1"))
            .await
            .unwrap();
        assert_eq!(sub.next().await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn update_preserves_date_added() {
        let store = MemoryShelfStore::new();
        let owner = UserId::new("u1");
        let annotation = PersonalAnnotation::new(owner.clone(), ItemId::new("b1"));
        let added = annotation.date_added;
        store.annotation_put(annotation).await.unwrap();

        store
            .annotation_update(
                &owner,
                &ItemId::new("b1"),
                Some(Rating::new(3).unwrap()),
                Some("solid".to_string()),
            )
            .await
            .unwrap();

        let updated = store
            .annotation_get(&owner, &ItemId::new("b1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.date_added, added);
        assert_eq!(updated.rating.unwrap().stars(), 3);
        assert_eq!(updated.review_text, "solid");
    }

    #[tokio::test]
    async fn dropped_subscribers_are_pruned() {
        let store = MemoryShelfStore::new();
        let owner = UserId::new("u1");
        let sub = store.subscribe_annotations(&owner).await.unwrap();
        drop(sub);
        // next mutation prunes the dead sender without error
        store
            .annotation_put(PersonalAnnotation::new(owner.clone(), ItemId::new("b1")))
            .await
            .unwrap();
        let collections = store.collections.read().unwrap();
        assert!(collections.annotation_subs.get(&owner).unwrap().is_empty());
    }
}
