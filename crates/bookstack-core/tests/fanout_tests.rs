//! Friend fan-out integration tests

mod common;

use std::sync::Arc;

use bookstack_core::{FriendShelfAggregator, MemoryShelfStore, ShelfStore, SortKey};
use bookstack_domain::{CanonicalBook, ItemId, PersonalAnnotation, UserId, UserProfile};
use common::wait_for;

async fn shelve(store: &MemoryShelfStore, owner: &UserId, id: &str) {
    store
        .annotation_put(PersonalAnnotation::new(owner.clone(), ItemId::new(id)))
        .await
        .unwrap();
}

fn setup() -> (Arc<MemoryShelfStore>, UserId, UserId, UserId) {
    let store = Arc::new(MemoryShelfStore::new());
    let me = UserId::new("me");
    let ana = UserId::new("ana");
    let ben = UserId::new("ben");
    store.insert_profile(UserProfile::new(ana.clone(), "Ana"));
    store.insert_profile(UserProfile::new(ben.clone(), "Ben"));
    store.seed_catalog(CanonicalBook::new(ItemId::new("b0"), "Book 0"));
    store.seed_catalog(CanonicalBook::new(ItemId::new("b1"), "Book 1"));
    (store, me, ana, ben)
}

#[tokio::test]
async fn friend_with_no_items_does_not_block_the_others() {
    let (store, me, ana, ben) = setup();
    shelve(&store, &ana, "b0").await;
    shelve(&store, &ana, "b1").await;
    store.set_friends(&me, vec![ana.clone(), ben.clone()]);

    let aggregator = FriendShelfAggregator::subscribe(store.clone() as Arc<dyn ShelfStore>, me)
        .await
        .unwrap();
    let mut views = aggregator.views();
    let view = wait_for(&mut views, |v| v.books.len() == 2).await;

    // exactly Ana's two books, tagged with her display name, no placeholders
    for book in &view.books {
        assert_eq!(book.owner_id, ana);
        assert_eq!(book.owner_name.as_deref(), Some("Ana"));
    }
}

#[tokio::test]
async fn merged_view_labels_each_owner() {
    let (store, me, ana, ben) = setup();
    shelve(&store, &ana, "b0").await;
    shelve(&store, &ben, "b1").await;
    store.set_friends(&me, vec![ana.clone(), ben.clone()]);

    let aggregator = FriendShelfAggregator::subscribe(store.clone() as Arc<dyn ShelfStore>, me)
        .await
        .unwrap();
    let mut views = aggregator.views();
    let view = wait_for(&mut views, |v| v.books.len() == 2).await;

    let by_owner = |id: &UserId| {
        view.books
            .iter()
            .find(|b| &b.owner_id == id)
            .expect("owner present")
            .clone()
    };
    assert_eq!(by_owner(&ana).owner_name.as_deref(), Some("Ana"));
    assert_eq!(by_owner(&ben).owner_name.as_deref(), Some("Ben"));
}

#[tokio::test]
async fn friend_mutations_refresh_only_that_owner() {
    let (store, me, ana, ben) = setup();
    shelve(&store, &ana, "b0").await;
    store.set_friends(&me, vec![ana.clone(), ben.clone()]);

    let aggregator = FriendShelfAggregator::subscribe(store.clone() as Arc<dyn ShelfStore>, me)
        .await
        .unwrap();
    let mut views = aggregator.views();
    wait_for(&mut views, |v| v.books.len() == 1).await;

    shelve(&store, &ben, "b1").await;
    let view = wait_for(&mut views, |v| v.books.len() == 2).await;
    assert!(view.books.iter().any(|b| b.owner_id == ana));
    assert!(view.books.iter().any(|b| b.owner_id == ben));

    store
        .annotation_delete(&ana, &ItemId::new("b0"))
        .await
        .unwrap();
    let view = wait_for(&mut views, |v| v.books.len() == 1).await;
    assert_eq!(view.books[0].owner_id, ben);
}

#[tokio::test]
async fn removed_friend_disappears_from_the_merge() {
    let (store, me, ana, ben) = setup();
    shelve(&store, &ana, "b0").await;
    shelve(&store, &ben, "b1").await;
    store.set_friends(&me, vec![ana.clone(), ben.clone()]);

    let aggregator = FriendShelfAggregator::subscribe(store.clone() as Arc<dyn ShelfStore>, me.clone())
        .await
        .unwrap();
    let mut views = aggregator.views();
    wait_for(&mut views, |v| v.books.len() == 2).await;

    store.set_friends(&me, vec![ben.clone()]);
    let view = wait_for(&mut views, |v| v.books.len() == 1).await;
    assert_eq!(view.books[0].owner_id, ben);
}

#[tokio::test]
async fn sorted_by_owner_uses_display_names() {
    let (store, me, ana, ben) = setup();
    shelve(&store, &ben, "b1").await;
    shelve(&store, &ana, "b0").await;
    store.set_friends(&me, vec![ana.clone(), ben.clone()]);

    let aggregator = FriendShelfAggregator::subscribe(store.clone() as Arc<dyn ShelfStore>, me)
        .await
        .unwrap();
    let mut views = aggregator.views();
    let view = wait_for(&mut views, |v| v.books.len() == 2).await;

    let sorted = view.sorted_by(SortKey::Owner);
    assert_eq!(sorted[0].owner_name.as_deref(), Some("Ana"));
    assert_eq!(sorted[1].owner_name.as_deref(), Some("Ben"));
}
