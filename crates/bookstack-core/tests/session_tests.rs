//! Session coordination integration tests
//!
//! Identity transitions must reset all per-user live state: tear down the
//! previous user's engine and fan-out before establishing the next user's.

mod common;

use std::sync::Arc;

use bookstack_core::{
    CoreConfig, Identity, MemoryShelfStore, ShelfSession, ShelfStore, ViewStatus,
};
use bookstack_domain::{CanonicalBook, ItemId, PersonalAnnotation, UserId, UserProfile};
use common::wait_for;

async fn shelve(store: &MemoryShelfStore, owner: &UserId, id: &str) {
    store
        .annotation_put(PersonalAnnotation::new(owner.clone(), ItemId::new(id)))
        .await
        .unwrap();
}

fn setup() -> (Arc<MemoryShelfStore>, UserId, UserId) {
    let store = Arc::new(MemoryShelfStore::new());
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");
    store.insert_profile(UserProfile::new(alice.clone(), "Alice"));
    store.insert_profile(UserProfile::new(bob.clone(), "Bob"));
    store.seed_catalog(
        CanonicalBook::new(ItemId::new("b0"), "Book 0")
            .with_categories(vec!["Fiction".to_string(), "Drama".to_string()]),
    );
    store.seed_catalog(CanonicalBook::new(ItemId::new("b1"), "Book 1"));
    store.set_friends(&alice, vec![bob.clone()]);
    (store, alice, bob)
}

#[tokio::test]
async fn sign_in_establishes_own_and_friend_shelves() {
    let (store, alice, bob) = setup();
    shelve(&store, &alice, "b0").await;
    shelve(&store, &bob, "b1").await;

    let identity = Identity::signed_out();
    let session = ShelfSession::start(
        store.clone() as Arc<dyn ShelfStore>,
        identity.watch(),
        CoreConfig::default(),
    );
    let mut shelves = session.shelves();
    assert!(shelves.borrow().is_none());

    identity.sign_in(alice.clone());
    let active = wait_for(&mut shelves, |s| {
        s.as_ref().is_some_and(|u| u.user == alice)
    })
    .await
    .unwrap();

    let mut own = active.own_shelf();
    let own_view = wait_for(&mut own, |v| v.books.len() == 1).await;
    assert_eq!(own_view.status, ViewStatus::Fresh);
    assert_eq!(own_view.books[0].title, "Book 0");

    let mut friends = active.friend_shelf();
    let friend_view = wait_for(&mut friends, |v| v.books.len() == 1).await;
    assert_eq!(friend_view.books[0].owner_name.as_deref(), Some("Bob"));
}

#[tokio::test]
async fn switching_users_resets_all_per_user_state() {
    let (store, alice, bob) = setup();
    shelve(&store, &alice, "b0").await;
    shelve(&store, &bob, "b1").await;

    let identity = Identity::new(Some(alice.clone()));
    let session = ShelfSession::start(
        store.clone() as Arc<dyn ShelfStore>,
        identity.watch(),
        CoreConfig::default(),
    );
    let mut shelves = session.shelves();
    let as_alice = wait_for(&mut shelves, |s| {
        s.as_ref().is_some_and(|u| u.user == alice)
    })
    .await
    .unwrap();
    let mut alice_own = as_alice.own_shelf();
    wait_for(&mut alice_own, |v| v.books.len() == 1).await;

    identity.sign_in(bob.clone());
    let as_bob = wait_for(&mut shelves, |s| s.as_ref().is_some_and(|u| u.user == bob))
        .await
        .unwrap();
    let mut bob_own = as_bob.own_shelf();
    let view = wait_for(&mut bob_own, |v| v.books.len() == 1).await;
    assert_eq!(view.owner, bob);
    assert_eq!(view.books[0].title, "Book 1");
}

#[tokio::test]
async fn sign_out_clears_the_session() {
    let (store, alice, _bob) = setup();
    let identity = Identity::new(Some(alice.clone()));
    let session = ShelfSession::start(
        store.clone() as Arc<dyn ShelfStore>,
        identity.watch(),
        CoreConfig::default(),
    );
    let mut shelves = session.shelves();
    wait_for(&mut shelves, |s| s.is_some()).await;

    identity.sign_out();
    wait_for(&mut shelves, |s| s.is_none()).await;
}

#[tokio::test]
async fn top_categories_uses_the_configured_count() {
    let (store, alice, _bob) = setup();
    shelve(&store, &alice, "b0").await;
    shelve(&store, &alice, "b1").await;

    let identity = Identity::new(Some(alice.clone()));
    let session = ShelfSession::start(
        store.clone() as Arc<dyn ShelfStore>,
        identity.watch(),
        CoreConfig {
            top_category_count: 1,
            ..Default::default()
        },
    );
    let mut shelves = session.shelves();
    let active = wait_for(&mut shelves, |s| s.is_some()).await.unwrap();
    let mut own = active.own_shelf();
    let view = wait_for(&mut own, |v| v.books.len() == 2).await;

    // b0 carries Fiction+Drama, b1 carries nothing -> Unknown; top-1 keeps
    // the first-encountered of the tied leaders
    let ranked = session.top_categories(&view);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].category, "Fiction");
    assert_eq!(ranked[0].count, 1);
}
