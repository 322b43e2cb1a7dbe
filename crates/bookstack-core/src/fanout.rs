//! Friend fan-out aggregation
//!
//! One [`LiveJoinEngine`] per friend, held in a managed map keyed by friend
//! id so teardown is enumerable and total. Each engine emission replaces that
//! owner's slice of the merged view; the merge is the union of the latest
//! known state per friend, so one friend's emptiness or silence never blocks
//! the others. Items are tagged with the owning friend's display name.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use bookstack_domain::{JoinedBook, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::join::LiveJoinEngine;
use crate::sort::{sort_books, SortKey};
use crate::store::{FriendSubscription, ShelfStore, MAX_LOOKUP_BATCH};

/// Merged view over all watched friends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FriendView {
    pub books: Vec<JoinedBook>,
}

impl FriendView {
    pub fn empty() -> Self {
        Self { books: Vec::new() }
    }

    /// Copy of the merged books, stably sorted by the given key.
    pub fn sorted_by(&self, key: SortKey) -> Vec<JoinedBook> {
        let mut books = self.books.clone();
        sort_books(&mut books, key);
        books
    }
}

struct FriendHandle {
    // held for ownership: dropping the handle tears the engine down
    _engine: LiveJoinEngine,
    relay: JoinHandle<()>,
}

impl Drop for FriendHandle {
    fn drop(&mut self) {
        // the engine aborts itself on drop; the relay must go with it
        self.relay.abort();
    }
}

/// Watches the caller's friend set and aggregates all friends' shelves.
pub struct FriendShelfAggregator {
    user: UserId,
    views: watch::Receiver<FriendView>,
    task: JoinHandle<()>,
}

impl FriendShelfAggregator {
    pub async fn subscribe(store: Arc<dyn ShelfStore>, user: UserId) -> Result<Self> {
        Self::subscribe_with_chunk(store, user, MAX_LOOKUP_BATCH).await
    }

    pub async fn subscribe_with_chunk(
        store: Arc<dyn ShelfStore>,
        user: UserId,
        chunk_size: usize,
    ) -> Result<Self> {
        let subscription = store.subscribe_friends(&user).await?;
        let (tx, rx) = watch::channel(FriendView::empty());
        tracing::debug!(user = %user, "Friend fan-out subscribed");
        let task = tokio::spawn(fanout_loop(store, user.clone(), subscription, tx, chunk_size));
        Ok(Self {
            user,
            views: rx,
            task,
        })
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn views(&self) -> watch::Receiver<FriendView> {
        self.views.clone()
    }

    /// Tear down all friend watchers. Terminal, like the underlying engines.
    pub fn shutdown(self) {}
}

impl Drop for FriendShelfAggregator {
    fn drop(&mut self) {
        // dropping the task drops the handle map, tearing down every friend
        // engine and cancelling their in-flight resolutions
        self.task.abort();
        tracing::debug!(user = %self.user, "Friend fan-out torn down");
    }
}

async fn fanout_loop(
    store: Arc<dyn ShelfStore>,
    user: UserId,
    mut subscription: FriendSubscription,
    tx: watch::Sender<FriendView>,
    chunk_size: usize,
) {
    let (update_tx, mut update_rx) = mpsc::unbounded_channel::<(UserId, Vec<JoinedBook>)>();
    let mut engines: BTreeMap<UserId, FriendHandle> = BTreeMap::new();
    // latest known joined books per friend, replaced wholesale per emission
    let mut latest: BTreeMap<UserId, Vec<JoinedBook>> = BTreeMap::new();

    loop {
        tokio::select! {
            snapshot = subscription.next() => match snapshot {
                Some(friend_ids) => {
                    let target: HashSet<UserId> = friend_ids.into_iter().collect();

                    let removed: Vec<UserId> = engines
                        .keys()
                        .filter(|id| !target.contains(*id))
                        .cloned()
                        .collect();
                    for friend in removed {
                        engines.remove(&friend);
                        latest.remove(&friend);
                        tracing::debug!(user = %user, friend = %friend, "Friend watcher torn down");
                    }

                    for friend in target {
                        if engines.contains_key(&friend) {
                            continue;
                        }
                        match watch_friend(&store, friend.clone(), update_tx.clone(), chunk_size).await {
                            Ok(handle) => {
                                engines.insert(friend, handle);
                            }
                            Err(error) => {
                                tracing::warn!(user = %user, friend = %friend, "Skipping friend watcher: {error}");
                            }
                        }
                    }

                    publish(&tx, &latest);
                }
                None => break,
            },
            Some((friend, books)) = update_rx.recv() => {
                // a torn-down friend's late emission must not resurface
                if engines.contains_key(&friend) {
                    latest.insert(friend, books);
                    publish(&tx, &latest);
                }
            }
        }
    }
    tracing::debug!(user = %user, "Friend subscription closed");
}

async fn watch_friend(
    store: &Arc<dyn ShelfStore>,
    friend: UserId,
    update_tx: mpsc::UnboundedSender<(UserId, Vec<JoinedBook>)>,
    chunk_size: usize,
) -> Result<FriendHandle> {
    let display_name = store
        .profile(&friend)
        .await?
        .map(|profile| profile.display_name);
    let engine =
        LiveJoinEngine::subscribe_with_chunk(Arc::clone(store), friend.clone(), chunk_size).await?;
    let mut views = engine.views();

    let relay = tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().clone();
            let books: Vec<JoinedBook> = view
                .books
                .into_iter()
                .map(|book| book.with_owner_name(display_name.clone()))
                .collect();
            if update_tx.send((friend.clone(), books)).is_err() {
                break;
            }
        }
    });

    Ok(FriendHandle {
        _engine: engine,
        relay,
    })
}

fn publish(tx: &watch::Sender<FriendView>, latest: &BTreeMap<UserId, Vec<JoinedBook>>) {
    let books: Vec<JoinedBook> = latest.values().flatten().cloned().collect();
    tx.send_replace(FriendView { books });
}
