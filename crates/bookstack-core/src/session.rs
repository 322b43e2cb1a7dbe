//! Per-user session coordination
//!
//! Owns all per-user live state: the own-shelf join engine and the friend
//! fan-out aggregator. Identity transitions tear the previous user's handles
//! down deterministically before anything is established for the next user,
//! so no subscription overlaps across users and no in-flight resolution can
//! leak a previous user's data into the new view.

use std::sync::Arc;

use bookstack_domain::UserId;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::aggregate::{top_categories, CategoryCount};
use crate::config::CoreConfig;
use crate::error::Result;
use crate::fanout::{FriendShelfAggregator, FriendView};
use crate::join::{LiveJoinEngine, ShelfView};
use crate::store::ShelfStore;

/// The live view handles for one signed-in user.
#[derive(Clone)]
pub struct UserShelves {
    pub user: UserId,
    own: watch::Receiver<ShelfView>,
    friends: watch::Receiver<FriendView>,
}

impl UserShelves {
    /// The user's own joined shelf.
    pub fn own_shelf(&self) -> watch::Receiver<ShelfView> {
        self.own.clone()
    }

    /// The merged friend shelf.
    pub fn friend_shelf(&self) -> watch::Receiver<FriendView> {
        self.friends.clone()
    }
}

struct ActiveUser {
    user: UserId,
    engine: LiveJoinEngine,
    aggregator: FriendShelfAggregator,
}

/// Watches the identity collaborator and manages per-user live state.
pub struct ShelfSession {
    config: CoreConfig,
    shelves: watch::Receiver<Option<UserShelves>>,
    task: JoinHandle<()>,
}

impl ShelfSession {
    pub fn start(
        store: Arc<dyn ShelfStore>,
        identity: watch::Receiver<Option<UserId>>,
        config: CoreConfig,
    ) -> Self {
        let config = config.clamped();
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(session_loop(store, identity, tx, config.clone()));
        Self {
            config,
            shelves: rx,
            task,
        }
    }

    /// Watch the current user's shelves; `None` while signed out.
    pub fn shelves(&self) -> watch::Receiver<Option<UserShelves>> {
        self.shelves.clone()
    }

    /// Frequency ranking over an own-shelf view, using the configured top-N.
    /// Recomputed by the caller on each emission; holds no subscription.
    pub fn top_categories(&self, view: &ShelfView) -> Vec<CategoryCount> {
        top_categories(&view.books, self.config.top_category_count)
    }

    pub fn shutdown(self) {}
}

impl Drop for ShelfSession {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("Shelf session stopped");
    }
}

async fn session_loop(
    store: Arc<dyn ShelfStore>,
    mut identity: watch::Receiver<Option<UserId>>,
    tx: watch::Sender<Option<UserShelves>>,
    config: CoreConfig,
) {
    let mut active: Option<ActiveUser> = None;
    loop {
        let target = identity.borrow_and_update().clone();
        let switch = match (&active, &target) {
            (None, None) => false,
            (Some(current), Some(next)) => current.user != *next,
            _ => true,
        };

        if switch {
            if let Some(previous) = active.take() {
                tracing::info!(user = %previous.user, "Tearing down session state");
                // dropping aborts both tasks and cancels in-flight work
                drop(previous);
                tx.send_replace(None);
            }
            if let Some(user) = target {
                match establish(&store, user.clone(), &config).await {
                    Ok(next) => {
                        let shelves = UserShelves {
                            user: user.clone(),
                            own: next.engine.views(),
                            friends: next.aggregator.views(),
                        };
                        active = Some(next);
                        tx.send_replace(Some(shelves));
                        tracing::info!(user = %user, "Session state established");
                    }
                    Err(error) => {
                        tracing::warn!(user = %user, "Failed to establish session state: {error}");
                        tx.send_replace(None);
                    }
                }
            }
        }

        if identity.changed().await.is_err() {
            break;
        }
    }
}

async fn establish(
    store: &Arc<dyn ShelfStore>,
    user: UserId,
    config: &CoreConfig,
) -> Result<ActiveUser> {
    let engine = LiveJoinEngine::subscribe_with_chunk(
        Arc::clone(store),
        user.clone(),
        config.lookup_chunk_size,
    )
    .await?;
    let aggregator = FriendShelfAggregator::subscribe_with_chunk(
        Arc::clone(store),
        user.clone(),
        config.lookup_chunk_size,
    )
    .await?;
    Ok(ActiveUser {
        user,
        engine,
        aggregator,
    })
}
