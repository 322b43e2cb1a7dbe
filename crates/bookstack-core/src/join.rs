//! Live join engine
//!
//! One engine per watched owner. The engine holds a live subscription to the
//! owner's annotation collection; every snapshot triggers a join cycle that
//! re-resolves the referenced canonical records and publishes a fully joined
//! view. Lifecycle: `Idle -> Subscribed -> (Emitting)* -> Unsubscribed`;
//! teardown is terminal, and watching a different owner requires a new
//! instance.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bookstack_domain::{CanonicalBook, ItemId, JoinedBook, PersonalAnnotation, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::resolver::{BatchedResolver, ResolveError};
use crate::store::{AnnotationSubscription, ShelfStore, MAX_LOOKUP_BATCH};

/// Freshness of a published view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ViewStatus {
    Fresh,
    /// The last join cycle failed to resolve; the books shown are the
    /// previous successful join, retained rather than cleared.
    Stale { error: String },
}

/// UI-ready result of one join cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShelfView {
    pub owner: UserId,
    pub books: Vec<JoinedBook>,
    pub status: ViewStatus,
}

impl ShelfView {
    pub fn empty(owner: UserId) -> Self {
        Self {
            owner,
            books: Vec::new(),
            status: ViewStatus::Fresh,
        }
    }
}

struct CycleOutcome {
    annotations: Vec<PersonalAnnotation>,
    resolved: std::result::Result<std::collections::HashMap<ItemId, CanonicalBook>, ResolveError>,
}

type JoinCycle = Pin<Box<dyn Future<Output = CycleOutcome> + Send>>;

/// Live subscription joining one owner's annotations with canonical records.
pub struct LiveJoinEngine {
    owner: UserId,
    views: watch::Receiver<ShelfView>,
    task: JoinHandle<()>,
}

impl LiveJoinEngine {
    /// Subscribe to `owner`'s annotation collection and start emitting views.
    pub async fn subscribe(store: Arc<dyn ShelfStore>, owner: UserId) -> Result<Self> {
        Self::subscribe_with_chunk(store, owner, MAX_LOOKUP_BATCH).await
    }

    /// Same, with an explicit resolver chunk size.
    pub async fn subscribe_with_chunk(
        store: Arc<dyn ShelfStore>,
        owner: UserId,
        chunk_size: usize,
    ) -> Result<Self> {
        let subscription = store.subscribe_annotations(&owner).await?;
        let resolver = BatchedResolver::with_chunk_size(store, chunk_size);
        let (tx, rx) = watch::channel(ShelfView::empty(owner.clone()));
        tracing::debug!(owner = %owner, "Live join engine subscribed");
        let task = tokio::spawn(join_loop(resolver, owner.clone(), subscription, tx));
        Ok(Self {
            owner,
            views: rx,
            task,
        })
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Watch the emitted views. The receiver always holds the latest view.
    pub fn views(&self) -> watch::Receiver<ShelfView> {
        self.views.clone()
    }

    /// Tear the engine down. Consumes the handle: a torn-down engine is
    /// terminal and cannot be re-subscribed.
    pub fn shutdown(self) {}
}

impl Drop for LiveJoinEngine {
    fn drop(&mut self) {
        // aborting the task drops any in-flight join cycle, so a late
        // resolution can never reach a torn-down consumer
        self.task.abort();
        tracing::debug!(owner = %self.owner, "Live join engine torn down");
    }
}

async fn join_loop(
    resolver: BatchedResolver,
    owner: UserId,
    mut subscription: AnnotationSubscription,
    tx: watch::Sender<ShelfView>,
) {
    let mut pending: Option<JoinCycle> = None;
    loop {
        tokio::select! {
            snapshot = subscription.next() => match snapshot {
                Some(annotations) => {
                    // last-started-wins: a newer snapshot supersedes any
                    // in-flight resolution, whose completion is discarded
                    if pending.take().is_some() {
                        tracing::debug!(owner = %owner, "Superseding in-flight resolution");
                    }
                    pending = Some(start_cycle(resolver.clone(), annotations));
                }
                None => break,
            },
            outcome = poll_cycle(&mut pending), if pending.is_some() => {
                pending = None;
                publish(&tx, &owner, outcome);
            }
        }
    }
    tracing::debug!(owner = %owner, "Annotation subscription closed");
}

fn start_cycle(resolver: BatchedResolver, annotations: Vec<PersonalAnnotation>) -> JoinCycle {
    Box::pin(async move {
        let ids: Vec<ItemId> = annotations.iter().map(|a| a.item_id.clone()).collect();
        let resolved = resolver.resolve_many(&ids).await;
        CycleOutcome {
            annotations,
            resolved,
        }
    })
}

async fn poll_cycle(pending: &mut Option<JoinCycle>) -> CycleOutcome {
    match pending.as_mut() {
        Some(cycle) => cycle.await,
        None => std::future::pending().await,
    }
}

fn publish(tx: &watch::Sender<ShelfView>, owner: &UserId, outcome: CycleOutcome) {
    match outcome.resolved {
        Ok(canonical) => {
            // one joined book per annotation, never dropped; missing
            // canonical data degrades per field
            let books = outcome
                .annotations
                .into_iter()
                .map(|annotation| {
                    let record = canonical.get(&annotation.item_id);
                    JoinedBook::join(annotation, record)
                })
                .collect();
            tx.send_replace(ShelfView {
                owner: owner.clone(),
                books,
                status: ViewStatus::Fresh,
            });
        }
        Err(error) => {
            tracing::warn!(owner = %owner, "Join cycle failed: {error}");
            tx.send_modify(|view| {
                view.status = ViewStatus::Stale {
                    error: error.to_string(),
                };
            });
        }
    }
}
