//! Batched reference resolver
//!
//! Resolves an unordered set of item identifiers to canonical records,
//! transparently chunking requests so no single store call exceeds the
//! [`MAX_LOOKUP_BATCH`] cardinality limit. Chunks execute concurrently and
//! merge into one mapping; a failed chunk fails the whole resolution, so
//! callers can distinguish "record absent" (expected, id missing from the
//! result) from "resolution failed" (exceptional).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bookstack_domain::{CanonicalBook, ItemId};
use tokio::task::JoinSet;

use crate::store::{ShelfStore, StoreError, MAX_LOOKUP_BATCH};

/// Errors from a batched resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A chunk lookup failed; the whole resolution is abandoned.
    #[error("Chunk lookup failed: {0}")]
    Store(#[from] StoreError),

    /// A chunk task was cancelled or panicked.
    #[error("Chunk task failed: {0}")]
    Task(String),
}

/// Chunked, concurrent catalog lookup.
#[derive(Clone)]
pub struct BatchedResolver {
    store: Arc<dyn ShelfStore>,
    chunk_size: usize,
}

impl BatchedResolver {
    pub fn new(store: Arc<dyn ShelfStore>) -> Self {
        Self::with_chunk_size(store, MAX_LOOKUP_BATCH)
    }

    /// Resolver with a smaller chunk size; clamped to the store limit.
    pub fn with_chunk_size(store: Arc<dyn ShelfStore>, chunk_size: usize) -> Self {
        Self {
            store,
            chunk_size: chunk_size.clamp(1, MAX_LOOKUP_BATCH),
        }
    }

    /// Resolve each identifier to its canonical record.
    ///
    /// Input order is irrelevant and duplicates are collapsed. The result key
    /// set is a subset of the input: an id with no matching record is simply
    /// absent, which is the expected unknown-item case.
    pub async fn resolve_many(
        &self,
        ids: &[ItemId],
    ) -> Result<HashMap<ItemId, CanonicalBook>, ResolveError> {
        let mut seen = HashSet::new();
        let unique: Vec<ItemId> = ids
            .iter()
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect();
        if unique.is_empty() {
            return Ok(HashMap::new());
        }

        let mut chunks = JoinSet::new();
        for chunk in unique.chunks(self.chunk_size) {
            let store = Arc::clone(&self.store);
            let chunk = chunk.to_vec();
            chunks.spawn(async move { store.catalog_get_many(&chunk).await });
        }

        let mut resolved = HashMap::with_capacity(unique.len());
        while let Some(outcome) = chunks.join_next().await {
            let books = outcome.map_err(|e| ResolveError::Task(e.to_string()))??;
            for book in books {
                resolved.insert(book.item_id.clone(), book);
            }
        }
        Ok(resolved)
    }
}
