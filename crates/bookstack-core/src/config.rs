//! Core configuration

use crate::aggregate::TOP_CATEGORY_COUNT;
use crate::store::MAX_LOOKUP_BATCH;
use serde::{Deserialize, Serialize};

/// Tuning knobs for the aggregation core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Identifiers per chunked catalog lookup. Never exceeds the backing
    /// store's documented [`MAX_LOOKUP_BATCH`].
    pub lookup_chunk_size: usize,
    /// Number of categories the frequency ranking keeps.
    pub top_category_count: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            lookup_chunk_size: MAX_LOOKUP_BATCH,
            top_category_count: TOP_CATEGORY_COUNT,
        }
    }
}

impl CoreConfig {
    /// Clamp the chunk size into the range the backing store supports.
    pub fn clamped(mut self) -> Self {
        self.lookup_chunk_size = self.lookup_chunk_size.clamp(1, MAX_LOOKUP_BATCH);
        self
    }
}
