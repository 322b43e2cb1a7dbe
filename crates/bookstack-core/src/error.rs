//! Error types for bookstack-core

use thiserror::Error;

use crate::resolver::ResolveError;
use crate::store::StoreError;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Backing-store errors (lookups, writes, subscriptions)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Batched reference resolution failed as a whole
    #[error("Resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    /// Invalid rating supplied by a caller
    #[error(transparent)]
    Rating(#[from] bookstack_domain::RatingOutOfRange),

    /// Canonical record rejected by validation
    #[error("Invalid canonical record: {0}")]
    InvalidRecord(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstack_domain::Rating;

    #[test]
    fn rating_error_passes_through() {
        let err = Rating::new(9).unwrap_err();
        let core: CoreError = err.into();
        assert!(core.to_string().contains("between 1 and 5"));
    }

    #[test]
    fn store_error_display() {
        let core: CoreError = StoreError::Backend("connection reset".to_string()).into();
        assert!(core.to_string().contains("connection reset"));
    }
}
