//! bookstack-core: denormalized shelf aggregation and live-sync layer
//!
//! This crate provides the core functionality behind the bookstack shelf
//! views:
//!
//! - **Store**: backing-store traits with point/batch lookups (10-id batch
//!   limit) and full-snapshot live subscriptions, plus an in-memory impl
//! - **Resolver**: chunked, concurrent resolution of item-id sets to
//!   canonical records
//! - **Join**: per-owner live join engine producing UI-ready shelf views,
//!   with per-field degradation and last-started-wins discard
//! - **Fanout**: one join engine per friend, merged into a single labeled
//!   view
//! - **Aggregate**: top-category frequency ranking
//! - **Sort**: stable, collation-keyed presentation sorting
//! - **Service**: the write path (shelve, review, remove) over the split
//!   canonical/personal records
//! - **Identity / Session**: sign-in transitions resetting all per-user
//!   subscriptions
//!
//! The crate is a library consumed by a presentation layer; it owns no wire
//! format or CLI surface and assumes eventual consistency for cross-user
//! views.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod fanout;
pub mod identity;
pub mod join;
pub mod memory;
pub mod resolver;
pub mod service;
pub mod session;
pub mod sort;
pub mod store;

pub use aggregate::{top_categories, CategoryCount, TOP_CATEGORY_COUNT, UNKNOWN_CATEGORY};
pub use config::CoreConfig;
pub use error::{CoreError, Result};
pub use fanout::{FriendShelfAggregator, FriendView};
pub use identity::Identity;
pub use join::{LiveJoinEngine, ShelfView, ViewStatus};
pub use memory::MemoryShelfStore;
pub use resolver::{BatchedResolver, ResolveError};
pub use service::ShelfService;
pub use session::{ShelfSession, UserShelves};
pub use sort::{collation_key, sort_books, SortKey};
pub use store::{
    AnnotationSubscription, FriendSubscription, ShelfStore, StoreError, MAX_LOOKUP_BATCH,
};
