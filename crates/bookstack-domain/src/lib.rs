//! Domain types shared between the bookstack core and its collaborators
//!
//! This crate provides the canonical data model for the shelf system:
//! - CanonicalBook: shared, owner-independent metadata, stored once per item
//! - PersonalAnnotation: per-user mutable state layered on a canonical record
//! - JoinedBook: the derived view model produced by a join cycle
//! - Rating: validated 1-5 rating, absence expressed as `Option<Rating>`
//! - UserId / ItemId / UserProfile: identity newtypes and friend profiles
//! - Validation helpers for canonical records

pub mod annotation;
pub mod book;
pub mod joined;
pub mod user;
pub mod validation;

pub use annotation::{PersonalAnnotation, Rating, RatingOutOfRange};
pub use book::CanonicalBook;
pub use joined::{JoinedBook, UNKNOWN_TITLE};
pub use user::{ItemId, UserId, UserProfile};
pub use validation::{is_storable, validate_canonical, ValidationIssue, ValidationSeverity};
