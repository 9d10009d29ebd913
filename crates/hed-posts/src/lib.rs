//! Post storage for the Health Equity Dashboard.
//!
//! Posts live in a single SQLite table. Each post keeps its body as
//! placeholder text with an ordered image list beside it; see
//! [`hed_markup`] for the markup itself.
//!
//! Historical records (paragraph arrays with keyed image maps) are folded
//! into the same shape once, through [`LegacyPost`] and
//! [`PostStore::import_legacy`].

mod error;
mod legacy;
mod post;
mod store;

pub use error::PostError;
pub use legacy::{LegacyContent, LegacyImages, LegacyPost, LegacyTimestamp};
pub use post::{NewPost, Post, PostUpdate};
pub use store::PostStore;
