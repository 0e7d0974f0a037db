//! Concurrent in-memory indices.
//!
//! - [`VersionedIndex`]: all revisions per id plus a derived latest-revision
//!   projection, kept consistent under concurrent access.
//! - [`EntityIndex`]: one entity per id, for unversioned types.
//! - [`MultiIndex`]: one key to many values, for relationships between ids.

mod entity;
mod multi;
mod versioned;

pub use entity::EntityIndex;
pub use multi::MultiIndex;
pub use versioned::VersionedIndex;
