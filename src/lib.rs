//! # Transit Index
//!
//! A concurrent, in-memory index over transit data entities (stops, lines,
//! journeys, ...) that may exist in several revisions under one id.
//!
//! ## Core Concepts
//!
//! - **Revision set**: every stored revision of an entity, keyed by id
//! - **Latest projection**: the single newest revision per id, recomputed
//!   on every mutation that touches the id
//! - **Version rank**: numeric labels order by value, anything else ranks
//!   lowest
//!
//! ## Example
//!
//! ```
//! use transit_index::{Entity, VersionedEntity, VersionedIndex};
//!
//! struct Quay {
//!     id: String,
//!     version: String,
//! }
//!
//! impl Entity for Quay {
//!     fn id(&self) -> &str {
//!         &self.id
//!     }
//! }
//!
//! impl VersionedEntity for Quay {
//!     fn version(&self) -> &str {
//!         &self.version
//!     }
//! }
//!
//! let quays: VersionedIndex<Quay> = VersionedIndex::new();
//! quays.put_all(vec![
//!     Quay { id: "NSR:Quay:1".into(), version: "1".into() },
//!     Quay { id: "NSR:Quay:1".into(), version: "2".into() },
//! ]);
//!
//! assert_eq!(quays.get_latest_version("NSR:Quay:1").unwrap().version, "2");
//! assert_eq!(quays.get_all_versions("NSR:Quay:1").len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod types;
pub mod version;

// Re-exports
pub use config::IndexConfig;
pub use error::{IndexError, Result};
pub use index::{EntityIndex, MultiIndex, VersionedIndex};
pub use types::{Entity, IndexStats, VersionedEntity};
pub use version::{select_by_version, select_latest, VersionRank};
