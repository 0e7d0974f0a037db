//! Version resolution over revision sets.
//!
//! Version labels are free-form strings that usually encode an increasing
//! integer. [`VersionRank`] turns a label into a totally ordered token:
//! numeric labels compare by value, and every non-numeric label ranks below
//! every numeric one. The selection functions are generic over any iterator
//! of [`VersionedEntity`] items, so they work on `&E`, `Arc<E>` or `&Arc<E>`.

use crate::types::VersionedEntity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordering token derived from a version label.
///
/// Variant order matters: `Opaque < Numeric(_)` for any number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VersionRank {
    /// Label that does not parse as an integer.
    Opaque,
    /// Label that parses as an integer.
    Numeric(i64),
}

impl VersionRank {
    /// Rank a version label.
    pub fn of(label: &str) -> Self {
        match label.parse::<i64>() {
            Ok(n) => VersionRank::Numeric(n),
            Err(_) => VersionRank::Opaque,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, VersionRank::Numeric(_))
    }
}

impl fmt::Debug for VersionRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRank::Opaque => write!(f, "Rank(opaque)"),
            VersionRank::Numeric(n) => write!(f, "Rank({})", n),
        }
    }
}

/// Find the revision whose version label equals `version`.
///
/// Duplicate labels are a data-quality issue, not an error: the first match
/// wins.
pub fn select_by_version<I>(revisions: I, version: &str) -> Option<I::Item>
where
    I: IntoIterator,
    I::Item: VersionedEntity,
{
    revisions.into_iter().find(|e| e.version() == version)
}

/// Find the latest revision by [`VersionRank`].
///
/// Returns `None` for an empty input. When several revisions share the
/// greatest rank, the first one encountered is returned.
pub fn select_latest<I>(revisions: I) -> Option<I::Item>
where
    I: IntoIterator,
    I::Item: VersionedEntity,
{
    let mut best: Option<(VersionRank, I::Item)> = None;
    for candidate in revisions {
        let rank = VersionRank::of(candidate.version());
        let replace = match &best {
            Some((best_rank, _)) => rank > *best_rank,
            None => true,
        };
        if replace {
            best = Some((rank, candidate));
        }
    }
    best.map(|(_, e)| e)
}
