// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Candidate work items.
//!
//! A [`BucketPart`] is one unit of evaluation work: a contiguous range of
//! symbol instances from one tile's bucket for one layer. Engines create
//! parts during collection and the scheduler hands them back, one at a time,
//! during evaluation.

use core::cmp::Ordering;
use core::fmt;

/// Identifies a tile.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(pub u32);

impl fmt::Debug for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileId({})", self.0)
    }
}

/// Identifies one logical symbol across all the tiles it appears in.
///
/// A label near a tile edge is present in the bucket of every tile it
/// touches. All copies share a `CrossTileId`, which lets a pass evaluate the
/// symbol only once.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CrossTileId(pub u32);

impl fmt::Debug for CrossTileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CrossTileId({})", self.0)
    }
}

/// One unit of placement work.
///
/// `P` is engine-specific data needed to evaluate the part (typically a
/// handle to the bucket and the tile's placement parameters). The scheduler
/// never looks inside it.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketPart<P> {
    /// The tile the part was extracted from.
    pub tile: TileId,
    /// Priority used by the cross-tile sort; lower keys are placed first.
    pub sort_key: Option<f64>,
    /// Index of the first symbol instance in this part.
    pub symbol_instance_start: u32,
    /// Index one past the last symbol instance in this part.
    pub symbol_instance_end: u32,
    /// Engine data.
    pub parameters: P,
}

impl<P> BucketPart<P> {
    /// Returns whether this part starts its bucket.
    ///
    /// The engine resets per-bucket evaluation state when it sees the first
    /// part of a bucket.
    #[inline]
    #[must_use]
    pub const fn is_first_of_collection(&self) -> bool {
        self.symbol_instance_start == 0
    }

    /// Returns the number of symbol instances in this part.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.symbol_instance_end.saturating_sub(self.symbol_instance_start)
    }

    /// Returns whether the part covers no symbol instances.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Orders parts by sort key, missing keys as zero.
    pub(crate) fn cmp_sort_key(&self, other: &Self) -> Ordering {
        self.sort_key
            .unwrap_or(0.0)
            .total_cmp(&other.sort_key.unwrap_or(0.0))
    }
}
