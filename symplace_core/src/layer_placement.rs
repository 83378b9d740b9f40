// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resumable placement of a single layer.
//!
//! A [`LayerPlacement`] holds everything needed to pick up a layer where the
//! previous call left it: a tile cursor, a bucket-part cursor, the parts
//! collected so far, and the cross-tile ids already evaluated. Work proceeds
//! in three phases, each of which only moves forward:
//!
//! 1. **Collect**: ask the engine for the parts of each tile, one tile per
//!    unit.
//! 2. **Sort**: if the layer sorts across tiles, stable-sort all parts by
//!    key, exactly once, after the last tile.
//! 3. **Evaluate**: hand each part to the engine, one part per unit.
//!
//! The deadline is checked after every unit.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::bucket::{BucketPart, CrossTileId};
use crate::budget::Deadline;
use crate::clock::Clock;
use crate::engine::PlacementEngine;
use crate::style::LayerConfig;

/// Outcome of [`LayerPlacement::continue_placement`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerStatus {
    /// The deadline passed; call again with the same instance.
    Paused,
    /// Every part has been evaluated; the instance can be dropped.
    Complete,
}

impl LayerStatus {
    /// Returns whether more work remains.
    #[inline]
    #[must_use]
    pub const fn is_paused(self) -> bool {
        matches!(self, Self::Paused)
    }
}

/// Per-layer placement state.
#[derive(Debug)]
pub struct LayerPlacement<P> {
    sorts_across_tiles: bool,
    sort_pending: bool,
    current_tile_index: usize,
    current_part_index: usize,
    seen_cross_tile_ids: BTreeSet<CrossTileId>,
    bucket_parts: Vec<BucketPart<P>>,
}

impl<P> LayerPlacement<P> {
    /// Creates the state for `layer`, deciding once whether its parts are
    /// sorted across tiles.
    #[must_use]
    pub fn new(layer: &LayerConfig) -> Self {
        let sorts_across_tiles = layer.sorts_across_tiles();
        Self {
            sorts_across_tiles,
            sort_pending: sorts_across_tiles,
            current_tile_index: 0,
            current_part_index: 0,
            seen_cross_tile_ids: BTreeSet::new(),
            bucket_parts: Vec::new(),
        }
    }

    /// Advances placement of this layer until it completes or `deadline`
    /// expires.
    ///
    /// `tiles` and `layer` must be the same on every call for a given
    /// instance; the cursors index into them.
    pub fn continue_placement<E, C>(
        &mut self,
        tiles: &[E::Tile],
        engine: &mut E,
        show_collision_boxes: bool,
        layer: &LayerConfig,
        deadline: Deadline,
        clock: &C,
    ) -> LayerStatus
    where
        E: PlacementEngine<Parameters = P>,
        C: Clock + ?Sized,
    {
        while let Some(tile) = tiles.get(self.current_tile_index) {
            engine.bucket_parts(
                &mut self.bucket_parts,
                layer,
                tile,
                self.sorts_across_tiles,
            );
            self.current_tile_index += 1;
            if deadline.is_expired(clock.now()) {
                return LayerStatus::Paused;
            }
        }

        if self.sort_pending {
            self.sort_pending = false;
            self.bucket_parts.sort_by(BucketPart::cmp_sort_key);
        }

        while let Some(part) = self.bucket_parts.get(self.current_part_index) {
            engine.place_bucket_part(
                part,
                &mut self.seen_cross_tile_ids,
                show_collision_boxes,
                part.is_first_of_collection(),
            );
            self.current_part_index += 1;
            if deadline.is_expired(clock.now()) {
                return LayerStatus::Paused;
            }
        }

        LayerStatus::Complete
    }

    /// Returns whether this layer's parts are sorted across tiles.
    #[must_use]
    pub fn sorts_across_tiles(&self) -> bool {
        self.sorts_across_tiles
    }

    /// Returns how many tiles have been collected.
    #[must_use]
    pub fn tiles_collected(&self) -> usize {
        self.current_tile_index
    }

    /// Returns how many bucket parts have been evaluated.
    #[must_use]
    pub fn parts_placed(&self) -> usize {
        self.current_part_index
    }

    /// Returns the parts collected so far, in evaluation order once
    /// collection has finished.
    #[must_use]
    pub fn bucket_parts(&self) -> &[BucketPart<P>] {
        &self.bucket_parts
    }

    /// Returns the cross-tile ids evaluated so far.
    #[must_use]
    pub fn seen_cross_tile_ids(&self) -> &BTreeSet<CrossTileId> {
        &self.seen_cross_tile_ids
    }
}
