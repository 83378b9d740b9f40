// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract between the scheduler and the placement algorithm.
//!
//! The scheduler decides *when* each piece of work runs. A
//! [`PlacementEngine`] decides *what* the work does: how a tile's symbols are
//! split into [`BucketPart`]s, whether a symbol fits without overlap, and how
//! accumulated decisions turn into a snapshot the renderer can draw.
//!
//! The engine is the pass-wide decision accumulator. It is owned by exactly
//! one [`PauseablePlacement`](crate::pauseable::PauseablePlacement) and only
//! ever borrowed by the single active
//! [`LayerPlacement`](crate::layer_placement::LayerPlacement), so it is never
//! mutated from two places at once.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::bucket::{BucketPart, CrossTileId};
use crate::style::LayerConfig;
use crate::time::HostTime;

/// Collision detection and placement decisions for one pass.
pub trait PlacementEngine {
    /// Tile data handed to [`bucket_parts`](Self::bucket_parts).
    type Tile;
    /// Engine data carried by each [`BucketPart`].
    type Parameters;
    /// The committed result of a pass.
    type Snapshot;

    /// Returns the zoom of the view being placed.
    fn view_zoom(&self) -> f64;

    /// Appends the candidate parts of `tile` for `layer` to `out`.
    ///
    /// When `sort_across_tiles` is set, parts carry sort keys and will be
    /// sorted together with parts from every other tile of the layer before
    /// evaluation.
    fn bucket_parts(
        &mut self,
        out: &mut Vec<BucketPart<Self::Parameters>>,
        layer: &LayerConfig,
        tile: &Self::Tile,
        sort_across_tiles: bool,
    );

    /// Evaluates one part and records its decisions.
    ///
    /// `seen` holds the cross-tile ids already evaluated in this layer pass;
    /// the engine must skip symbols found there and add the ones it
    /// evaluates. `first_of_collection` is set for the first part of a
    /// bucket so per-bucket state can be reset.
    fn place_bucket_part(
        &mut self,
        part: &BucketPart<Self::Parameters>,
        seen: &mut BTreeSet<CrossTileId>,
        show_collision_boxes: bool,
        first_of_collection: bool,
    );

    /// Finalizes transition bookkeeping at `now` and returns the current
    /// decisions.
    ///
    /// May be called before the pass is done to get the best partial result.
    fn commit(&mut self, now: HostTime) -> Self::Snapshot;
}
