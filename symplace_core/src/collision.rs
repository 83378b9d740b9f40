// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A reference [`PlacementEngine`] over axis-aligned collision boxes.
//!
//! [`CollisionPlacement`] places each symbol if its box does not overlap any
//! box placed earlier in the pass, and on commit turns those decisions into
//! per-symbol opacities that fade in and out relative to the previous
//! snapshot.
//!
//! Tiles are [`SymbolTile`]s: for each layer, a [`SymbolBucket`] of
//! [`SymbolInstance`]s in feature order. Buckets are reference counted so
//! bucket parts can point back at them without copying instances.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::rc::Rc;
use alloc::vec::Vec;

use kurbo::Rect;

use crate::bucket::{BucketPart, CrossTileId, TileId};
use crate::budget::PlacementConfig;
use crate::engine::PlacementEngine;
use crate::style::{LayerConfig, LayerId, SourceId};
use crate::time::{HostTime, Timebase};

// ---------------------------------------------------------------------------
// Tile data
// ---------------------------------------------------------------------------

/// One symbol as it appears in one tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SymbolInstance {
    /// Identity shared by all copies of this symbol across tiles.
    pub cross_tile_id: CrossTileId,
    /// Per-feature sort key, if the layer has one.
    pub sort_key: Option<f64>,
    /// Screen-space collision box.
    pub collision_box: Rect,
}

/// A run of consecutive instances sharing one sort key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SortKeyRange {
    /// The shared key (missing keys count as zero).
    pub sort_key: f64,
    /// First instance of the run.
    pub start: u32,
    /// One past the last instance of the run.
    pub end: u32,
}

/// The symbols of one layer in one tile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SymbolBucket {
    /// Instances in feature order.
    pub instances: Vec<SymbolInstance>,
}

impl SymbolBucket {
    /// Creates a bucket from instances in feature order.
    #[must_use]
    pub fn new(instances: Vec<SymbolInstance>) -> Self {
        Self { instances }
    }

    /// Splits the bucket into runs of equal sort keys.
    #[must_use]
    pub fn sort_key_ranges(&self) -> Vec<SortKeyRange> {
        let mut ranges: Vec<SortKeyRange> = Vec::new();
        for (index, instance) in (0_u32..).zip(&self.instances) {
            let key = instance.sort_key.unwrap_or(0.0);
            match ranges.last_mut() {
                Some(run) if run.sort_key.total_cmp(&key).is_eq() => run.end = index + 1,
                _ => ranges.push(SortKeyRange {
                    sort_key: key,
                    start: index,
                    end: index + 1,
                }),
            }
        }
        ranges
    }

    fn len_u32(&self) -> u32 {
        u32::try_from(self.instances.len()).unwrap_or(u32::MAX)
    }
}

/// A tile's symbol data, by layer.
#[derive(Clone, Debug)]
pub struct SymbolTile {
    /// The tile's identity.
    pub id: TileId,
    /// Buckets keyed by the layer they belong to.
    pub buckets: BTreeMap<LayerId, Rc<SymbolBucket>>,
}

impl SymbolTile {
    /// Creates a tile with no buckets.
    #[must_use]
    pub fn new(id: TileId) -> Self {
        Self {
            id,
            buckets: BTreeMap::new(),
        }
    }

    /// Adds the bucket for `layer`.
    #[must_use]
    pub fn with_bucket(mut self, layer: LayerId, bucket: SymbolBucket) -> Self {
        self.buckets.insert(layer, Rc::new(bucket));
        self
    }
}

/// What a [`BucketPart`] produced by [`CollisionPlacement`] points at.
#[derive(Clone, Debug)]
pub struct BucketParameters {
    /// The layer being placed.
    pub layer: LayerId,
    /// The layer's source.
    pub source: SourceId,
    /// The bucket the part's instance range indexes into.
    pub bucket: Rc<SymbolBucket>,
}

// ---------------------------------------------------------------------------
// Collision index
// ---------------------------------------------------------------------------

/// Boxes placed so far in a pass.
///
/// Lookups are linear; this index is meant for reference and testing, not
/// for dense production maps.
#[derive(Clone, Debug, Default)]
pub struct CollisionIndex {
    boxes: Vec<(Rect, SourceId)>,
}

impl CollisionIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `rect` overlaps a placed box.
    ///
    /// Boxes that merely touch do not overlap. Unless `cross_source` is set,
    /// only boxes from the same source are considered.
    #[must_use]
    pub fn collides(&self, rect: Rect, source: SourceId, cross_source: bool) -> bool {
        self.boxes.iter().any(|(placed, placed_source)| {
            (cross_source || *placed_source == source) && placed.intersect(rect).area() > 0.0
        })
    }

    /// Records a placed box.
    pub fn insert(&mut self, rect: Rect, source: SourceId) {
        self.boxes.push((rect, source));
    }

    /// Returns the number of placed boxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns whether nothing has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Fade state of one symbol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SymbolOpacity {
    /// Current opacity in `[0, 1]`.
    pub opacity: f64,
    /// Whether the symbol was placed in the latest pass.
    pub placed: bool,
}

impl SymbolOpacity {
    /// State of a symbol with no previous state.
    ///
    /// New symbols start invisible and fade in, unless fading is disabled.
    #[must_use]
    pub const fn initial(placed: bool, skip_fade: bool) -> Self {
        Self {
            opacity: if skip_fade && placed { 1.0 } else { 0.0 },
            placed,
        }
    }

    /// Advances `self` by `increment` toward its placed state and records the
    /// new decision.
    #[must_use]
    pub fn step(self, increment: f64, placed: bool) -> Self {
        let delta = if self.placed { increment } else { -increment };
        Self {
            opacity: (self.opacity + delta).clamp(0.0, 1.0),
            placed,
        }
    }

    /// Returns whether the symbol is invisible and will stay so.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.opacity == 0.0 && !self.placed
    }

    /// Returns whether the symbol is still fading toward its target.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        if self.placed {
            self.opacity < 1.0
        } else {
            self.opacity > 0.0
        }
    }
}

/// The committed decisions of a pass.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementSnapshot {
    /// When the snapshot was committed.
    pub committed_at: HostTime,
    /// Fade state by symbol.
    pub opacities: BTreeMap<CrossTileId, SymbolOpacity>,
}

impl PlacementSnapshot {
    /// Returns the fade state of a symbol.
    #[must_use]
    pub fn get(&self, id: CrossTileId) -> Option<SymbolOpacity> {
        self.opacities.get(&id).copied()
    }

    /// Returns whether a symbol was placed.
    #[must_use]
    pub fn is_placed(&self, id: CrossTileId) -> bool {
        self.get(id).is_some_and(|o| o.placed)
    }

    /// Returns whether any symbol is still fading.
    #[must_use]
    pub fn has_transitions(&self) -> bool {
        self.opacities.values().any(SymbolOpacity::is_transitioning)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Placement outcome counters for one bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BucketStats {
    /// Instances placed.
    pub placed: u32,
    /// Instances rejected by collision.
    pub collided: u32,
}

/// A collision box kept for debug drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugBox {
    /// The symbol's box.
    pub rect: Rect,
    /// Whether the symbol was rejected.
    pub collided: bool,
}

/// Box-overlap placement with fade bookkeeping.
#[derive(Debug)]
pub struct CollisionPlacement {
    zoom: f64,
    fade_duration_ms: u32,
    cross_source_collisions: bool,
    timebase: Timebase,
    prev: Option<PlacementSnapshot>,
    index: CollisionIndex,
    placements: BTreeMap<CrossTileId, bool>,
    bucket_stats: BTreeMap<(TileId, LayerId), BucketStats>,
    debug_boxes: Vec<DebugBox>,
}

impl CollisionPlacement {
    /// Creates an engine for a view at `zoom`.
    ///
    /// `prev` is the snapshot of the previous pass; opacities continue from
    /// it. `timebase` converts commit timestamps to milliseconds for fading.
    #[must_use]
    pub fn new(
        zoom: f64,
        config: &PlacementConfig,
        timebase: Timebase,
        prev: Option<PlacementSnapshot>,
    ) -> Self {
        Self {
            zoom,
            fade_duration_ms: config.fade_duration_ms,
            cross_source_collisions: config.cross_source_collisions,
            timebase,
            prev,
            index: CollisionIndex::new(),
            placements: BTreeMap::new(),
            bucket_stats: BTreeMap::new(),
            debug_boxes: Vec::new(),
        }
    }

    /// Returns the decision for a symbol evaluated in this pass.
    #[must_use]
    pub fn decision(&self, id: CrossTileId) -> Option<bool> {
        self.placements.get(&id).copied()
    }

    /// Returns the number of symbols evaluated in this pass.
    #[must_use]
    pub fn evaluated(&self) -> usize {
        self.placements.len()
    }

    /// Returns the counters for the bucket of `layer` in `tile`.
    #[must_use]
    pub fn bucket_stats(&self, tile: TileId, layer: LayerId) -> Option<BucketStats> {
        self.bucket_stats.get(&(tile, layer)).copied()
    }

    /// Returns collision boxes kept for debug drawing.
    #[must_use]
    pub fn debug_boxes(&self) -> &[DebugBox] {
        &self.debug_boxes
    }

    /// Returns the collision index.
    #[must_use]
    pub fn collision_index(&self) -> &CollisionIndex {
        &self.index
    }

    fn fade_increment(&self, now: HostTime) -> f64 {
        match &self.prev {
            Some(prev) if self.fade_duration_ms != 0 => {
                let elapsed = now
                    .saturating_duration_since(prev.committed_at)
                    .as_millis_f64(self.timebase);
                elapsed / f64::from(self.fade_duration_ms)
            }
            _ => 1.0,
        }
    }
}

impl PlacementEngine for CollisionPlacement {
    type Tile = SymbolTile;
    type Parameters = BucketParameters;
    type Snapshot = PlacementSnapshot;

    fn view_zoom(&self) -> f64 {
        self.zoom
    }

    fn bucket_parts(
        &mut self,
        out: &mut Vec<BucketPart<BucketParameters>>,
        layer: &LayerConfig,
        tile: &SymbolTile,
        sort_across_tiles: bool,
    ) {
        let Some(bucket) = tile.buckets.get(&layer.id) else {
            return;
        };
        if bucket.instances.is_empty() {
            return;
        }
        let parameters = BucketParameters {
            layer: layer.id,
            source: layer.source,
            bucket: Rc::clone(bucket),
        };

        if sort_across_tiles {
            for range in bucket.sort_key_ranges() {
                out.push(BucketPart {
                    tile: tile.id,
                    sort_key: Some(range.sort_key),
                    symbol_instance_start: range.start,
                    symbol_instance_end: range.end,
                    parameters: parameters.clone(),
                });
            }
        } else {
            out.push(BucketPart {
                tile: tile.id,
                sort_key: None,
                symbol_instance_start: 0,
                symbol_instance_end: bucket.len_u32(),
                parameters,
            });
        }
    }

    fn place_bucket_part(
        &mut self,
        part: &BucketPart<BucketParameters>,
        seen: &mut BTreeSet<CrossTileId>,
        show_collision_boxes: bool,
        _first_of_collection: bool,
    ) {
        // Parts of a sorted bucket arrive in key order, not instance order,
        // and the engine lives for one pass, so counters only accumulate.
        let params = &part.parameters;
        let stats = self
            .bucket_stats
            .entry((part.tile, params.layer))
            .or_default();

        let start = part.symbol_instance_start as usize;
        let end = part.symbol_instance_end as usize;
        let instances = params.bucket.instances.get(start..end).unwrap_or(&[]);

        for instance in instances {
            if !seen.insert(instance.cross_tile_id) {
                continue;
            }
            let rect = instance.collision_box;
            let placed = !self
                .index
                .collides(rect, params.source, self.cross_source_collisions);
            if placed {
                self.index.insert(rect, params.source);
                stats.placed += 1;
            } else {
                stats.collided += 1;
            }
            self.placements.insert(instance.cross_tile_id, placed);
            if show_collision_boxes {
                self.debug_boxes.push(DebugBox {
                    rect,
                    collided: !placed,
                });
            }
        }
    }

    fn commit(&mut self, now: HostTime) -> PlacementSnapshot {
        let increment = self.fade_increment(now);
        let skip_fade = self.fade_duration_ms == 0;
        let prev_opacities = self.prev.as_ref().map(|p| &p.opacities);

        let mut opacities = BTreeMap::new();
        for (&id, &placed) in &self.placements {
            let state = match prev_opacities.and_then(|o| o.get(&id)) {
                Some(prev) => prev.step(increment, placed),
                None => SymbolOpacity::initial(placed, skip_fade),
            };
            opacities.insert(id, state);
        }

        // Symbols that disappeared from this pass fade out.
        if let Some(prev) = prev_opacities {
            for (&id, prev_state) in prev {
                if self.placements.contains_key(&id) {
                    continue;
                }
                let state = prev_state.step(increment, false);
                if !state.is_hidden() {
                    opacities.insert(id, state);
                }
            }
        }

        PlacementSnapshot {
            committed_at: now,
            opacities,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::time::Duration;

    fn instance(id: u32, key: Option<f64>, x: f64) -> SymbolInstance {
        SymbolInstance {
            cross_tile_id: CrossTileId(id),
            sort_key: key,
            collision_box: Rect::new(x, 0.0, x + 10.0, 10.0),
        }
    }

    fn engine(config: &PlacementConfig, prev: Option<PlacementSnapshot>) -> CollisionPlacement {
        CollisionPlacement::new(12.0, config, Timebase::NANOS, prev)
    }

    const LAYER: LayerId = LayerId(1);
    const SRC: SourceId = SourceId(0);

    #[test]
    fn sort_key_ranges_group_runs() {
        let bucket = SymbolBucket::new(vec![
            instance(1, Some(2.0), 0.0),
            instance(2, Some(2.0), 20.0),
            instance(3, None, 40.0),
            instance(4, Some(2.0), 60.0),
        ]);
        let ranges = bucket.sort_key_ranges();
        assert_eq!(
            ranges,
            vec![
                SortKeyRange {
                    sort_key: 2.0,
                    start: 0,
                    end: 2
                },
                SortKeyRange {
                    sort_key: 0.0,
                    start: 2,
                    end: 3
                },
                SortKeyRange {
                    sort_key: 2.0,
                    start: 3,
                    end: 4
                },
            ]
        );
    }

    #[test]
    fn collision_index_ignores_touching_and_other_sources() {
        let mut index = CollisionIndex::new();
        index.insert(Rect::new(0.0, 0.0, 10.0, 10.0), SourceId(0));
        assert!(!index.collides(Rect::new(10.0, 0.0, 20.0, 10.0), SourceId(0), true));
        assert!(index.collides(Rect::new(5.0, 5.0, 15.0, 15.0), SourceId(0), false));
        assert!(!index.collides(Rect::new(5.0, 5.0, 15.0, 15.0), SourceId(1), false));
        assert!(index.collides(Rect::new(5.0, 5.0, 15.0, 15.0), SourceId(1), true));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn parts_follow_sort_mode() {
        let tile = SymbolTile::new(TileId(9)).with_bucket(
            LAYER,
            SymbolBucket::new(vec![
                instance(1, Some(1.0), 0.0),
                instance(2, Some(3.0), 20.0),
            ]),
        );
        let layer = LayerConfig::symbol(LAYER, SRC);
        let mut engine = engine(&PlacementConfig::export(), None);

        let mut unsorted = Vec::new();
        engine.bucket_parts(&mut unsorted, &layer, &tile, false);
        assert_eq!(unsorted.len(), 1);
        assert_eq!(unsorted[0].sort_key, None);
        assert_eq!(unsorted[0].len(), 2);

        let mut sorted = Vec::new();
        engine.bucket_parts(&mut sorted, &layer, &tile, true);
        let keys: Vec<_> = sorted.iter().map(|p| p.sort_key).collect();
        assert_eq!(keys, vec![Some(1.0), Some(3.0)]);
        assert!(sorted[0].is_first_of_collection());
        assert!(!sorted[1].is_first_of_collection());

        let mut other_layer = Vec::new();
        engine.bucket_parts(
            &mut other_layer,
            &LayerConfig::symbol(LayerId(2), SRC),
            &tile,
            false,
        );
        assert!(other_layer.is_empty(), "tile has no bucket for layer 2");
    }

    #[test]
    fn overlapping_symbols_collide_and_duplicates_are_skipped() {
        let tile = SymbolTile::new(TileId(1)).with_bucket(
            LAYER,
            SymbolBucket::new(vec![
                instance(1, None, 0.0),
                instance(2, None, 5.0),
                instance(3, None, 30.0),
            ]),
        );
        let layer = LayerConfig::symbol(LAYER, SRC);
        let mut engine = engine(&PlacementConfig::export(), None);
        let mut parts = Vec::new();
        engine.bucket_parts(&mut parts, &layer, &tile, false);

        let mut seen = BTreeSet::new();
        seen.insert(CrossTileId(3));
        engine.place_bucket_part(&parts[0], &mut seen, true, true);

        assert_eq!(engine.decision(CrossTileId(1)), Some(true));
        assert_eq!(engine.decision(CrossTileId(2)), Some(false));
        assert_eq!(engine.decision(CrossTileId(3)), None, "already seen");
        assert_eq!(
            engine.bucket_stats(TileId(1), LAYER),
            Some(BucketStats {
                placed: 1,
                collided: 1
            })
        );
        assert_eq!(engine.debug_boxes().len(), 2);
        assert!(engine.debug_boxes()[1].collided);
    }

    #[test]
    fn sorted_bucket_stats_count_every_run() {
        // The first run has the highest key, so it is evaluated last.
        let tile = SymbolTile::new(TileId(1)).with_bucket(
            LAYER,
            SymbolBucket::new(vec![
                instance(1, Some(5.0), 0.0),
                instance(2, Some(1.0), 100.0),
                instance(3, Some(1.0), 200.0),
            ]),
        );
        let layer = LayerConfig::symbol(LAYER, SRC);
        let mut engine = engine(&PlacementConfig::export(), None);
        let mut parts = Vec::new();
        engine.bucket_parts(&mut parts, &layer, &tile, true);
        parts.sort_by(BucketPart::cmp_sort_key);
        assert!(!parts[0].is_first_of_collection());
        assert!(parts[1].is_first_of_collection());

        let mut seen = BTreeSet::new();
        for part in &parts {
            engine.place_bucket_part(part, &mut seen, false, part.is_first_of_collection());
        }

        assert_eq!(engine.evaluated(), 3);
        assert_eq!(
            engine.bucket_stats(TileId(1), LAYER),
            Some(BucketStats {
                placed: 3,
                collided: 0
            })
        );
    }

    #[test]
    fn commit_without_fade_shows_placed_symbols() {
        let mut engine = engine(&PlacementConfig::export(), None);
        engine.placements.insert(CrossTileId(1), true);
        engine.placements.insert(CrossTileId(2), false);

        let snapshot = engine.commit(HostTime(100));
        assert_eq!(snapshot.committed_at, HostTime(100));
        assert_eq!(snapshot.get(CrossTileId(1)).map(|o| o.opacity), Some(1.0));
        assert_eq!(snapshot.get(CrossTileId(2)).map(|o| o.opacity), Some(0.0));
        assert!(snapshot.is_placed(CrossTileId(1)));
        assert!(!snapshot.has_transitions());
    }

    #[test]
    fn commit_fades_relative_to_previous_snapshot() {
        let config = PlacementConfig::interactive();
        let mut first = engine(&config, None);
        first.placements.insert(CrossTileId(1), true);
        first.placements.insert(CrossTileId(2), true);
        let t0 = HostTime(0);
        let prev = first.commit(t0);
        assert_eq!(prev.get(CrossTileId(1)).map(|o| o.opacity), Some(0.0));
        assert!(prev.has_transitions());

        // 150ms later with a 300ms fade: placed symbols are half way in.
        let mut second = engine(&config, Some(prev));
        second.placements.insert(CrossTileId(1), true);
        let t1 = HostTime(0) + Duration::from_millis(150, Timebase::NANOS);
        let snapshot = second.commit(t1);

        let one = snapshot.get(CrossTileId(1)).expect("still placed");
        assert!((one.opacity - 0.5).abs() < 1e-9, "got {}", one.opacity);
        // Symbol 2 vanished from the pass; it was fading in, so it keeps
        // fading in this step and is now marked unplaced.
        let two = snapshot.get(CrossTileId(2)).expect("fading out");
        assert!(!two.placed);
        assert!((two.opacity - 0.5).abs() < 1e-9, "got {}", two.opacity);
    }

    #[test]
    fn hidden_symbols_are_dropped_from_snapshot() {
        let mut opacities = BTreeMap::new();
        opacities.insert(
            CrossTileId(5),
            SymbolOpacity {
                opacity: 0.0,
                placed: false,
            },
        );
        let prev = PlacementSnapshot {
            committed_at: HostTime(0),
            opacities,
        };
        let mut engine = engine(&PlacementConfig::interactive(), Some(prev));
        let snapshot = engine.commit(HostTime(1_000_000));
        assert!(snapshot.get(CrossTileId(5)).is_none());
    }

    #[test]
    fn opacity_steps_toward_previous_decision() {
        let fading_in = SymbolOpacity {
            opacity: 0.25,
            placed: true,
        };
        assert_eq!(fading_in.step(0.5, true).opacity, 0.75);
        assert_eq!(fading_in.step(2.0, false).opacity, 1.0, "clamped");
        let fading_out = SymbolOpacity {
            opacity: 0.25,
            placed: false,
        };
        assert_eq!(fading_out.step(0.5, false).opacity, 0.0);
        assert!(fading_out.step(0.5, false).is_hidden());
        assert!(!fading_out.step(0.5, true).is_hidden());
    }
}
