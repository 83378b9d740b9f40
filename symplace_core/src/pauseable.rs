// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Budgeted placement across all layers.
//!
//! [`PauseablePlacement`] is created once per placement pass (typically when
//! the camera or style changes) and driven once per frame. Each call to
//! [`continue_placement`](PauseablePlacement::continue_placement) walks the
//! layer order from the back, delegates the active layer to its
//! [`LayerPlacement`], and returns as soon as the call's [`Deadline`] has
//! passed. The renderer keeps drawing the previous snapshot in the meantime.
//!
//! Layers are walked back to front: the layer painted last claims collision
//! space first, so symbols drawn on top are never displaced by a layer
//! painted beneath them.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut pass = PauseablePlacement::new(engine, &order, config, clock);
//! // Once per frame:
//! pass.continue_placement(&order, &layers, &tiles, &tiles_in_y_order, &mut tracer)?;
//! let snapshot = pass.commit(now);
//! if pass.is_done() {
//!     // Start a new pass on the next invalidation.
//! }
//! ```
//!
//! There is no cancel operation: dropping the pass abandons it.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::budget::{Deadline, PlacementConfig};
use crate::clock::Clock;
use crate::engine::PlacementEngine;
use crate::error::PlacementError;
use crate::layer_placement::{LayerPlacement, LayerStatus};
use crate::style::{LayerConfig, LayerId, SourceId};
use crate::time::{Duration, HostTime};
use crate::trace::{LayerBeginEvent, LayerPlacedEvent, PlacementSliceEvent, Tracer};

/// The layer currently being placed, if any.
#[derive(Debug)]
pub enum InProgressLayer<P> {
    /// No layer has been started since the last one completed.
    Idle,
    /// A layer is partway through collection or evaluation.
    Active(LayerPlacement<P>),
}

impl<P> InProgressLayer<P> {
    /// Returns the active layer's state, if any.
    #[must_use]
    pub fn active(&self) -> Option<&LayerPlacement<P>> {
        match self {
            Self::Idle => None,
            Self::Active(layer) => Some(layer),
        }
    }
}

/// A placement pass that can be spread over many frames.
#[derive(Debug)]
pub struct PauseablePlacement<E: PlacementEngine, C> {
    engine: E,
    clock: C,
    config: PlacementConfig,
    order_len: usize,
    /// Index of the next layer to visit; `None` once the walk has passed the
    /// front of the order.
    current_placement_index: Option<usize>,
    in_progress: InProgressLayer<E::Parameters>,
    done: bool,
    slice_index: u64,
}

impl<E: PlacementEngine, C: Clock> PauseablePlacement<E, C> {
    /// Starts a pass over `order` (layers in paint order, placed back to
    /// front).
    ///
    /// `engine` is the pass-wide decision accumulator, already seeded with
    /// whatever context it needs (view, previous snapshot, fade settings).
    #[must_use]
    pub fn new(engine: E, order: &[LayerId], config: PlacementConfig, clock: C) -> Self {
        Self {
            engine,
            clock,
            config,
            order_len: order.len(),
            current_placement_index: order.len().checked_sub(1),
            in_progress: InProgressLayer::Idle,
            done: false,
            slice_index: 0,
        }
    }

    /// Returns whether every layer has been placed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Advances the pass by at most one budget's worth of work, or to the
    /// end if [`force_full_placement`](PlacementConfig::force_full_placement)
    /// is set.
    ///
    /// `layer_tiles` holds each source's tiles in natural order,
    /// `layer_tiles_in_y_order` the same tiles sorted by y for elevated
    /// layers. A source missing from the map has no tiles.
    ///
    /// Calling this after the pass is done does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::OrderLengthChanged`] if `order` is not as
    /// long as the order the pass was created with, and
    /// [`PlacementError::UnknownLayer`] if a layer in `order` is missing
    /// from `layers`. In both cases nothing is advanced past the offending
    /// layer.
    pub fn continue_placement(
        &mut self,
        order: &[LayerId],
        layers: &BTreeMap<LayerId, LayerConfig>,
        layer_tiles: &BTreeMap<SourceId, Vec<E::Tile>>,
        layer_tiles_in_y_order: &BTreeMap<SourceId, Vec<E::Tile>>,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), PlacementError> {
        if self.done {
            return Ok(());
        }
        if order.len() != self.order_len {
            return Err(PlacementError::OrderLengthChanged {
                expected: self.order_len,
                found: order.len(),
            });
        }

        let start = self.clock.now();
        let budget = Duration::from_nanos(self.config.budget_nanos, self.clock.timebase());
        let deadline = self.config.deadline(start, budget);
        let mut slice = SliceCounters::default();

        while let Some(index) = self.current_placement_index {
            let layer_id = order[index];
            let layer = layers
                .get(&layer_id)
                .ok_or(PlacementError::UnknownLayer(layer_id))?;

            if layer.is_placed_at(self.engine.view_zoom()) {
                let tiles_by_source = if layer.z_elevate {
                    layer_tiles_in_y_order
                } else {
                    layer_tiles
                };
                let tiles = tiles_by_source
                    .get(&layer.source)
                    .map_or(&[][..], Vec::as_slice);

                match self.place_layer(layer, tiles, deadline, &mut slice, tracer) {
                    LayerStatus::Paused => {
                        self.finish_slice(start, slice, tracer);
                        return Ok(());
                    }
                    LayerStatus::Complete => {}
                }
            }

            self.current_placement_index = index.checked_sub(1);
        }

        self.done = true;
        self.finish_slice(start, slice, tracer);
        Ok(())
    }

    /// Finalizes the engine's decisions at `now` and returns them.
    ///
    /// Safe to call at any point of the pass; before the pass is done the
    /// snapshot holds the decisions made so far.
    pub fn commit(&mut self, now: HostTime) -> E::Snapshot {
        self.engine.commit(now)
    }

    /// Returns the engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Consumes the pass and returns the engine.
    #[must_use]
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Returns the pass configuration.
    #[must_use]
    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Returns the clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns the layer currently being placed.
    #[must_use]
    pub fn in_progress(&self) -> &InProgressLayer<E::Parameters> {
        &self.in_progress
    }

    /// Returns the index in the order of the next layer to visit, or `None`
    /// once every layer has been visited.
    #[must_use]
    pub fn current_placement_index(&self) -> Option<usize> {
        self.current_placement_index
    }

    /// Returns the number of scheduling calls that have done work.
    #[must_use]
    pub fn slices(&self) -> u64 {
        self.slice_index
    }

    fn place_layer(
        &mut self,
        layer: &LayerConfig,
        tiles: &[E::Tile],
        deadline: Deadline,
        slice: &mut SliceCounters,
        tracer: &mut Tracer<'_>,
    ) -> LayerStatus {
        let mut state = match core::mem::replace(&mut self.in_progress, InProgressLayer::Idle) {
            InProgressLayer::Active(state) => state,
            InProgressLayer::Idle => {
                let state = LayerPlacement::new(layer);
                tracer.layer_begin(&LayerBeginEvent {
                    slice_index: self.slice_index,
                    layer: layer.id,
                    sorts_across_tiles: state.sorts_across_tiles(),
                    timestamp: self.clock.now(),
                });
                state
            }
        };

        let units_before = state.tiles_collected() + state.parts_placed();
        let status = state.continue_placement(
            tiles,
            &mut self.engine,
            self.config.show_collision_boxes,
            layer,
            deadline,
            &self.clock,
        );
        let units_after = state.tiles_collected() + state.parts_placed();
        slice.units = slice
            .units
            .saturating_add(u32::try_from(units_after - units_before).unwrap_or(u32::MAX));

        match status {
            LayerStatus::Paused => self.in_progress = InProgressLayer::Active(state),
            LayerStatus::Complete => {
                tracer.layer_placed(&LayerPlacedEvent {
                    slice_index: self.slice_index,
                    layer: layer.id,
                    tiles: u32::try_from(state.tiles_collected()).unwrap_or(u32::MAX),
                    bucket_parts: u32::try_from(state.parts_placed()).unwrap_or(u32::MAX),
                    timestamp: self.clock.now(),
                });
                slice.layers_completed += 1;
            }
        }
        status
    }

    fn finish_slice(&mut self, start: HostTime, slice: SliceCounters, tracer: &mut Tracer<'_>) {
        tracer.placement_slice(&PlacementSliceEvent {
            slice_index: self.slice_index,
            start,
            end: self.clock.now(),
            layers_completed: slice.layers_completed,
            units: slice.units,
            done: self.done,
        });
        self.slice_index += 1;
    }
}

/// Work done during one scheduling call.
#[derive(Clone, Copy, Debug, Default)]
struct SliceCounters {
    layers_completed: u32,
    units: u32,
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeSet;
    use alloc::vec;

    use super::*;
    use crate::bucket::{BucketPart, CrossTileId, TileId};
    use crate::clock::ManualClock;
    use crate::style::LayerKind;
    use crate::time::Timebase;

    #[derive(Debug, PartialEq)]
    enum Call {
        Collect(LayerId, u32),
        Place(LayerId, u32),
    }

    /// Tiles are bare ids; every tile yields one part per layer.
    #[derive(Debug, Default)]
    struct LogEngine {
        calls: Vec<Call>,
    }

    impl PlacementEngine for LogEngine {
        type Tile = u32;
        type Parameters = LayerId;
        type Snapshot = usize;

        fn view_zoom(&self) -> f64 {
            12.0
        }

        fn bucket_parts(
            &mut self,
            out: &mut Vec<BucketPart<LayerId>>,
            layer: &LayerConfig,
            tile: &u32,
            _sort_across_tiles: bool,
        ) {
            self.calls.push(Call::Collect(layer.id, *tile));
            out.push(BucketPart {
                tile: TileId(*tile),
                sort_key: None,
                symbol_instance_start: 0,
                symbol_instance_end: 1,
                parameters: layer.id,
            });
        }

        fn place_bucket_part(
            &mut self,
            part: &BucketPart<LayerId>,
            seen: &mut BTreeSet<CrossTileId>,
            _show_collision_boxes: bool,
            _first_of_collection: bool,
        ) {
            seen.insert(CrossTileId(part.tile.0));
            self.calls.push(Call::Place(part.parameters, part.tile.0));
        }

        fn commit(&mut self, _now: HostTime) -> usize {
            self.calls.len()
        }
    }

    const SRC: SourceId = SourceId(0);
    const A: LayerId = LayerId(1);
    const B: LayerId = LayerId(2);
    const C: LayerId = LayerId(3);
    const D: LayerId = LayerId(4);

    fn layers(configs: &[LayerConfig]) -> BTreeMap<LayerId, LayerConfig> {
        configs.iter().map(|l| (l.id, *l)).collect()
    }

    fn tiles(ids: &[u32]) -> BTreeMap<SourceId, Vec<u32>> {
        BTreeMap::from([(SRC, ids.to_vec())])
    }

    fn full_pass(
        order: &[LayerId],
        clock: ManualClock,
    ) -> PauseablePlacement<LogEngine, ManualClock> {
        PauseablePlacement::new(LogEngine::default(), order, PlacementConfig::export(), clock)
    }

    #[test]
    fn walks_back_to_front_and_skips_unplaced_layers() {
        let order = [A, B, C, D];
        let layers = layers(&[
            LayerConfig::symbol(A, SRC),
            LayerConfig::with_kind(B, LayerKind::Line, SRC),
            LayerConfig::symbol(C, SRC).zoom_range(Some(14.0), None),
            LayerConfig::symbol(D, SRC),
        ]);
        let tiles = tiles(&[7]);
        let mut pass = full_pass(&order, ManualClock::new(HostTime(0)));

        pass.continue_placement(&order, &layers, &tiles, &tiles, &mut Tracer::none())
            .unwrap();

        assert!(pass.is_done());
        assert_eq!(pass.current_placement_index(), None);
        assert!(pass.in_progress().active().is_none());
        assert_eq!(
            pass.engine().calls,
            vec![
                Call::Collect(D, 7),
                Call::Place(D, 7),
                Call::Collect(A, 7),
                Call::Place(A, 7),
            ]
        );
    }

    #[test]
    fn calls_after_done_do_nothing() {
        let order = [A];
        let layers = layers(&[LayerConfig::symbol(A, SRC)]);
        let tiles = tiles(&[1]);
        let mut pass = full_pass(&order, ManualClock::new(HostTime(0)));

        pass.continue_placement(&order, &layers, &tiles, &tiles, &mut Tracer::none())
            .unwrap();
        assert_eq!(pass.slices(), 1);
        pass.continue_placement(&order, &layers, &tiles, &tiles, &mut Tracer::none())
            .unwrap();

        assert!(pass.is_done());
        assert_eq!(pass.slices(), 1);
        assert_eq!(pass.engine().calls.len(), 2);
    }

    #[test]
    fn empty_order_is_done_after_first_call() {
        let layers = layers(&[]);
        let tiles = tiles(&[]);
        let mut pass = full_pass(&[], ManualClock::new(HostTime(0)));
        assert_eq!(pass.current_placement_index(), None);
        assert!(!pass.is_done());

        pass.continue_placement(&[], &layers, &tiles, &tiles, &mut Tracer::none())
            .unwrap();
        assert!(pass.is_done());
    }

    #[test]
    fn unknown_layer_is_reported_and_pass_resumes() {
        let order = [A, B];
        let mut layers = layers(&[LayerConfig::symbol(A, SRC)]);
        let tiles = tiles(&[1]);
        let mut pass = full_pass(&order, ManualClock::new(HostTime(0)));

        let err = pass
            .continue_placement(&order, &layers, &tiles, &tiles, &mut Tracer::none())
            .unwrap_err();
        assert_eq!(err, PlacementError::UnknownLayer(B));
        assert_eq!(pass.current_placement_index(), Some(1));
        assert!(!pass.is_done());

        layers.insert(B, LayerConfig::symbol(B, SRC));
        pass.continue_placement(&order, &layers, &tiles, &tiles, &mut Tracer::none())
            .unwrap();
        assert!(pass.is_done());
        assert_eq!(pass.engine().calls.len(), 4);
    }

    #[test]
    fn changed_order_length_is_rejected() {
        let order = [A, B];
        let layers = layers(&[LayerConfig::symbol(A, SRC), LayerConfig::symbol(B, SRC)]);
        let tiles = tiles(&[1]);
        let mut pass = full_pass(&order, ManualClock::new(HostTime(0)));

        let err = pass
            .continue_placement(&order[..1], &layers, &tiles, &tiles, &mut Tracer::none())
            .unwrap_err();
        assert_eq!(
            err,
            PlacementError::OrderLengthChanged {
                expected: 2,
                found: 1
            }
        );
        assert!(pass.engine().calls.is_empty());
    }

    #[test]
    fn elevated_layers_read_tiles_in_y_order() {
        let order = [A, B];
        let layers = layers(&[
            LayerConfig::symbol(A, SRC).elevated(true),
            LayerConfig::symbol(B, SRC),
        ]);
        let natural = tiles(&[1, 2]);
        let by_y = tiles(&[2, 1]);
        let mut pass = full_pass(&order, ManualClock::new(HostTime(0)));

        pass.continue_placement(&order, &layers, &natural, &by_y, &mut Tracer::none())
            .unwrap();

        let collected: Vec<_> = pass
            .engine()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Collect(layer, tile) => Some((*layer, *tile)),
                Call::Place(..) => None,
            })
            .collect();
        assert_eq!(collected, vec![(B, 1), (B, 2), (A, 2), (A, 1)]);
    }

    #[test]
    fn missing_source_means_no_tiles() {
        let order = [A];
        let layers = layers(&[LayerConfig::symbol(A, SourceId(9))]);
        let tiles = tiles(&[1]);
        let mut pass = full_pass(&order, ManualClock::new(HostTime(0)));

        pass.continue_placement(&order, &layers, &tiles, &tiles, &mut Tracer::none())
            .unwrap();
        assert!(pass.is_done());
        assert!(pass.engine().calls.is_empty());
    }

    #[test]
    fn zero_budget_spreads_pass_over_calls_with_same_result() {
        let order = [A, B];
        let layers = layers(&[LayerConfig::symbol(A, SRC), LayerConfig::symbol(B, SRC)]);
        let tiles = tiles(&[1, 2, 3]);

        let mut full = full_pass(&order, ManualClock::new(HostTime(0)));
        full.continue_placement(&order, &layers, &tiles, &tiles, &mut Tracer::none())
            .unwrap();

        let config = PlacementConfig {
            budget_nanos: 0,
            ..PlacementConfig::interactive()
        };
        let clock = ManualClock::stepping(HostTime(0), Duration(1));
        let mut sliced = PauseablePlacement::new(LogEngine::default(), &order, config, clock);
        let mut calls = 0;
        while !sliced.is_done() {
            let before = sliced.engine().calls.len();
            sliced
                .continue_placement(&order, &layers, &tiles, &tiles, &mut Tracer::none())
                .unwrap();
            calls += 1;
            assert!(calls < 100, "pass never finished");
            if !sliced.is_done() {
                assert!(sliced.engine().calls.len() > before, "call made no progress");
            }
        }

        assert!(calls > 1, "zero budget should pause");
        assert_eq!(sliced.engine().calls, full.engine().calls);
        assert_eq!(sliced.slices(), calls);
    }

    #[test]
    fn hand_built_zero_timebase_slices_without_panicking() {
        let order = [A];
        let layers = layers(&[LayerConfig::symbol(A, SRC)]);
        let tiles = tiles(&[1, 2]);
        let clock = ManualClock::stepping(HostTime(0), Duration(1))
            .with_timebase(Timebase { numer: 0, denom: 1 });
        let mut pass = PauseablePlacement::new(
            LogEngine::default(),
            &order,
            PlacementConfig::interactive(),
            clock,
        );

        pass.continue_placement(&order, &layers, &tiles, &tiles, &mut Tracer::none())
            .unwrap();
        assert!(!pass.is_done());
        assert_eq!(pass.engine().calls, vec![Call::Collect(A, 1)]);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn slices_and_layers_are_traced() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Log {
            begun: Vec<LayerId>,
            placed: Vec<(LayerId, u32, u32)>,
            slices: Vec<(u64, u32, bool)>,
        }
        impl TraceSink for Log {
            fn on_layer_begin(&mut self, e: &LayerBeginEvent) {
                self.begun.push(e.layer);
            }
            fn on_layer_placed(&mut self, e: &LayerPlacedEvent) {
                self.placed.push((e.layer, e.tiles, e.bucket_parts));
            }
            fn on_placement_slice(&mut self, e: &PlacementSliceEvent) {
                self.slices.push((e.slice_index, e.layers_completed, e.done));
            }
        }

        let order = [A, B];
        let layers = layers(&[LayerConfig::symbol(A, SRC), LayerConfig::symbol(B, SRC)]);
        let tiles = tiles(&[1, 2]);
        let mut pass = full_pass(&order, ManualClock::new(HostTime(0)));
        let mut log = Log::default();

        pass.continue_placement(&order, &layers, &tiles, &tiles, &mut Tracer::new(&mut log))
            .unwrap();

        assert_eq!(log.begun, vec![B, A]);
        assert_eq!(log.placed, vec![(B, 2, 2), (A, 2, 2)]);
        assert_eq!(log.slices, vec![(0, 2, true)]);
    }
}
