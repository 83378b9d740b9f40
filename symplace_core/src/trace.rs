// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for placement passes.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! scheduler calls as it works. All method bodies default to no-ops, so
//! implementing only the events you care about is fine. Sinks return nothing:
//! instrumentation can never change the course of a pass.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::style::LayerId;
use crate::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted once at the end of every scheduling call that did any work.
///
/// This is the pass's duration record: one event per frame that advanced
/// placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementSliceEvent {
    /// Zero-based count of scheduling calls in this pass.
    pub slice_index: u64,
    /// Host time when the call started.
    pub start: HostTime,
    /// Host time when the call returned.
    pub end: HostTime,
    /// Layers that finished during this call.
    pub layers_completed: u32,
    /// Tiles collected plus bucket parts evaluated during this call.
    pub units: u32,
    /// Whether the pass finished during this call.
    pub done: bool,
}

impl PlacementSliceEvent {
    /// Returns how long the call ran.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }
}

/// Emitted when a layer becomes active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerBeginEvent {
    /// Scheduling call in which the layer started.
    pub slice_index: u64,
    /// The layer.
    pub layer: LayerId,
    /// Whether the layer's candidates are sorted across tiles.
    pub sorts_across_tiles: bool,
    /// Host time when the layer started.
    pub timestamp: HostTime,
}

/// Emitted when a layer has evaluated all its candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerPlacedEvent {
    /// Scheduling call in which the layer finished.
    pub slice_index: u64,
    /// The layer.
    pub layer: LayerId,
    /// Tiles the layer collected.
    pub tiles: u32,
    /// Bucket parts the layer evaluated.
    pub bucket_parts: u32,
    /// Host time when the layer finished.
    pub timestamp: HostTime,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the placement scheduler.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a layer becomes active.
    fn on_layer_begin(&mut self, e: &LayerBeginEvent) {
        _ = e;
    }

    /// Called when a layer finishes.
    fn on_layer_placed(&mut self, e: &LayerPlacedEvent) {
        _ = e;
    }

    /// Called at the end of each scheduling call.
    fn on_placement_slice(&mut self, e: &PlacementSliceEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`LayerBeginEvent`].
    #[inline]
    pub fn layer_begin(&mut self, e: &LayerBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_layer_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LayerPlacedEvent`].
    #[inline]
    pub fn layer_placed(&mut self, e: &LayerPlacedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_layer_placed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PlacementSliceEvent`].
    #[inline]
    pub fn placement_slice(&mut self, e: &PlacementSliceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_placement_slice(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_slice() -> PlacementSliceEvent {
        PlacementSliceEvent {
            slice_index: 3,
            start: HostTime(1_000),
            end: HostTime(3_500),
            layers_completed: 1,
            units: 12,
            done: false,
        }
    }

    #[test]
    fn slice_duration() {
        assert_eq!(sample_slice().duration(), Duration(2_500));
        let inverted = PlacementSliceEvent {
            end: HostTime(0),
            ..sample_slice()
        };
        assert_eq!(inverted.duration(), Duration::ZERO);
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_placement_slice(&sample_slice());
        sink.on_layer_begin(&LayerBeginEvent {
            slice_index: 0,
            layer: LayerId(1),
            sorts_across_tiles: false,
            timestamp: HostTime(0),
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.placement_slice(&sample_slice());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            slices: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_placement_slice(&mut self, e: &PlacementSliceEvent) {
                self.slices.push(e.slice_index);
            }
        }

        let mut sink = RecordingSink { slices: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.placement_slice(&sample_slice());
        drop(tracer);
        assert_eq!(sink.slices, &[3]);
    }
}
