// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use symplace_core::time::{HostTime, Timebase};
use symplace_core::trace::{LayerBeginEvent, LayerPlacedEvent, PlacementSliceEvent, TraceSink};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_layer_begin(&mut self, e: &LayerBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[layer:begin] slice={} layer={} sorted={} at {:.1}µs",
            e.slice_index,
            e.layer.0,
            e.sorts_across_tiles,
            self.host_us(e.timestamp),
        );
    }

    fn on_layer_placed(&mut self, e: &LayerPlacedEvent) {
        let _ = writeln!(
            self.writer,
            "[layer:placed] slice={} layer={} tiles={} parts={} at {:.1}µs",
            e.slice_index,
            e.layer.0,
            e.tiles,
            e.bucket_parts,
            self.host_us(e.timestamp),
        );
    }

    fn on_placement_slice(&mut self, e: &PlacementSliceEvent) {
        let _ = writeln!(
            self.writer,
            "[slice] #{} {:.1}µs layers={} units={}{}",
            e.slice_index,
            self.ticks_to_us(e.duration().ticks()),
            e.layers_completed,
            e.units,
            if e.done { " done" } else { "" },
        );
    }
}
