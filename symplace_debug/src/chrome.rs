// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Scheduling calls become complete (`"X"`) events on thread 0. Layers become
//! begin/end (`"B"`/`"E"`) pairs on thread 1, so a layer that spans several
//! frames shows up as one long bar above the slices that advanced it.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use symplace_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

const SLICE_TID: u32 = 0;
const LAYER_TID: u32 = 1;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::PlacementSlice(e) => {
                events.push(json!({
                    "ph": "X",
                    "name": "PlacementSlice",
                    "cat": "Placement",
                    "ts": ticks_to_us(e.start.ticks(), timebase),
                    "dur": ticks_to_us(e.duration().ticks(), timebase),
                    "pid": 0,
                    "tid": SLICE_TID,
                    "args": {
                        "slice_index": e.slice_index,
                        "layers_completed": e.layers_completed,
                        "units": e.units,
                        "done": e.done,
                    }
                }));
            }
            RecordedEvent::LayerBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("layer {}", e.layer.0),
                    "cat": "Layer",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": LAYER_TID,
                    "args": {
                        "slice_index": e.slice_index,
                        "sorts_across_tiles": e.sorts_across_tiles,
                    }
                }));
            }
            RecordedEvent::LayerPlaced(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("layer {}", e.layer.0),
                    "cat": "Layer",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": LAYER_TID,
                    "args": {
                        "slice_index": e.slice_index,
                        "tiles": e.tiles,
                        "bucket_parts": e.bucket_parts,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}
