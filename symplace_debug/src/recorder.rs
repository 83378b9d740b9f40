// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, each prefixed by a one-byte
//! tag. [`decode`] reads them back as an iterator of [`RecordedEvent`].

use symplace_core::style::LayerId;
use symplace_core::time::HostTime;
use symplace_core::trace::{LayerBeginEvent, LayerPlacedEvent, PlacementSliceEvent, TraceSink};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PLACEMENT_SLICE: u8 = 1;
const TAG_LAYER_BEGIN: u8 = 2;
const TAG_LAYER_PLACED: u8 = 3;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }
}

impl TraceSink for RecorderSink {
    fn on_layer_begin(&mut self, e: &LayerBeginEvent) {
        self.write_u8(TAG_LAYER_BEGIN);
        self.write_u64(e.slice_index);
        self.write_u32(e.layer.0);
        self.write_bool(e.sorts_across_tiles);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_layer_placed(&mut self, e: &LayerPlacedEvent) {
        self.write_u8(TAG_LAYER_PLACED);
        self.write_u64(e.slice_index);
        self.write_u32(e.layer.0);
        self.write_u32(e.tiles);
        self.write_u32(e.bucket_parts);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_placement_slice(&mut self, e: &PlacementSliceEvent) {
        self.write_u8(TAG_PLACEMENT_SLICE);
        self.write_u64(e.slice_index);
        self.write_u64(e.start.ticks());
        self.write_u64(e.end.ticks());
        self.write_u32(e.layers_completed);
        self.write_u32(e.units);
        self.write_bool(e.done);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`PlacementSliceEvent`].
    PlacementSlice(PlacementSliceEvent),
    /// A [`LayerBeginEvent`].
    LayerBegin(LayerBeginEvent),
    /// A [`LayerPlacedEvent`].
    LayerPlaced(LayerPlacedEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn decode_placement_slice(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PlacementSlice(PlacementSliceEvent {
            slice_index: self.read_u64()?,
            start: HostTime(self.read_u64()?),
            end: HostTime(self.read_u64()?),
            layers_completed: self.read_u32()?,
            units: self.read_u32()?,
            done: self.read_bool()?,
        }))
    }

    fn decode_layer_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::LayerBegin(LayerBeginEvent {
            slice_index: self.read_u64()?,
            layer: LayerId(self.read_u32()?),
            sorts_across_tiles: self.read_bool()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_layer_placed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::LayerPlaced(LayerPlacedEvent {
            slice_index: self.read_u64()?,
            layer: LayerId(self.read_u32()?),
            tiles: self.read_u32()?,
            bucket_parts: self.read_u32()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_PLACEMENT_SLICE => self.decode_placement_slice(),
            TAG_LAYER_BEGIN => self.decode_layer_begin(),
            TAG_LAYER_PLACED => self.decode_layer_placed(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
