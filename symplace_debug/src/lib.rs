// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, statistics, and Chrome trace export for
//! symplace diagnostics.
//!
//! This crate provides [`TraceSink`](symplace_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//! - [`stats::SliceStats`]: running totals of slice durations against a
//!   budget.

pub mod chrome;
pub mod pretty;
pub mod recorder;
pub mod stats;
