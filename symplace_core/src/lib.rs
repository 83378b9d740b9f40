// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-sliced, resumable symbol placement.
//!
//! Placing labels and icons for a map view means collecting candidate
//! placements from many tiles, optionally sorting them by priority, and
//! running a collision pass over each one. The total cost of that work is
//! unbounded, so `symplace_core` splits it into small units and runs only as
//! many as fit into a per-frame budget. The next frame resumes exactly where
//! the previous one stopped; once the pass is done its result is identical to
//! an uninterrupted run.
//!
//! It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   Render driver (once per frame)
//!       │
//!       ▼
//!   PauseablePlacement::continue_placement() ── Deadline ──┐
//!       │  back-to-front over the layer order               │
//!       ▼                                                   ▼
//!   LayerPlacement::continue_placement() ──► Clock::now() > deadline?
//!       │  collect ► sort once ► evaluate                   │
//!       ▼                                                   │
//!   PlacementEngine (bucket_parts, place_bucket_part) ◄─────┘
//!       │
//!       ▼
//!   PauseablePlacement::commit() ──► snapshot for the renderer
//! ```
//!
//! **[`pauseable`]**: The top-level [`PauseablePlacement`](pauseable::PauseablePlacement)
//! that walks layers back to front and enforces the time budget.
//!
//! **[`layer_placement`]**: The per-layer resumable state object.
//!
//! **[`engine`]**: The [`PlacementEngine`](engine::PlacementEngine) trait the
//! scheduler drives. Collision geometry and the decision algorithm live behind
//! it.
//!
//! **[`collision`]**: A reference engine over simple box geometry, with fade
//! bookkeeping on commit.
//!
//! **[`style`]**: Layer configuration: kind, zoom range, z-order, sort key.
//!
//! **[`bucket`]**: Candidate work items and the identifiers they carry.
//!
//! **[`budget`]**: Deadlines and the placement configuration.
//!
//! **[`clock`]**: The [`Clock`](clock::Clock) time source seam.
//!
//! **[`time`]**: Tick-based host time, durations, and timebases.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! placement instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! **[`error`]**: Contract violations reported by the scheduler.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies and
//!   the [`InstantClock`](clock::InstantClock) time source.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bucket;
pub mod budget;
pub mod clock;
pub mod collision;
pub mod engine;
pub mod error;
pub mod layer_placement;
pub mod pauseable;
pub mod style;
pub mod time;
pub mod trace;
