// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Running totals of placement slices.
//!
//! [`SliceStats`] observes [`PlacementSliceEvent`]s and keeps enough to tell
//! whether placement is staying inside its per-frame budget: how many slices
//! ran, how many passes finished, the longest slice, and how often and by how
//! much slices ran over.

use symplace_core::time::Duration;
use symplace_core::trace::{PlacementSliceEvent, TraceSink};

/// Snapshot of [`SliceStats`] totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceReport {
    /// Slices observed.
    pub slices: u64,
    /// Slices that finished a pass.
    pub passes_completed: u64,
    /// Layers finished across all slices.
    pub layers_completed: u64,
    /// Tiles collected plus parts evaluated across all slices.
    pub units: u64,
    /// Total time spent in slices.
    pub total: Duration,
    /// Longest single slice.
    pub max_slice: Duration,
    /// Slices that ran past the budget.
    pub over_budget: u64,
    /// Largest amount by which a slice ran past the budget.
    pub max_overshoot: Duration,
}

/// A [`TraceSink`] that aggregates slice durations against a budget.
///
/// The budget is in the same ticks as the events. Layer events are ignored.
#[derive(Clone, Debug)]
pub struct SliceStats {
    budget: Duration,
    report: SliceReport,
}

impl SliceStats {
    /// Creates a tracker for slices expected to take at most `budget`.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            report: SliceReport::default(),
        }
    }

    /// Returns the budget slices are measured against.
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Returns the totals so far.
    #[must_use]
    pub fn report(&self) -> SliceReport {
        self.report
    }

    /// Mean slice duration, or zero before the first slice.
    #[must_use]
    pub fn mean_slice(&self) -> Duration {
        Duration(
            self.report
                .total
                .ticks()
                .checked_div(self.report.slices)
                .unwrap_or(0),
        )
    }

    /// Clears the totals, keeping the budget.
    pub fn reset(&mut self) {
        self.report = SliceReport::default();
    }
}

impl TraceSink for SliceStats {
    fn on_placement_slice(&mut self, e: &PlacementSliceEvent) {
        let r = &mut self.report;
        let duration = e.duration();

        r.slices = r.slices.saturating_add(1);
        if e.done {
            r.passes_completed = r.passes_completed.saturating_add(1);
        }
        r.layers_completed = r.layers_completed.saturating_add(u64::from(e.layers_completed));
        r.units = r.units.saturating_add(u64::from(e.units));
        r.total = Duration(r.total.ticks().saturating_add(duration.ticks()));
        r.max_slice = r.max_slice.max(duration);

        let overshoot = duration.saturating_sub(self.budget);
        if overshoot > Duration::ZERO {
            r.over_budget = r.over_budget.saturating_add(1);
            r.max_overshoot = r.max_overshoot.max(overshoot);
        }
    }
}
