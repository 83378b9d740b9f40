// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-call time budget and placement configuration.
//!
//! Each call to
//! [`PauseablePlacement::continue_placement`](crate::pauseable::PauseablePlacement::continue_placement)
//! derives one [`Deadline`] from its start time. The same deadline is checked
//! after every collected tile and every evaluated bucket part, across however
//! many layers the call reaches, so the budget is shared by the whole call.
//!
//! The budget is soft: a check only happens between whole units, so a single
//! call can overshoot by the cost of one tile extraction or one bucket part
//! evaluation. Engines that need tighter frame times should keep individual
//! units small (for example by splitting large buckets into several parts).

use crate::time::{Duration, HostTime};

/// Default budget for one scheduling call: 2 ms.
pub const DEFAULT_PLACEMENT_BUDGET_NANOS: u64 = 2_000_000;

/// Default symbol fade duration: 300 ms.
pub const DEFAULT_FADE_DURATION_MS: u32 = 300;

/// The point after which a scheduling call must yield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Deadline(Option<HostTime>);

impl Deadline {
    /// A deadline that never expires.
    pub const UNBOUNDED: Self = Self(None);

    /// A deadline `budget` after `start`.
    #[must_use]
    pub const fn after(start: HostTime, budget: Duration) -> Self {
        Self(Some(start.saturating_add(budget)))
    }

    /// Returns the deadline instant, or `None` if unbounded.
    #[must_use]
    pub const fn instant(self) -> Option<HostTime> {
        self.0
    }

    /// Returns whether the deadline has passed at `now`.
    ///
    /// Expiry is strict: a call that has used exactly its budget may still
    /// continue.
    #[must_use]
    pub fn is_expired(self, now: HostTime) -> bool {
        self.0.is_some_and(|deadline| now > deadline)
    }
}

/// Policy for one placement pass.
///
/// Passed to
/// [`PauseablePlacement::new`](crate::pauseable::PauseablePlacement::new),
/// and read by engines that need the fade or cross-source settings (see
/// [`CollisionPlacement::new`](crate::collision::CollisionPlacement::new)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlacementConfig {
    /// Ignore the time budget and finish the pass in a single call.
    ///
    /// Used for non-interactive renders such as exports and snapshots.
    pub force_full_placement: bool,
    /// Ask the engine to keep collision boxes for debug drawing.
    pub show_collision_boxes: bool,
    /// Symbol fade-in/out duration in milliseconds. Zero disables fading.
    pub fade_duration_ms: u32,
    /// Whether symbols from different sources collide with each other.
    pub cross_source_collisions: bool,
    /// Time budget for one scheduling call, in nanoseconds.
    pub budget_nanos: u64,
}

impl PlacementConfig {
    /// Configuration for interactive rendering: budgeted calls, default fade.
    #[must_use]
    pub const fn interactive() -> Self {
        Self {
            force_full_placement: false,
            show_collision_boxes: false,
            fade_duration_ms: DEFAULT_FADE_DURATION_MS,
            cross_source_collisions: true,
            budget_nanos: DEFAULT_PLACEMENT_BUDGET_NANOS,
        }
    }

    /// Configuration for export renders: one unbounded call, no fading.
    #[must_use]
    pub const fn export() -> Self {
        Self {
            force_full_placement: true,
            show_collision_boxes: false,
            fade_duration_ms: 0,
            cross_source_collisions: true,
            budget_nanos: DEFAULT_PLACEMENT_BUDGET_NANOS,
        }
    }

    /// Derives the deadline for a call that started at `start`.
    ///
    /// `budget` is [`budget_nanos`](Self::budget_nanos) already converted to
    /// the clock's ticks.
    #[must_use]
    pub const fn deadline(&self, start: HostTime, budget: Duration) -> Deadline {
        if self.force_full_placement {
            Deadline::UNBOUNDED
        } else {
            Deadline::after(start, budget)
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self::interactive()
    }
}
