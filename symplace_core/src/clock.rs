// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time sources for the placement budget.
//!
//! The scheduler never reads a global clock. A [`Clock`] is handed to
//! [`PauseablePlacement`](crate::pauseable::PauseablePlacement) at
//! construction and queried at the start of every call and at every
//! suspension checkpoint.
//!
//! [`ManualClock`] is a deterministic source for tests and offline runs.
//! [`InstantClock`] (feature `std`) reads [`std::time::Instant`].

use core::cell::Cell;

use crate::time::{Duration, HostTime, Timebase};

/// A monotonic time source.
pub trait Clock {
    /// Returns the current time.
    fn now(&self) -> HostTime;

    /// Returns the conversion factor from this clock's ticks to nanoseconds.
    ///
    /// Both fields must be non-zero. A zero field makes every budget zero
    /// ticks long.
    fn timebase(&self) -> Timebase {
        Timebase::NANOS
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> HostTime {
        (**self).now()
    }

    fn timebase(&self) -> Timebase {
        (**self).timebase()
    }
}

/// A clock whose time only moves when told to.
///
/// Optionally, every read advances the clock by a fixed step, which models a
/// fixed cost per unit of work: with a step of `s` ticks and a budget of `b`
/// ticks, one scheduling call performs roughly `b / s` units before pausing.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
    step_per_read: u64,
    timebase: Option<Timebase>,
}

impl ManualClock {
    /// Creates a clock starting at `start` that only moves via
    /// [`set`](Self::set) and [`advance`](Self::advance).
    #[must_use]
    pub fn new(start: HostTime) -> Self {
        Self {
            now: Cell::new(start.0),
            step_per_read: 0,
            timebase: None,
        }
    }

    /// Creates a clock starting at `start` that advances by `step` after
    /// every read.
    #[must_use]
    pub fn stepping(start: HostTime, step: Duration) -> Self {
        Self {
            now: Cell::new(start.0),
            step_per_read: step.0,
            timebase: None,
        }
    }

    /// Overrides the timebase reported by this clock.
    #[must_use]
    pub fn with_timebase(mut self, timebase: Timebase) -> Self {
        self.timebase = Some(timebase);
        self
    }

    /// Sets the current time.
    pub fn set(&self, t: HostTime) {
        self.now.set(t.0);
    }

    /// Moves the clock forward by `d`.
    pub fn advance(&self, d: Duration) {
        self.now.set(self.now.get().saturating_add(d.0));
    }

    /// Returns the current time without triggering the per-read step.
    #[must_use]
    pub fn peek(&self) -> HostTime {
        HostTime(self.now.get())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> HostTime {
        let t = self.now.get();
        self.now.set(t.saturating_add(self.step_per_read));
        HostTime(t)
    }

    fn timebase(&self) -> Timebase {
        self.timebase.unwrap_or(Timebase::NANOS)
    }
}

/// A clock backed by [`std::time::Instant`], in nanosecond ticks since the
/// clock was created.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug)]
pub struct InstantClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl InstantClock {
    /// Creates a clock whose zero is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for InstantClock {
    fn now(&self) -> HostTime {
        let nanos = self.origin.elapsed().as_nanos();
        HostTime(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}
