// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract violations reported by the scheduler.
//!
//! Running out of budget, empty tile lists, and already finished passes are
//! normal control flow and never produce an error. Only inputs that would
//! otherwise silently drop a layer from the map are rejected.

use core::fmt;

use crate::style::LayerId;

/// Errors returned by
/// [`PauseablePlacement::continue_placement`](crate::pauseable::PauseablePlacement::continue_placement).
///
/// The scheduler stays positioned on the layer that failed, so retrying with
/// corrected inputs resumes the pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementError {
    /// The evaluation order names a layer that has no configuration.
    UnknownLayer(LayerId),
    /// The evaluation order is not the one the pass was created with.
    OrderLengthChanged {
        /// Length of the order the pass was created with.
        expected: usize,
        /// Length of the order passed to this call.
        found: usize,
    },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLayer(id) => {
                write!(f, "layer {} is in the placement order but has no configuration", id.0)
            }
            Self::OrderLengthChanged { expected, found } => write!(
                f,
                "placement order changed mid-pass: expected {expected} layers, found {found}"
            ),
        }
    }
}

impl core::error::Error for PlacementError {}
