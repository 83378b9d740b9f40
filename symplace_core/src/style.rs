// Copyright 2026 the Symplace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style-layer configuration as seen by the placement scheduler.
//!
//! Only the handful of properties that influence *scheduling* are modeled
//! here: the layer kind, its zoom range, its data source, how its symbols are
//! ordered, and whether its tiles are drawn elevated. Everything else about a
//! layer is the engine's business.

use core::fmt;

/// Identifies a style layer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u32);

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({})", self.0)
    }
}

/// Identifies the tile source a layer draws from.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(pub u32);

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

/// The rendering type of a layer. Only [`Symbol`](Self::Symbol) layers are
/// placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Labels and icons.
    Symbol,
    /// Stroked lines.
    Line,
    /// Filled polygons.
    Fill,
    /// Circles at point features.
    Circle,
    /// Raster imagery.
    Raster,
    /// Solid background.
    Background,
}

/// How symbols within a layer are ordered relative to each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SymbolZOrder {
    /// Sort key if present, otherwise viewport-y for point placement.
    #[default]
    Auto,
    /// By screen-space y, so lower symbols draw on top.
    ViewportY,
    /// In source (feature) order.
    Source,
}

/// The symbol sort key of a layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SortKey {
    /// No sort key.
    #[default]
    None,
    /// The same key for every feature.
    Constant(f64),
    /// A key evaluated per feature.
    DataDriven,
}

/// Scheduling-relevant configuration of one style layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerConfig {
    /// The layer's identity.
    pub id: LayerId,
    /// What the layer draws.
    pub kind: LayerKind,
    /// The source the layer's tiles come from.
    pub source: SourceId,
    /// Lowest zoom (inclusive) at which the layer is shown, if bounded.
    pub min_zoom: Option<f64>,
    /// Zoom (exclusive) at which the layer stops being shown, if bounded.
    pub max_zoom: Option<f64>,
    /// Symbol ordering mode.
    pub z_order: SymbolZOrder,
    /// Symbol sort key.
    pub sort_key: SortKey,
    /// Whether symbols are drawn elevated, which requires tiles in
    /// y order.
    pub z_elevate: bool,
}

impl LayerConfig {
    /// Creates a symbol layer with no zoom bounds, automatic z-order and no
    /// sort key.
    #[must_use]
    pub const fn symbol(id: LayerId, source: SourceId) -> Self {
        Self::with_kind(id, LayerKind::Symbol, source)
    }

    /// Creates a layer of the given kind with default symbol properties.
    #[must_use]
    pub const fn with_kind(id: LayerId, kind: LayerKind, source: SourceId) -> Self {
        Self {
            id,
            kind,
            source,
            min_zoom: None,
            max_zoom: None,
            z_order: SymbolZOrder::Auto,
            sort_key: SortKey::None,
            z_elevate: false,
        }
    }

    /// Sets the zoom range.
    #[must_use]
    pub const fn zoom_range(mut self, min_zoom: Option<f64>, max_zoom: Option<f64>) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Sets the sort key.
    #[must_use]
    pub const fn sort_key(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    /// Sets the z-order mode.
    #[must_use]
    pub const fn z_order(mut self, z_order: SymbolZOrder) -> Self {
        self.z_order = z_order;
        self
    }

    /// Sets whether the layer is elevated.
    #[must_use]
    pub const fn elevated(mut self, z_elevate: bool) -> Self {
        self.z_elevate = z_elevate;
        self
    }

    /// Returns whether candidates from all tiles must be sorted together
    /// before any of them is evaluated.
    ///
    /// True only when the layer is not ordered by viewport y and its sort key
    /// varies per feature. Otherwise candidates are evaluated per tile in
    /// discovery order.
    #[must_use]
    pub fn sorts_across_tiles(&self) -> bool {
        self.z_order != SymbolZOrder::ViewportY && matches!(self.sort_key, SortKey::DataDriven)
    }

    /// Returns whether the layer's zoom range contains `zoom`.
    ///
    /// The minimum is inclusive, the maximum exclusive; absent bounds are
    /// unbounded.
    #[must_use]
    pub fn is_visible_at(&self, zoom: f64) -> bool {
        self.min_zoom.is_none_or(|min| min <= zoom) && self.max_zoom.is_none_or(|max| max > zoom)
    }

    /// Returns whether the scheduler places this layer at `zoom`.
    #[must_use]
    pub fn is_placed_at(&self, zoom: f64) -> bool {
        self.kind == LayerKind::Symbol && self.is_visible_at(zoom)
    }
}
