//! The dimension-agnostic mutable record the render loop mutates in place
//! every frame (spec §3 "Viewport State", §9 "Axis-neutral types").

use crate::range_math::Range;

/// Which physical axis "main axis" maps to. The core exposes one `Size`/
/// `Offset` vocabulary; this flag selects which DOM property each maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Main axis is vertical: `scrollTop`/`clientHeight`/`translateY`.
    Vertical,
    /// Main axis is horizontal: `scrollLeft`/`clientWidth`/`translateX`.
    Horizontal,
}

impl Orientation {
    /// The CSS transform function name for this orientation.
    pub fn transform_fn(&self) -> &'static str {
        match self {
            Self::Vertical => "translateY",
            Self::Horizontal => "translateX",
        }
    }
}

/// Mutable viewport/scroll state, reused in place rather than reallocated
/// per frame (spec §9 memory discipline).
#[derive(Debug, Clone)]
pub struct ViewportState {
    /// Current scroll position along the main axis, in logical content
    /// pixels (already decompressed if in compressed scroll mode).
    pub scroll_position: f64,
    /// The viewport element's main-axis client size.
    pub container_size: f64,
    /// The scroll size presented to the browser (possibly capped by
    /// compression).
    pub total_size: f64,
    /// The true logical content extent, independent of any cap.
    pub actual_size: f64,
    /// Whether the scroll controller is in compressed mode.
    pub is_compressed: bool,
    /// `virtual_size / actual_size` when compressed; `1.0` otherwise.
    pub compression_ratio: f64,
    /// Indices that are geometrically visible.
    pub visible_range: Range,
    /// Visible range expanded by overscan; the set eligible for a DOM
    /// element.
    pub render_range: Range,
    /// Which physical axis is the main axis.
    pub orientation: Orientation,
}

impl ViewportState {
    /// A fresh, zeroed state for the given orientation.
    pub fn new(orientation: Orientation) -> Self {
        Self {
            scroll_position: 0.0,
            container_size: 0.0,
            total_size: 0.0,
            actual_size: 0.0,
            is_compressed: false,
            compression_ratio: 1.0,
            visible_range: Range::empty(),
            render_range: Range::empty(),
            orientation,
        }
    }
}
