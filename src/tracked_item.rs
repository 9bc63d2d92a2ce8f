//! The per-index bookkeeping the renderer uses to diff instead of
//! re-materializing on every frame (spec §3 "Tracked Item").

use web_sys::Element;

/// An identifier an item may expose; read-only to the core, used for
/// change-tracking and optional `data-id`/ARIA attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemId {
    /// A string identifier.
    Str(String),
    /// A numeric identifier.
    Num(u64),
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Num(n) => write!(f, "{n}"),
        }
    }
}

/// State tracked for a currently-materialized index, so the renderer can
/// skip redundant DOM writes on steady scroll frames.
#[derive(Debug)]
pub struct TrackedItem {
    /// The live DOM element backing this index.
    pub element: Element,
    /// The item `id` last applied to `element`'s template.
    pub last_item_id: Option<ItemId>,
    /// Whether the selected class was last applied.
    pub last_selected: bool,
    /// Whether the focused class was last applied.
    pub last_focused: bool,
    /// The last main-axis offset written as a transform.
    pub last_offset: f64,
    /// Frame counter value at which this index was last part of the
    /// render range (used to compute the release grace window).
    pub last_seen_frame: u64,
}

impl TrackedItem {
    /// Construct a freshly materialized entry. `last_item_id` starts as
    /// `None` so the first diff always re-applies the template.
    pub fn new(element: Element, frame: u64) -> Self {
        Self {
            element,
            last_item_id: None,
            last_selected: false,
            last_focused: false,
            last_offset: f64::NAN,
            last_seen_frame: frame,
        }
    }
}
