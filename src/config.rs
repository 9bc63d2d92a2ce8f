//! The root configuration shape passed to [`crate::builder::vlist`] (spec
//! §6, abridged config shape).

use std::rc::Rc;

use web_sys::Element;

use crate::renderer::TemplateOutput;
use crate::size_cache::SizeSource;
use crate::tracked_item::ItemId;
use crate::viewport_state::Orientation;

/// `config.container`: either a CSS selector or a direct element
/// reference. Resolved at `build()` time (spec §6); an unresolvable
/// selector or a detached reference throws [`crate::error::ConfigError::NoContainer`].
pub enum Container {
    /// A CSS selector, queried against `document`.
    Selector(String),
    /// A direct element reference.
    Element(Element),
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
            Self::Element(_) => f.debug_tuple("Element").finish_non_exhaustive(),
        }
    }
}

/// Sizing configuration for the main axis.
pub struct ItemConfig<T> {
    /// The size source (fixed, variable function, or measured-estimate).
    pub size: SizeSource,
    /// Template function: `(item, index) -> Html | Node`.
    pub template: Rc<dyn Fn(&T, usize) -> TemplateOutput>,
    /// Reads an item's `id`, used for change-tracking (spec §3: "the core
    /// treats items as opaque except for reading `id`") and for selection
    /// features keying off identity rather than index. Items without a
    /// meaningful id can leave this as the default, which always returns
    /// `None` — the renderer then re-applies the template on every diff
    /// for that index, which is correct (if wasteful) for opaque items.
    pub get_id: Rc<dyn Fn(&T) -> Option<ItemId>>,
}

impl<T> std::fmt::Debug for ItemConfig<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemConfig").field("size", &self.size).finish_non_exhaustive()
    }
}

impl<T> ItemConfig<T> {
    /// Construct with a size source and template; `get_id` defaults to
    /// "no id" until overridden with [`ItemConfig::with_get_id`].
    pub fn new(size: SizeSource, template: Rc<dyn Fn(&T, usize) -> TemplateOutput>) -> Self {
        Self { size, template, get_id: Rc::new(|_| None) }
    }

    /// Builder-style setter for `get_id`.
    pub fn with_get_id(mut self, get_id: Rc<dyn Fn(&T) -> Option<ItemId>>) -> Self {
        self.get_id = get_id;
        self
    }
}

/// `config.scroll.scrollbar`: styling knobs for the `scrollbar` feature's
/// custom thumb overlay (spec: "a minimal scrollbar sub-config surface").
#[derive(Debug, Clone, Copy)]
pub struct ScrollbarConfig {
    /// Thumb/track thickness in pixels.
    pub width_px: f64,
}

impl Default for ScrollbarConfig {
    fn default() -> Self {
        Self { width_px: 6.0 }
    }
}

/// `config.scroll`: wheel/wrap/idle-timeout/element/scrollbar knobs.
#[derive(Debug, Clone)]
pub struct ScrollConfig {
    /// Whether wheel events are intercepted for compressed-mode fine
    /// motion (spec §4.6).
    pub wheel: bool,
    /// Whether coarse scrollbar jumps wrap at the content edges.
    pub wrap: bool,
    /// Idle-scroll timeout in ms before `vlist--scrolling` is removed
    /// (spec `~150ms` default).
    pub idle_timeout_ms: u32,
    /// Fine-motion rebalancing band half-width as a fraction of the
    /// native track (spec §9: "expose them as config options").
    pub fine_motion_band: f64,
    /// Styling knobs for the `scrollbar` feature's thumb overlay.
    pub scrollbar: ScrollbarConfig,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            wheel: true,
            wrap: false,
            idle_timeout_ms: 150,
            fine_motion_band: 0.25,
            scrollbar: ScrollbarConfig::default(),
        }
    }
}

/// `config.pool`: element-pool sizing.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Maximum idle elements retained per renderer (spec
    /// `DEFAULT_POOL_MAX` = 100).
    pub max_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_size: 100 }
    }
}

/// Root configuration for [`crate::builder::vlist`].
pub struct ListConfig<T> {
    /// Where to mount the DOM scaffold.
    pub container: Container,
    /// The initial item set, if known up front (the async feature may
    /// leave this empty and populate via paging).
    pub items: Vec<T>,
    /// Sizing and templating.
    pub item: ItemConfig<T>,
    /// Vertical or horizontal main axis.
    pub orientation: Orientation,
    /// Render items in reverse main-axis order (spec §6).
    pub reverse: bool,
    /// Items rendered beyond the visible range on each side (spec
    /// `DEFAULT_OVERSCAN` = 3).
    pub overscan: usize,
    /// Prefix for all emitted class names (spec: "stable class names").
    pub class_prefix: String,
    /// `aria-label` applied to the viewport element.
    pub aria_label: Option<String>,
    /// Prefix used to build stable per-item `id` attributes for
    /// `aria-activedescendant` wiring by selection-aware features.
    pub aria_id_prefix: Option<String>,
    /// Scroll-related knobs.
    pub scroll: ScrollConfig,
    /// Element-pool sizing.
    pub pool: PoolConfig,
}

impl<T> std::fmt::Debug for ListConfig<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListConfig")
            .field("container", &self.container)
            .field("item_count", &self.items.len())
            .field("orientation", &self.orientation)
            .field("reverse", &self.reverse)
            .field("overscan", &self.overscan)
            .field("class_prefix", &self.class_prefix)
            .field("aria_label", &self.aria_label)
            .field("aria_id_prefix", &self.aria_id_prefix)
            .field("scroll", &self.scroll)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl<T> ListConfig<T> {
    /// Start a builder-style config with required fields and defaults for
    /// everything else, mirroring how `ListConfigBuilder` chains setters.
    pub fn new(container: Container, item: ItemConfig<T>) -> Self {
        Self {
            container,
            items: Vec::new(),
            item,
            orientation: Orientation::Vertical,
            reverse: false,
            overscan: 3,
            class_prefix: "vlist".to_string(),
            aria_label: None,
            aria_id_prefix: None,
            scroll: ScrollConfig::default(),
            pool: PoolConfig::default(),
        }
    }

    /// Builder-style setter for `items`.
    pub fn with_items(mut self, items: Vec<T>) -> Self {
        self.items = items;
        self
    }

    /// Builder-style setter for `orientation`.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Builder-style setter for `overscan`.
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Builder-style setter for `class_prefix`.
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    /// Builder-style setter for `reverse`.
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Builder-style setter for `scroll`.
    pub fn with_scroll(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = scroll;
        self
    }

    /// Builder-style setter for `pool`.
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }
}
