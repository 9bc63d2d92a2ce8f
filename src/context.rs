//! The coordinating object passed to every feature's `setup` (spec §3
//! "Builder Context", §4.8).
//!
//! Per §9's note on closure-heavy state, the core's otherwise-scattered
//! mutable variables are grouped into this one typed record rather than a
//! chain of captured `let` bindings. Features run sequentially at build
//! time and mutate it directly; after `build()` returns, only the core's
//! render loop mutates it, synchronously, within one frame (spec §5:
//! "single-writer").

use std::any::Any;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::data_manager::DataManager;
use crate::dom::DomScaffold;
use crate::emitter::Emitter;
use crate::range_math::Range;
use crate::renderer::Renderer;
use crate::scroll_controller::ScrollController;
use crate::size_cache::SizeCache;
use crate::viewport_state::ViewportState;

/// Resolved, immutable-after-build configuration features may still read.
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Items rendered beyond the visible range on each side.
    pub overscan: usize,
    /// Prefix applied to every emitted class name.
    pub class_prefix: String,
    /// Render items in reverse main-axis order.
    pub reverse: bool,
    /// Whether wheel events are intercepted for compressed-mode fine
    /// motion; gates whether `list.rs` even attaches the wheel listener.
    pub wheel_enabled: bool,
    /// Idle-scroll timeout in ms before `{prefix}--scrolling` is removed.
    pub idle_timeout_ms: u32,
    /// Scrollbar feature styling knobs.
    pub scrollbar: crate::config::ScrollbarConfig,
}

/// Handler slots a feature pushes onto during `setup` (spec §3: "handler
/// slots (afterScroll, clickHandlers, keydownHandlers, resizeHandlers,
/// contentSizeHandlers, destroyHandlers)").
#[derive(Default)]
pub struct HandlerSlots<T> {
    /// Run after every scroll-driven render, with the updated state.
    pub after_scroll: Vec<Rc<dyn Fn(&ViewportState)>>,
    /// Run on `item:click`, given the clicked index and item.
    pub click_handlers: Vec<Rc<dyn Fn(usize, Option<&T>, &web_sys::MouseEvent)>>,
    /// Run on a keydown delegated from the viewport.
    pub keydown_handlers: Vec<Rc<dyn Fn(&web_sys::KeyboardEvent)>>,
    /// Run on a container resize.
    pub resize_handlers: Vec<Rc<dyn Fn(f64, f64)>>,
    /// Run whenever the size cache's total content size changes.
    pub content_size_handlers: Vec<Rc<dyn Fn(f64)>>,
    /// Run in reverse registration order during `destroy`.
    pub destroy_handlers: Vec<Box<dyn FnMut(&mut BuilderContext<T>)>>,
}

impl<T> std::fmt::Debug for HandlerSlots<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSlots")
            .field("after_scroll", &self.after_scroll.len())
            .field("click_handlers", &self.click_handlers.len())
            .field("keydown_handlers", &self.keydown_handlers.len())
            .field("resize_handlers", &self.resize_handlers.len())
            .field("content_size_handlers", &self.content_size_handlers.len())
            .field("destroy_handlers", &self.destroy_handlers.len())
            .finish()
    }
}

/// Visible-range override a layout feature (grid/masonry) may install in
/// place of the default `range_math::visible_range` + `apply_overscan`
/// pipeline (spec §4.5 step 2: "the active visible-range function,
/// default or feature-installed").
pub type RangeFn = Box<dyn Fn(f64, f64, &SizeCache, usize, usize) -> Range>;

/// The shared mutable state exposed to features, and, after `build()`,
/// owned by the render loop.
pub struct BuilderContext<T> {
    /// The viewport/content/items DOM scaffold.
    pub dom: DomScaffold,
    /// Dimension-agnostic viewport/scroll record, mutated in place.
    pub state: ViewportState,
    /// Synchronous named-event pub/sub.
    pub emitter: Emitter,
    /// Type-erased method registry; features register under a name during
    /// `setup` and look each other up by name + downcast (spec §4.8
    /// "Cooperation pattern").
    pub methods: HashMap<String, Rc<dyn Any>>,
    /// Resolved, mostly-static configuration.
    pub resolved_config: ResolvedConfig,
    /// Index ↔ offset mapping.
    pub size_cache: SizeCache,
    /// Native/compressed scroll mapping.
    pub scroll_controller: ScrollController,
    /// Item store; replaceable by the async feature.
    pub data_manager: Box<dyn DataManager<T>>,
    /// Diff/materialize/release machinery over the items container.
    pub renderer: Renderer<T>,
    /// Handler slots features push onto.
    pub handlers: HandlerSlots<T>,
    /// Feature-installed visible-range override, if any.
    pub range_fn: Option<RangeFn>,
    /// Whether `forceRender`'s flag is currently set; consumed by the next
    /// `render_if_needed` call.
    pub force_render_flag: bool,
    /// A shared force-render latch features can clone via
    /// [`BuilderContext::render_trigger`] and set from a registered method
    /// closure that outlives `setup` (e.g. selection's `select`/
    /// `toggleSelect`), since such closures can't hold `&mut Self` the way
    /// [`BuilderContext::force_render`] does (spec §5: "Selection-change
    /// side effects ... observable no later than the frame after the
    /// change").
    pub pending_force: Rc<Cell<bool>>,
    /// Monotonic frame counter, incremented once per `render_if_needed`
    /// call that actually renders.
    pub frame_counter: u64,
    /// Scroll position as of the last render, for `render_if_needed`'s
    /// early-exit check.
    pub last_scroll_position: f64,
    /// Container size as of the last render, for the same early-exit
    /// check.
    pub last_container_size: f64,
    /// A logical scroll position a feature wants applied before the next
    /// render, for a feature that substitutes its own source of scroll
    /// truth (e.g. page-scroll reading `window.scrollY`) instead of the
    /// viewport's own `scrollTop` (spec §4.6: "Feature replacement (e.g.
    /// page-scroll) substitutes window scroll as the source").
    pub external_scroll: Rc<Cell<Option<f64>>>,
    /// Selection/focus state as of the last render, so the render loop can
    /// detect a change and emit `selection:change` without any feature
    /// touching the emitter directly.
    pub last_selection: (Rc<std::collections::HashSet<crate::tracked_item::ItemId>>, Option<usize>),
}

impl<T> std::fmt::Debug for BuilderContext<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderContext")
            .field("state", &self.state)
            .field("resolved_config", &self.resolved_config)
            .field("frame_counter", &self.frame_counter)
            .finish_non_exhaustive()
    }
}

impl<T> BuilderContext<T> {
    /// Register a method under `name`. `F` is typically a fat closure
    /// pointer like `Rc<dyn Fn(usize) -> bool>` — a `Sized`, `'static`
    /// value that can itself be boxed as `Any`, so later lookups can
    /// `downcast_ref` back to the exact `F` they expect. A later
    /// registration with the same name silently replaces the earlier one
    /// (last feature wins), mirroring the JS registry's plain
    /// object-assignment semantics.
    pub fn register_method<F: 'static>(&mut self, name: impl Into<String>, method: F) {
        self.methods.insert(name.into(), Rc::new(method));
    }

    /// Look up and downcast a previously registered method. Returns `None`
    /// if nothing is registered under `name`, or if a different feature
    /// registered a value of a different type under the same name.
    pub fn get_method<F: Clone + 'static>(&self, name: &str) -> Option<F> {
        self.methods.get(name)?.downcast_ref::<F>().cloned()
    }

    /// Set the flag `render_if_needed` checks, and bump the frame counter
    /// far enough past the grace window that stale tracked items flush
    /// immediately on a forced render (spec §4.5: "forced renders bump the
    /// frame counter past the grace window").
    pub fn force_render(&mut self) {
        self.force_render_flag = true;
        self.frame_counter += crate::renderer::RELEASE_GRACE + 1;
    }

    /// Clone the shared force-render latch, so a feature's registered
    /// method can request a render from outside any `&mut BuilderContext`
    /// borrow (see [`BuilderContext::pending_force`]).
    pub fn render_trigger(&self) -> Rc<Cell<bool>> {
        self.pending_force.clone()
    }

    /// Clone the shared external-scroll-override cell (see
    /// [`BuilderContext::external_scroll`]).
    pub fn external_scroll_trigger(&self) -> Rc<Cell<Option<f64>>> {
        self.external_scroll.clone()
    }

    /// Replace the data manager, e.g. the async feature installing its own
    /// paging implementation in place of [`crate::data_manager::InMemoryDataManager`].
    pub fn set_data_manager(&mut self, data_manager: Box<dyn crate::data_manager::DataManager<T>>) {
        self.data_manager = data_manager;
        self.renderer.clear();
        self.force_render();
    }

    /// Rebuild the size cache for a new item count, e.g. after a feature
    /// changes how many logical rows the sizing function covers.
    pub fn rebuild_size_cache(&mut self, new_total: usize) {
        self.size_cache.rebuild(new_total);
        self.scroll_controller.set_actual_size(self.size_cache.total_size());
        self.force_render();
    }
}
