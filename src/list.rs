//! The public handle returned by [`crate::builder::VlistBuilder::build`]
//! (spec §6 "Public handle methods").
//!
//! `VList<T>` owns the [`BuilderContext<T>`] behind an `Rc<RefCell<_>>` so
//! the DOM event closures it attaches (scroll, resize, click, keydown) can
//! reach back into shared state after `build()` returns. Per spec §5 the
//! context is single-writer after build: only these closures, running
//! synchronously on the main thread, ever borrow it mutably.
//!
//! Two spots intentionally diverge from the spec's JS-shaped surface,
//! because Rust's ownership rules don't admit a direct translation:
//! - `getItem`/`getItems` return borrowed data in the original; here
//!   [`VList::get_item`]/[`VList::get_items`] take a callback instead of
//!   handing out a reference tied to an internal `RefCell` borrow.
//! - "Feature-contributed methods appear conditionally on the handle" is a
//!   dynamic-object pattern with no static equivalent; [`VList::get_method`]
//!   exposes the same type-erased registry [`BuilderContext::get_method`]
//!   uses internally, typed by the caller.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{Event, KeyboardEvent, MouseEvent, WheelEvent};

use crate::context::BuilderContext;
use crate::data_manager::DataManager;
use crate::dom::{self, ObservedElement, ResizeObserver};
use crate::error::StateError;
use crate::range_math::Align;
use crate::render_loop::{self, RenderOutcome};
use crate::tracked_item::ItemId;

/// `{ scrollPosition }`, emitted as `scroll` once per coalesced frame.
#[derive(Debug, Clone, Copy)]
pub struct ScrollEvent {
    /// The logical scroll position after this frame's render.
    pub scroll_position: f64,
}

/// `{ start, end }`, emitted as `range:change` when the render range moves.
#[derive(Debug, Clone, Copy)]
pub struct RangeChangeEvent {
    /// Inclusive start of the new render range.
    pub start: usize,
    /// Exclusive end of the new render range.
    pub end: usize,
}

/// `{ velocity, reliable }`, emitted as `velocity:change` at most once per
/// frame when the reading changes materially.
#[derive(Debug, Clone, Copy)]
pub struct VelocityChangeEvent {
    /// Signed px/ms.
    pub velocity: f64,
    /// Whether enough samples back this reading.
    pub reliable: bool,
}

/// `{ width, height }`, emitted as `resize` on a container resize.
#[derive(Debug, Clone, Copy)]
pub struct ResizeEvent {
    /// The container's new client width.
    pub width: f64,
    /// The container's new client height.
    pub height: f64,
}

/// `{ index, event }`, emitted as `item:click`/`item:dblclick`. The clicked
/// item itself is not carried in the payload (see module docs); listeners
/// that need it call [`VList::get_item`] with the index.
#[derive(Debug, Clone)]
pub struct ItemClickEvent {
    /// The clicked item's index.
    pub index: usize,
    /// The originating DOM event.
    pub event: MouseEvent,
}

/// A restorable descriptor of scroll position (and selection, if a
/// selection feature is present), per spec §6 `getScrollSnapshot`.
#[derive(Debug, Clone)]
pub struct ScrollSnapshot {
    /// The index at the top of the viewport.
    pub index: usize,
    /// How far into that item the viewport's top edge sits.
    pub offset_in_item: f64,
    /// The item count this snapshot was taken against.
    pub total: usize,
    /// The selected-id set at snapshot time, if a selection feature is
    /// installed.
    pub selected_ids: Option<HashSet<ItemId>>,
}

struct Listeners {
    scroll: Option<Closure<dyn FnMut(Event)>>,
    wheel: Option<Closure<dyn FnMut(WheelEvent)>>,
    click: Option<Closure<dyn FnMut(MouseEvent)>>,
    dblclick: Option<Closure<dyn FnMut(MouseEvent)>>,
    keydown: Option<Closure<dyn FnMut(KeyboardEvent)>>,
    resize_observer: Option<ResizeObserver>,
    observed_viewport: Option<ObservedElement>,
    idle_timeout: Option<Timeout>,
}

struct Inner<T> {
    ctx: BuilderContext<T>,
    destroyed: bool,
    raf_pending: bool,
    last_velocity: Option<VelocityChangeEvent>,
    listeners: Listeners,
}

/// The handle returned by a successful `build()`. Cloning is cheap
/// (reference-counted); clones share the same underlying list instance, so
/// calling `destroy()` on one clone destroys the list for all of them.
pub struct VList<T> {
    shared: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for VList<T> {
    fn clone(&self) -> Self {
        Self { shared: self.shared.clone() }
    }
}

const EVT_SCROLL: &str = "scroll";
const EVT_RANGE_CHANGE: &str = "range:change";
const EVT_VELOCITY_CHANGE: &str = "velocity:change";
const EVT_RESIZE: &str = "resize";
const EVT_ITEM_CLICK: &str = "item:click";
const EVT_ITEM_DBLCLICK: &str = "item:dblclick";

impl<T: 'static> VList<T> {
    /// Wrap a fully-assembled [`BuilderContext`] (post initial render) and
    /// attach the scroll/resize/click/keydown listeners the core owns
    /// directly (spec §4.5's trigger surface, §6's click/dblclick events).
    pub(crate) fn new(ctx: BuilderContext<T>) -> Self {
        let inner = Inner {
            ctx,
            destroyed: false,
            raf_pending: false,
            last_velocity: None,
            listeners: Listeners {
                scroll: None,
                wheel: None,
                click: None,
                dblclick: None,
                keydown: None,
                resize_observer: None,
                observed_viewport: None,
                idle_timeout: None,
            },
        };
        let list = Self { shared: Rc::new(RefCell::new(inner)) };
        list.attach_listeners();
        list
    }

    fn attach_listeners(&self) {
        let viewport = self.shared.borrow().ctx.dom.viewport.clone();

        let scroll_shared = self.shared.clone();
        let scroll_closure = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            Self::on_scroll(&scroll_shared);
        });
        let _ = viewport.add_event_listener_with_callback("scroll", scroll_closure.as_ref().unchecked_ref());

        let wheel_enabled = self.shared.borrow().ctx.resolved_config.wheel_enabled;
        let wheel_closure = if wheel_enabled {
            let wheel_shared = self.shared.clone();
            let closure = Closure::<dyn FnMut(WheelEvent)>::new(move |event: WheelEvent| {
                Self::on_wheel(&wheel_shared, &event);
            });
            let _ = viewport.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            Some(closure)
        } else {
            None
        };

        let click_shared = self.shared.clone();
        let click_closure = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            Self::on_click(&click_shared, &event, EVT_ITEM_CLICK);
        });
        let _ = viewport.add_event_listener_with_callback("click", click_closure.as_ref().unchecked_ref());

        let dblclick_shared = self.shared.clone();
        let dblclick_closure = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            Self::on_click(&dblclick_shared, &event, EVT_ITEM_DBLCLICK);
        });
        let _ = viewport.add_event_listener_with_callback("dblclick", dblclick_closure.as_ref().unchecked_ref());

        let keydown_shared = self.shared.clone();
        let keydown_closure = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let inner = keydown_shared.borrow();
            if inner.destroyed {
                return;
            }
            for handler in &inner.ctx.handlers.keydown_handlers {
                handler(&event);
            }
        });
        let _ = viewport.add_event_listener_with_callback("keydown", keydown_closure.as_ref().unchecked_ref());

        let resize_shared = self.shared.clone();
        let resize_observer = ResizeObserver::new(move |_entries| {
            Self::on_resize(&resize_shared);
        });
        let observed_viewport = resize_observer.observe(viewport);

        let mut inner = self.shared.borrow_mut();
        inner.listeners.scroll = Some(scroll_closure);
        inner.listeners.wheel = wheel_closure;
        inner.listeners.click = Some(click_closure);
        inner.listeners.dblclick = Some(dblclick_closure);
        inner.listeners.keydown = Some(keydown_closure);
        inner.listeners.resize_observer = Some(resize_observer);
        inner.listeners.observed_viewport = Some(observed_viewport);
    }

    fn on_scroll(shared: &Rc<RefCell<Inner<T>>>) {
        let already_pending = {
            let mut inner = shared.borrow_mut();
            if inner.destroyed {
                return;
            }
            let was_pending = inner.raf_pending;
            inner.raf_pending = true;
            was_pending
        };
        if already_pending {
            return;
        }
        let raf_shared = shared.clone();
        schedule_animation_frame(move || {
            Self::render_frame(&raf_shared);
        });
    }

    fn on_wheel(shared: &Rc<RefCell<Inner<T>>>, event: &WheelEvent) {
        let mut inner = shared.borrow_mut();
        if inner.destroyed || !inner.ctx.state.is_compressed {
            return;
        }
        let time_ms = js_sys::Date::now();
        inner.ctx.scroll_controller.on_wheel_fine_motion(event.delta_y(), time_ms);
        event.prevent_default();
        drop(inner);
        Self::render_frame(shared);
    }

    fn on_click(shared: &Rc<RefCell<Inner<T>>>, event: &MouseEvent, emitter_event: &str) {
        let inner = shared.borrow();
        if inner.destroyed {
            return;
        }
        let Some(target) = event.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok()) else {
            return;
        };
        let Some(row) = target.closest("[data-index]").ok().flatten() else {
            return;
        };
        let Some(index) = row.get_attribute("data-index").and_then(|s| s.parse::<usize>().ok()) else {
            return;
        };
        let item = inner.ctx.data_manager.get_item(index);
        for handler in &inner.ctx.handlers.click_handlers {
            handler(index, item, event);
        }
        inner.ctx.emitter.emit(emitter_event, Rc::new(ItemClickEvent { index, event: event.clone() }));
    }

    fn on_resize(shared: &Rc<RefCell<Inner<T>>>) {
        let size = {
            let inner = shared.borrow();
            if inner.destroyed {
                return;
            }
            dom::client_size(&inner.ctx.dom.viewport, inner.ctx.state.orientation)
        };
        {
            let mut inner = shared.borrow_mut();
            inner.ctx.force_render();
        }
        Self::render_frame(shared);
        let inner = shared.borrow();
        if inner.destroyed {
            return;
        }
        let (width, height) = match inner.ctx.state.orientation {
            crate::viewport_state::Orientation::Vertical => (inner.ctx.dom.viewport.client_width() as f64, size),
            crate::viewport_state::Orientation::Horizontal => (size, inner.ctx.dom.viewport.client_height() as f64),
        };
        for handler in &inner.ctx.handlers.resize_handlers {
            handler(width, height);
        }
        inner.ctx.emitter.emit(EVT_RESIZE, Rc::new(ResizeEvent { width, height }));
    }

    /// Read the current native scroll position/container size and run one
    /// `render_if_needed` pass, emitting the events spec §5 orders within a
    /// frame: `scroll` → `range:change` → `velocity:change`.
    fn render_frame(shared: &Rc<RefCell<Inner<T>>>) {
        let mut inner = shared.borrow_mut();
        if inner.destroyed {
            return;
        }
        inner.raf_pending = false;

        let native_pos = inner.ctx.dom.viewport.scroll_top() as f64;
        let time_ms = js_sys::Date::now();
        let scroll_pos = inner.ctx.scroll_controller.on_native_scroll(native_pos, time_ms);
        let container_size = dom::client_size(&inner.ctx.dom.viewport, inner.ctx.state.orientation);

        let outcome: RenderOutcome = render_loop::render_if_needed(&mut inner.ctx, scroll_pos, container_size);

        inner.ctx.emitter.emit(EVT_SCROLL, Rc::new(ScrollEvent { scroll_position: scroll_pos }));
        if outcome.range_changed {
            let range = inner.ctx.state.render_range;
            inner.ctx.emitter.emit(EVT_RANGE_CHANGE, Rc::new(RangeChangeEvent { start: range.start, end: range.end }));
        }
        let velocity = inner.ctx.scroll_controller.velocity();
        let changed = inner.last_velocity.map(|v| v.velocity) != Some(velocity.velocity)
            || inner.last_velocity.map(|v| v.reliable) != Some(velocity.reliable);
        if changed {
            let payload = VelocityChangeEvent { velocity: velocity.velocity, reliable: velocity.reliable };
            inner.last_velocity = Some(payload);
            inner.ctx.emitter.emit(EVT_VELOCITY_CHANGE, Rc::new(payload));
        }

        Self::reschedule_idle_timeout(&mut inner);
    }

    fn reschedule_idle_timeout(inner: &mut Inner<T>) {
        let class_name = format!("{}--scrolling", inner.ctx.resolved_config.class_prefix);
        let _ = inner.ctx.dom.viewport.class_list().add_1(&class_name);
        // The timeout captures only the viewport element, not `shared`, so
        // it cannot observe a later `destroy()`; clearing the class on an
        // already-detached element is harmless.
        let viewport = inner.ctx.dom.viewport.clone();
        let timeout_ms = inner.ctx.resolved_config.idle_timeout_ms;
        inner.listeners.idle_timeout = Some(Timeout::new(timeout_ms, move || {
            let _ = viewport.class_list().remove_1(&class_name);
        }));
    }

    /// Run all registered destroy handlers in reverse registration order,
    /// detach every listener and observer, then remove the DOM scaffold
    /// from its container. A second call is a no-op (spec §4.9).
    pub fn destroy(&self) {
        let mut inner = self.shared.borrow_mut();
        if inner.destroyed {
            return;
        }
        inner.destroyed = true;

        let viewport = inner.ctx.dom.viewport.clone();
        if let Some(closure) = inner.listeners.scroll.take() {
            let _ = viewport.remove_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
        }
        if let Some(closure) = inner.listeners.wheel.take() {
            let _ = viewport.remove_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
        }
        if let Some(closure) = inner.listeners.click.take() {
            let _ = viewport.remove_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        }
        if let Some(closure) = inner.listeners.dblclick.take() {
            let _ = viewport.remove_event_listener_with_callback("dblclick", closure.as_ref().unchecked_ref());
        }
        if let Some(closure) = inner.listeners.keydown.take() {
            let _ = viewport.remove_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        }
        inner.listeners.observed_viewport = None;
        inner.listeners.resize_observer = None;
        inner.listeners.idle_timeout = None;

        let mut destroy_handlers = std::mem::take(&mut inner.ctx.handlers.destroy_handlers);
        for handler in destroy_handlers.iter_mut().rev() {
            handler(&mut inner.ctx);
        }

        inner.ctx.renderer.clear();
        inner.ctx.emitter.clear();
        dom::teardown_scaffold(&inner.ctx.dom);
    }

    /// Whether `destroy()` has already run.
    pub fn is_destroyed(&self) -> bool {
        self.shared.borrow().destroyed
    }

    /// Scroll so that `index` is aligned per `align`. With `smooth=false`
    /// the position is applied immediately and the returned promise
    /// resolves on the next microtask; with `smooth=true` the scroll
    /// animates over a fixed duration, aborting early if incoming user
    /// input exceeds the cancel-velocity threshold (spec §5 "Cancellation").
    pub fn scroll_to_index(&self, index: usize, align: Align, smooth: bool) -> js_sys::Promise {
        let shared = self.shared.clone();
        future_to_promise(async move {
            let target = {
                let inner = shared.borrow();
                if inner.destroyed {
                    return Err(StateError::AlreadyDestroyed.to_string().into());
                }
                let total = inner.ctx.data_manager.len();
                if total == 0 {
                    return Err(StateError::IndexOutOfRange { index, count: 0 }.to_string().into());
                }
                let container_size = dom::client_size(&inner.ctx.dom.viewport, inner.ctx.state.orientation);
                crate::range_math::scroll_to_index_position(
                    index,
                    align,
                    &inner.ctx.size_cache,
                    container_size,
                    inner.ctx.scroll_controller.get_scroll_top(),
                )
            };

            if !smooth {
                let mut inner = shared.borrow_mut();
                inner.ctx.scroll_controller.set_scroll_top(target);
                inner.ctx.force_render();
                drop(inner);
                Self::render_frame(&shared);
                return Ok(wasm_bindgen::JsValue::UNDEFINED);
            }

            const STEPS: u32 = 16;
            const STEP_MS: u32 = 16;
            let start = {
                let inner = shared.borrow();
                inner.ctx.scroll_controller.get_scroll_top()
            };
            for step in 1..=STEPS {
                {
                    let inner = shared.borrow();
                    if inner.destroyed {
                        return Ok(wasm_bindgen::JsValue::UNDEFINED);
                    }
                    if inner.ctx.scroll_controller.scroll_aborts(None) {
                        break;
                    }
                }
                let t = step as f64 / STEPS as f64;
                let eased = 1.0 - (1.0 - t) * (1.0 - t);
                let pos = start + (target - start) * eased;
                {
                    let mut inner = shared.borrow_mut();
                    inner.ctx.scroll_controller.set_scroll_top(pos);
                    inner.ctx.force_render();
                }
                Self::render_frame(&shared);
                TimeoutFuture::new(STEP_MS).await;
            }
            Ok(wasm_bindgen::JsValue::UNDEFINED)
        })
    }

    /// Replace the item set by reference (spec §4.7 `setItems`).
    pub fn set_items(&self, items: Vec<T>) {
        let mut inner = self.shared.borrow_mut();
        if inner.destroyed {
            return;
        }
        inner.ctx.data_manager.set_items(items);
        inner.ctx.renderer.clear();
        let total = inner.ctx.data_manager.len();
        inner.ctx.rebuild_size_cache(total);
    }

    /// Append items after the current end; tracked items keep their
    /// identity (spec §4.7 `appendItems`).
    pub fn append_items(&self, items: Vec<T>) {
        let mut inner = self.shared.borrow_mut();
        if inner.destroyed {
            return;
        }
        inner.ctx.data_manager.append_items(items);
        let total = inner.ctx.data_manager.len();
        inner.ctx.rebuild_size_cache(total);
    }

    /// Prepend items before the current start; every tracked index shifts
    /// (spec §4.7 `prependItems`).
    pub fn prepend_items(&self, items: Vec<T>) {
        let mut inner = self.shared.borrow_mut();
        if inner.destroyed {
            return;
        }
        inner.ctx.data_manager.prepend_items(items);
        let total = inner.ctx.data_manager.len();
        inner.ctx.renderer.clear();
        inner.ctx.rebuild_size_cache(total);
    }

    /// Patch the item at `index` in place via `patch` (spec §4.7
    /// `updateItem`).
    pub fn update_item(&self, index: usize, patch: impl FnOnce(&mut T)) {
        let mut inner = self.shared.borrow_mut();
        if inner.destroyed {
            return;
        }
        if index >= inner.ctx.data_manager.len() {
            log::warn!("update_item({index}) out of range");
            return;
        }
        // `DataManager::update_item` takes `Self: Sized`, so it cannot be
        // called through the trait object directly; downcast to the
        // concrete in-memory manager when present. An async-backed manager
        // owns its own mutation path via feature-contributed methods.
        if let Some(in_memory) = inner
            .ctx
            .data_manager
            .as_any_mut()
            .downcast_mut::<crate::data_manager::InMemoryDataManager<T>>()
        {
            in_memory.update_item(index, patch);
        }
        inner.ctx.force_render();
    }

    /// Remove the item at `index`, shifting subsequent indices down (spec
    /// §4.7 `removeItem`).
    pub fn remove_item(&self, index: usize) {
        let mut inner = self.shared.borrow_mut();
        if inner.destroyed {
            return;
        }
        inner.ctx.data_manager.remove_item(index);
        let total = inner.ctx.data_manager.len();
        inner.ctx.renderer.clear();
        inner.ctx.rebuild_size_cache(total);
    }

    /// Read the item at `index` via a callback, sidestepping the borrow
    /// lifetime a direct `&T` return would tie to an internal `RefCell`
    /// guard (see module docs).
    pub fn get_item<R>(&self, index: usize, f: impl FnOnce(Option<&T>) -> R) -> R {
        let inner = self.shared.borrow();
        f(inner.ctx.data_manager.get_item(index))
    }

    /// Read the full data manager via a callback (spec §6 `getItems`).
    pub fn get_items<R>(&self, f: impl FnOnce(&dyn DataManager<T>) -> R) -> R {
        let inner = self.shared.borrow();
        f(inner.ctx.data_manager.as_ref())
    }

    /// The current item count (spec §6 `getItemCount`).
    pub fn get_item_count(&self) -> usize {
        self.shared.borrow().ctx.data_manager.len()
    }

    /// Register `listener` for `event` (spec §6 `on`).
    pub fn on(&self, event: impl Into<String>, listener: crate::emitter::Listener) {
        self.shared.borrow_mut().ctx.emitter.on(event, listener);
    }

    /// Remove a previously registered listener (spec §6 `off`).
    pub fn off(&self, event: &str, listener: &crate::emitter::Listener) {
        self.shared.borrow_mut().ctx.emitter.off(event, listener);
    }

    /// Capture a restorable scroll (and selection, if present) descriptor
    /// (spec §6 `getScrollSnapshot`).
    pub fn get_scroll_snapshot(&self) -> ScrollSnapshot {
        let inner = self.shared.borrow();
        let scroll_pos = inner.ctx.scroll_controller.get_scroll_top();
        let index = inner.ctx.size_cache.index_at_offset(scroll_pos);
        let offset_in_item = scroll_pos - inner.ctx.size_cache.offset(index);
        let selected_ids = inner
            .ctx
            .get_method::<Rc<dyn Fn() -> HashSet<ItemId>>>(render_loop::METHOD_GET_SELECTED_IDS)
            .map(|f| f());
        ScrollSnapshot { index, offset_in_item, total: inner.ctx.data_manager.len(), selected_ids }
    }

    /// Restore a previously captured snapshot's scroll position (spec §8
    /// "Snapshot round-trip"). Selection restoration, if any, is the
    /// responsibility of the selection feature that produced the snapshot.
    pub fn restore_scroll_snapshot(&self, snapshot: &ScrollSnapshot) {
        let mut inner = self.shared.borrow_mut();
        if inner.destroyed {
            return;
        }
        let pos = inner.ctx.size_cache.offset(snapshot.index) + snapshot.offset_in_item;
        inner.ctx.scroll_controller.set_scroll_top(pos);
        inner.ctx.force_render();
        drop(inner);
        Self::render_frame(&self.shared);
    }

    /// Look up a feature-contributed method by name (spec §6:
    /// "Feature-contributed methods ... appear conditionally on the
    /// handle"). `F` must match the type the feature registered under
    /// `name` via [`BuilderContext::register_method`].
    pub fn get_method<F: Clone + 'static>(&self, name: &str) -> Option<F> {
        self.shared.borrow().ctx.get_method::<F>(name)
    }
}

/// Schedule `f` to run on the next animation frame, falling back to a
/// ~16ms timeout if `requestAnimationFrame` is unavailable (e.g. a
/// non-browser test harness).
fn schedule_animation_frame(f: impl FnOnce() + 'static) {
    let window = match web_sys::window() {
        Some(w) => w,
        None => {
            Timeout::new(16, f).forget();
            return;
        }
    };
    let cell: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let cell_for_closure = cell.clone();
    let closure = Closure::once(move || {
        cell_for_closure.borrow_mut().take();
        f();
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    *cell.borrow_mut() = Some(closure);
}

impl<T> std::fmt::Debug for VList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VList").field("destroyed", &self.shared.borrow().destroyed).finish_non_exhaustive()
    }
}
