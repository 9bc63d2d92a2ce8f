//! Wires the size cache, range math, data manager, and renderer together
//! into the single `render_if_needed` entry point (spec §4.5).

use std::collections::HashSet;
use std::rc::Rc;

use crate::context::BuilderContext;
use crate::data_manager::AsyncLoadEvent;
use crate::range_math;
use crate::renderer::{Placement, RenderStats};
use crate::tracked_item::ItemId;

/// Method name a selection feature registers: `() -> HashSet<ItemId>`.
pub const METHOD_GET_SELECTED_IDS: &str = "_getSelectedIds";
/// Method name a selection feature registers: `() -> Option<usize>`.
pub const METHOD_GET_FOCUSED_INDEX: &str = "_getFocusedIndex";

/// Emitted on the public handle's emitter when selection or focus changes
/// relative to the previous render (spec §6 events table `selection:change`).
#[derive(Debug, Clone)]
pub struct SelectionChangeEvent {
    /// Currently selected ids.
    pub selected: Rc<HashSet<ItemId>>,
    /// Currently focused index, if any.
    pub focused: Option<usize>,
}

/// Emitted when an async-backed data manager starts a page fetch (spec §6
/// events table `load:start`).
#[derive(Debug, Clone, Copy)]
pub struct LoadStartEvent {
    /// Inclusive start of the requested page.
    pub start: usize,
    /// Exclusive end of the requested page.
    pub end: usize,
}

/// Emitted when an async-backed data manager's page fetch resolves (spec §6
/// events table `load:end`).
#[derive(Debug, Clone, Copy)]
pub struct LoadEndEvent {
    /// Inclusive start of the loaded page.
    pub start: usize,
    /// Exclusive end of the loaded page.
    pub end: usize,
    /// Main-axis offset at which the loaded page begins.
    pub offset: f64,
}

/// Event name for [`SelectionChangeEvent`].
pub const EVT_SELECTION_CHANGE: &str = "selection:change";
/// Event name for [`LoadStartEvent`].
pub const EVT_LOAD_START: &str = "load:start";
/// Event name for [`LoadEndEvent`].
pub const EVT_LOAD_END: &str = "load:end";

fn empty_selection() -> Rc<HashSet<ItemId>> {
    thread_local! {
        static EMPTY: Rc<HashSet<ItemId>> = Rc::new(HashSet::new());
    }
    EMPTY.with(|e| e.clone())
}

/// Outcome of one `render_if_needed` call, used to decide which events to
/// emit.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOutcome {
    /// Whether a render actually ran (vs. the early-exit path).
    pub rendered: bool,
    /// Whether `visible_range`/`render_range` moved relative to the
    /// previous render.
    pub range_changed: bool,
    /// Diff/materialize/release counters from the renderer.
    pub stats: RenderStats,
}

/// The single entry point called from the scroll handler, the resize
/// observer callback, data mutations (via `force_render`), and
/// feature-initiated invalidations (spec §4.5).
///
/// `scroll_pos` and `container_size` are read by the caller from the
/// scroll controller / DOM immediately before calling this, matching step
/// 1 of the spec's sequence.
pub fn render_if_needed<T>(ctx: &mut BuilderContext<T>, scroll_pos: f64, container_size: f64) -> RenderOutcome {
    let mut scroll_pos = scroll_pos;
    if let Some(overridden) = ctx.external_scroll.take() {
        ctx.scroll_controller.set_scroll_top(overridden);
        scroll_pos = ctx.scroll_controller.get_scroll_top();
        ctx.pending_force.set(true);
    }

    let forced = ctx.force_render_flag || ctx.pending_force.get();
    let unchanged = scroll_pos == ctx.last_scroll_position && container_size == ctx.last_container_size;
    if unchanged && !forced {
        // The grace-period release loop still runs so stale items expire
        // even on stationary frames (spec §4.5).
        let stats = ctx.renderer.render(&[], ctx.frame_counter);
        return RenderOutcome { rendered: false, range_changed: false, stats };
    }

    ctx.force_render_flag = false;
    ctx.pending_force.set(false);
    ctx.last_scroll_position = scroll_pos;
    ctx.last_container_size = container_size;
    ctx.frame_counter += 1;

    let total = ctx.data_manager.len();
    ctx.size_cache.rebuild_if_stale(total);

    let previous_range = ctx.state.render_range;

    let visible = if let Some(range_fn) = &ctx.range_fn {
        range_fn(scroll_pos, container_size, &ctx.size_cache, total, ctx.resolved_config.overscan)
    } else {
        range_math::visible_range(scroll_pos, container_size, &ctx.size_cache, total)
    };
    let rendered_range = range_math::apply_overscan(visible, ctx.resolved_config.overscan, total);

    ctx.data_manager.ensure_loaded(rendered_range);
    for event in ctx.data_manager.drain_events() {
        match event {
            AsyncLoadEvent::Start { start, end } => {
                ctx.emitter.emit(EVT_LOAD_START, Rc::new(LoadStartEvent { start, end }));
            }
            AsyncLoadEvent::End { start, end } => {
                let offset = ctx.size_cache.offset(start);
                ctx.emitter.emit(EVT_LOAD_END, Rc::new(LoadEndEvent { start, end, offset }));
            }
        }
    }

    let previous_total_size = ctx.state.total_size;
    let previous_actual_size = ctx.state.actual_size;

    ctx.state.scroll_position = scroll_pos;
    ctx.state.container_size = container_size;
    ctx.state.total_size = ctx.scroll_controller.virtual_size();
    ctx.state.actual_size = ctx.size_cache.total_size();
    ctx.state.is_compressed = ctx.scroll_controller.is_compressed();
    ctx.state.compression_ratio = ctx.scroll_controller.compression_ratio();
    ctx.state.visible_range = visible;
    ctx.state.render_range = rendered_range;

    if ctx.state.total_size != previous_total_size {
        crate::dom::set_content_size(&ctx.dom.content, ctx.state.orientation, ctx.state.total_size);
    }
    if ctx.state.actual_size != previous_actual_size {
        for handler in &ctx.handlers.content_size_handlers {
            handler(ctx.state.actual_size);
        }
    }

    let selected = ctx
        .get_method::<Rc<dyn Fn() -> HashSet<ItemId>>>(METHOD_GET_SELECTED_IDS)
        .map(|f| Rc::new(f()))
        .unwrap_or_else(empty_selection);
    let focused = ctx
        .get_method::<Rc<dyn Fn() -> Option<usize>>>(METHOD_GET_FOCUSED_INDEX)
        .and_then(|f| f());

    if selected != ctx.last_selection.0 || focused != ctx.last_selection.1 {
        ctx.last_selection = (selected.clone(), focused);
        ctx.emitter.emit(
            EVT_SELECTION_CHANGE,
            Rc::new(SelectionChangeEvent { selected: selected.clone(), focused }),
        );
    }

    let placements: Vec<Placement<'_, T>> = (rendered_range.start..rendered_range.end)
        .map(|index| {
            let item = ctx.data_manager.get_item(index);
            let offset = raw_offset(&ctx.size_cache, ctx.resolved_config.reverse, index);
            let selected_flag = item
                .and_then(|item| ctx.renderer.id_of(item))
                .map(|id| selected.contains(&id))
                .unwrap_or(false);
            Placement {
                index,
                item,
                offset,
                selected: selected_flag,
                focused: focused == Some(index),
            }
        })
        .collect();

    let stats = ctx.renderer.render(&placements, ctx.frame_counter);

    for handler in &ctx.handlers.after_scroll {
        handler(&ctx.state);
    }

    RenderOutcome {
        rendered: true,
        range_changed: rendered_range != previous_range,
        stats,
    }
}

fn raw_offset(size_cache: &crate::size_cache::SizeCache, reverse: bool, index: usize) -> f64 {
    let offset = size_cache.offset(index);
    if reverse {
        size_cache.total_size() - offset - size_cache.size(index)
    } else {
        offset
    }
}
