//! Selection feature: tracks a multi-select id set and a single focused
//! index, feeding `_getSelectedIds`/`_getFocusedIndex` to the render loop
//! (spec §4.8 "Cooperation pattern"; §6 `select`/`toggleSelect`/
//! `getSelected`/`selection:change`).
//!
//! Selection survives an item scrolling out of the render range and back,
//! since it's keyed by [`ItemId`] rather than by rendered DOM element.
//! `select`/`toggleSelect`/`setFocused` are registered methods that run
//! after `build()` returns, outside any `&mut BuilderContext` borrow, so
//! they request a render through [`BuilderContext::render_trigger`]
//! instead of calling `force_render` directly; emitting `selection:change`
//! itself is handled generically by the render loop, which already reads
//! selection state every frame.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::context::BuilderContext;
use crate::feature::{priority, Feature};
use crate::render_loop::{METHOD_GET_FOCUSED_INDEX, METHOD_GET_SELECTED_IDS};
use crate::tracked_item::ItemId;

#[derive(Debug, Default)]
struct SelectionState {
    selected: HashSet<ItemId>,
    focused: Option<usize>,
}

/// Tracks selection and focus independent of the currently rendered range.
#[derive(Debug, Default)]
pub struct SelectionFeature {
    state: Rc<RefCell<SelectionState>>,
}

impl<T: 'static> Feature<T> for SelectionFeature {
    fn name(&self) -> &str {
        "selection"
    }

    fn priority(&self) -> i32 {
        priority::SELECTION
    }

    fn setup(&mut self, ctx: &mut BuilderContext<T>) {
        let trigger = ctx.render_trigger();

        let get_selected_ids_state = self.state.clone();
        let get_selected_ids: Rc<dyn Fn() -> HashSet<ItemId>> =
            Rc::new(move || get_selected_ids_state.borrow().selected.clone());
        ctx.register_method(METHOD_GET_SELECTED_IDS, get_selected_ids.clone());
        ctx.register_method("getSelected", get_selected_ids);

        let get_focused_state = self.state.clone();
        let get_focused_index: Rc<dyn Fn() -> Option<usize>> = Rc::new(move || get_focused_state.borrow().focused);
        ctx.register_method(METHOD_GET_FOCUSED_INDEX, get_focused_index);

        let select_state = self.state.clone();
        let select_trigger = trigger.clone();
        let select: Rc<dyn Fn(Vec<ItemId>)> = Rc::new(move |ids: Vec<ItemId>| {
            select_state.borrow_mut().selected = ids.into_iter().collect();
            select_trigger.set(true);
        });
        ctx.register_method("select", select);

        let toggle_state = self.state.clone();
        let toggle_trigger = trigger.clone();
        let toggle_select: Rc<dyn Fn(ItemId)> = Rc::new(move |id: ItemId| {
            let mut state = toggle_state.borrow_mut();
            if !state.selected.remove(&id) {
                state.selected.insert(id);
            }
            toggle_trigger.set(true);
        });
        ctx.register_method("toggleSelect", toggle_select);

        let clear_state = self.state.clone();
        let clear_trigger = trigger.clone();
        let clear_selection: Rc<dyn Fn()> = Rc::new(move || {
            clear_state.borrow_mut().selected.clear();
            clear_trigger.set(true);
        });
        ctx.register_method("clearSelection", clear_selection);

        let focus_state = self.state.clone();
        let set_focused: Rc<dyn Fn(Option<usize>)> = Rc::new(move |index: Option<usize>| {
            focus_state.borrow_mut().focused = index;
            trigger.set(true);
        });
        ctx.register_method("setFocused", set_focused);
    }
}
