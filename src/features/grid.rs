//! Grid layout feature: arranges rendered rows into `N` CSS columns
//! instead of one item per row (spec §4.8 "layout" priority band).
//!
//! The core's size cache and range math are indexed by logical item, one
//! slot per rendered element — there's no "row of N items" unit to hand
//! them without deeper surgery on `size_cache`/`range_math`. Rather than
//! reinterpret those, this feature treats each rendered DOM element as one
//! grid *row* and lets CSS flow items within it: it sets `display: grid;
//! grid-template-columns` on the items container so a template producing
//! `N` children per rendered element lays out as a grid row.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::context::BuilderContext;
use crate::feature::{priority, Feature};

/// Lays the items container out as a CSS grid with a configurable column
/// count, exposing `setColumns`/`getColumns` for callers to change it at
/// runtime.
#[derive(Debug)]
pub struct GridFeature {
    initial_columns: usize,
}

impl GridFeature {
    /// Start with `columns` columns (at least 1).
    pub fn new(columns: usize) -> Self {
        Self { initial_columns: columns.max(1) }
    }
}

fn apply_columns(items: &web_sys::Element, columns: usize) {
    if let Some(html) = items.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property("display", "grid");
        let _ = html
            .style()
            .set_property("grid-template-columns", &format!("repeat({columns}, 1fr)"));
    }
}

impl<T: 'static> Feature<T> for GridFeature {
    fn name(&self) -> &str {
        "grid"
    }

    fn priority(&self) -> i32 {
        priority::LAYOUT
    }

    fn conflicts(&self) -> &[&str] {
        &["masonry"]
    }

    fn setup(&mut self, ctx: &mut BuilderContext<T>) {
        let columns = Rc::new(Cell::new(self.initial_columns));
        apply_columns(&ctx.dom.items, columns.get());

        let items = ctx.dom.items.clone();
        let set_columns_state = columns.clone();
        let trigger = ctx.render_trigger();
        ctx.register_method::<Rc<dyn Fn(usize)>>(
            "setColumns",
            Rc::new(move |n: usize| {
                let n = n.max(1);
                set_columns_state.set(n);
                apply_columns(&items, n);
                trigger.set(true);
            }),
        );

        let get_columns_state = columns;
        ctx.register_method::<Rc<dyn Fn() -> usize>>("getColumns", Rc::new(move || get_columns_state.get()));
    }

    fn destroy(&mut self, ctx: &mut BuilderContext<T>) {
        if let Some(html) = ctx.dom.items.dyn_ref::<HtmlElement>() {
            let _ = html.style().remove_property("display");
            let _ = html.style().remove_property("grid-template-columns");
        }
    }
}
