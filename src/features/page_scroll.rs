//! Page-scroll feature: drives the core off the window's scroll position
//! instead of the viewport element's own `scrollTop`, for layouts where
//! the whole page scrolls rather than a fixed-height container (spec §4.6
//! "Feature replacement (e.g. page-scroll) substitutes window scroll as
//! the source").
//!
//! Rather than re-architect [`crate::scroll_controller::ScrollController`]
//! into a swappable trait object just for this one feature, this listens
//! to the window's `scroll` event and forwards the computed logical
//! position through [`crate::context::BuilderContext::external_scroll_trigger`]
//! — the core's own scroll controller stays the single source of scroll
//! truth the render loop reads from, just driven by an external signal.

use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlElement, Window};

use crate::context::BuilderContext;
use crate::feature::{priority, Feature};

/// Forwards window scroll into the core's scroll controller.
#[derive(Default)]
pub struct PageScrollFeature {
    window: Option<Window>,
    listener: Option<Closure<dyn FnMut(Event)>>,
}

impl std::fmt::Debug for PageScrollFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageScrollFeature").finish_non_exhaustive()
    }
}

impl<T: 'static> Feature<T> for PageScrollFeature {
    fn name(&self) -> &str {
        "page-scroll"
    }

    fn priority(&self) -> i32 {
        priority::SCALE
    }

    fn setup(&mut self, ctx: &mut BuilderContext<T>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        if let Some(html) = ctx.dom.viewport.dyn_ref::<HtmlElement>() {
            let _ = html.style().set_property("overflow", "visible");
        }

        let viewport = ctx.dom.viewport.clone();
        let external_scroll = ctx.external_scroll_trigger();
        let trigger = ctx.render_trigger();
        let closure = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            let rect = viewport.get_bounding_client_rect();
            let logical = (-rect.top()).max(0.0);
            external_scroll.set(Some(logical));
            trigger.set(true);
        });
        if window
            .add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())
            .is_ok()
        {
            self.window = Some(window);
            self.listener = Some(closure);
        }
    }

    fn destroy(&mut self, _ctx: &mut BuilderContext<T>) {
        if let (Some(window), Some(closure)) = (self.window.take(), self.listener.take()) {
            let _ = window.remove_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
        }
    }
}
