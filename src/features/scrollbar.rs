//! Scrollbar overlay feature: draws a custom thumb reflecting scroll
//! progress over the viewport's native track (spec §4.8 "scrollbar"
//! priority band).
//!
//! The thumb only reads [`crate::viewport_state::ViewportState`] each
//! frame via an `after_scroll` handler — it never needs to mutate the
//! builder context, so it avoids the render-trigger plumbing other
//! features need.

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

use crate::context::BuilderContext;
use crate::feature::{priority, Feature};
use crate::viewport_state::{Orientation, ViewportState};

/// Appends a `<div class="{prefix}-scrollbar-track">` containing a
/// `<div class="{prefix}-scrollbar-thumb">` to the viewport, and keeps the
/// thumb's size/position in sync with scroll progress.
#[derive(Default)]
pub struct ScrollbarFeature {
    track: Option<Element>,
}

impl std::fmt::Debug for ScrollbarFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollbarFeature").finish_non_exhaustive()
    }
}

fn set_thumb_style(thumb: &Element, orientation: Orientation, size_pct: f64, offset_pct: f64) {
    let Some(html) = thumb.dyn_ref::<HtmlElement>() else {
        return;
    };
    let style = html.style();
    match orientation {
        Orientation::Vertical => {
            let _ = style.set_property("height", &format!("{size_pct}%"));
            let _ = style.set_property("top", &format!("{offset_pct}%"));
        }
        Orientation::Horizontal => {
            let _ = style.set_property("width", &format!("{size_pct}%"));
            let _ = style.set_property("left", &format!("{offset_pct}%"));
        }
    }
}

impl<T: 'static> Feature<T> for ScrollbarFeature {
    fn name(&self) -> &str {
        "scrollbar"
    }

    fn priority(&self) -> i32 {
        priority::SCROLLBAR
    }

    fn setup(&mut self, ctx: &mut BuilderContext<T>) {
        let Some(document) = ctx.dom.viewport.owner_document() else {
            return;
        };
        let prefix = &ctx.resolved_config.class_prefix;
        let width_px = ctx.resolved_config.scrollbar.width_px;
        let Ok(track) = document.create_element("div") else {
            return;
        };
        let _ = track.set_attribute("class", &format!("{prefix}-scrollbar-track"));
        let _ = track.set_attribute(
            "style",
            &format!("position:absolute; top:0; right:0; bottom:0; width:{width_px}px; pointer-events:none;"),
        );
        let Ok(thumb) = document.create_element("div") else {
            return;
        };
        let _ = thumb.set_attribute("class", &format!("{prefix}-scrollbar-thumb"));
        let _ = thumb.set_attribute(
            "style",
            "position:absolute; left:0; right:0; border-radius:3px; background:currentColor; opacity:0.4;",
        );
        let _ = track.append_child(&thumb);
        let _ = ctx.dom.viewport.append_child(&track);
        self.track = Some(track);

        ctx.handlers.after_scroll.push(std::rc::Rc::new(move |state: &ViewportState| {
            let total = state.actual_size.max(1.0);
            let ratio = (state.container_size / total).clamp(0.02, 1.0);
            let size_pct = ratio * 100.0;
            let max_scroll = (total - state.container_size).max(1.0);
            let progress = (state.scroll_position / max_scroll).clamp(0.0, 1.0);
            let offset_pct = progress * (100.0 - size_pct);
            set_thumb_style(&thumb, state.orientation, size_pct, offset_pct);
        }));
    }

    fn destroy(&mut self, ctx: &mut BuilderContext<T>) {
        if let Some(track) = self.track.take() {
            let _ = ctx.dom.viewport.remove_child(&track);
        }
    }
}
