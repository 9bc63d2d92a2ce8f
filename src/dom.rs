//! DOM scaffold construction and the `ResizeObserver` wrapper.
//!
//! The wrapper is carried over from the teacher almost unchanged — a
//! small `wasm-bindgen` `extern` shim plus an RAII `ObservedElement` that
//! unobserves on drop — generalized to observe arbitrary elements instead
//! of one fixed per-item slot.

use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::config::Container;
use crate::error::ConfigError;
use crate::viewport_state::Orientation;

mod raw {
    use wasm_bindgen::{
        prelude::{wasm_bindgen, Closure},
        JsValue,
    };
    use web_sys::{DomRectReadOnly, Element};

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(extends = ::js_sys::Object)]
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub type ResizeObserver;
        #[wasm_bindgen(constructor)]
        pub fn new(callback: &ResizeCallback) -> ResizeObserver;
        #[wasm_bindgen(method, catch)]
        pub fn disconnect(this: &ResizeObserver) -> Result<(), JsValue>;
        #[wasm_bindgen(method, catch)]
        pub fn observe(this: &ResizeObserver, element: Element) -> Result<(), JsValue>;
        #[wasm_bindgen(method, catch)]
        pub fn unobserve(this: &ResizeObserver, element: Element) -> Result<(), JsValue>;

        #[wasm_bindgen(extends = ::js_sys::Object)]
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub type ResizeObserverEntry;
        #[wasm_bindgen(structural, method, getter)]
        pub fn target(this: &ResizeObserverEntry) -> Element;
        #[wasm_bindgen(structural, method, getter, js_name = contentRect)]
        pub fn content_rect(this: &ResizeObserverEntry) -> DomRectReadOnly;
    }
    pub type ResizeFn = dyn FnMut(Box<[ResizeObserverEntry]>, ResizeObserver);
    pub type ResizeCallback = Closure<ResizeFn>;
}

pub use raw::ResizeObserverEntry;

/// A live `ResizeObserver` bound to a callback that receives batches of
/// content-rect changes.
pub struct ResizeObserver {
    closure: Option<raw::ResizeCallback>,
    observer: raw::ResizeObserver,
}

impl std::fmt::Debug for ResizeObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeObserver").finish_non_exhaustive()
    }
}

/// RAII guard: unobserves its element when dropped.
pub struct ObservedElement {
    observer: Option<raw::ResizeObserver>,
    element: Element,
}

impl ResizeObserver {
    /// Construct an observer that invokes `callback` with each batch of
    /// resize entries.
    pub fn new<F>(mut callback: F) -> Self
    where
        F: 'static + FnMut(&[raw::ResizeObserverEntry]),
    {
        let closure = Closure::wrap(Box::new(
            move |entries: Box<[raw::ResizeObserverEntry]>, _this: raw::ResizeObserver| callback(&entries),
        ) as Box<raw::ResizeFn>);
        let observer = raw::ResizeObserver::new(&closure);
        Self { closure: Some(closure), observer }
    }

    /// Start observing `element`, returning a guard that unobserves on
    /// drop.
    pub fn observe(&self, element: Element) -> ObservedElement {
        self.observer.observe(element.clone()).expect("ResizeObserver.observe failed");
        ObservedElement { observer: Some(self.observer.clone()), element }
    }
}

impl ObservedElement {
    /// The element this guard is observing.
    pub fn element(&self) -> &Element {
        &self.element
    }
}

impl Drop for ResizeObserver {
    fn drop(&mut self) {
        if self.closure.take().is_some() {
            let _ = self.observer.disconnect();
        }
    }
}

impl Drop for ObservedElement {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.take() {
            let _ = observer.unobserve(self.element.clone());
        }
    }
}

/// The three nested elements described in spec §6's "DOM structure".
pub struct DomScaffold {
    /// The caller-supplied mount point.
    pub container: Element,
    /// The scrollable element (`{prefix}-viewport`).
    pub viewport: Element,
    /// The spacer that gives the viewport its scroll track
    /// (`{prefix}-content`).
    pub content: Element,
    /// The positioned items container (`{prefix}-items`).
    pub items: Element,
}

/// Resolve `container` against `document` and build the viewport/content/
/// items scaffold, per spec §6.
pub fn build_scaffold(
    document: &Document,
    container: Container,
    class_prefix: &str,
    aria_label: Option<&str>,
    orientation: Orientation,
) -> Result<DomScaffold, ConfigError> {
    let container = match container {
        Container::Selector(selector) => document
            .query_selector(&selector)
            .ok()
            .flatten()
            .ok_or_else(|| ConfigError::NoContainer(selector))?,
        Container::Element(el) => {
            if el.is_connected() {
                el
            } else {
                return Err(ConfigError::NoContainer("element is detached from the document".into()));
            }
        }
    };

    let viewport = document
        .create_element("div")
        .map_err(|_| ConfigError::NoContainer("failed to create viewport element".into()))?;
    let _ = viewport.set_attribute("class", &format!("{class_prefix}-viewport"));
    let _ = viewport.set_attribute("role", "listbox");
    if let Some(label) = aria_label {
        let _ = viewport.set_attribute("aria-label", label);
    }

    let content = document.create_element("div").expect("create_element(div)");
    let _ = content.set_attribute("class", &format!("{class_prefix}-content"));

    let items = document.create_element("div").expect("create_element(div)");
    let _ = items.set_attribute("class", &format!("{class_prefix}-items"));
    let position_style = match orientation {
        Orientation::Vertical => "position: relative;",
        Orientation::Horizontal => "position: relative;",
    };
    let _ = items.set_attribute("style", position_style);

    let _ = content.append_child(&items);
    let _ = viewport.append_child(&content);
    let _ = container.append_child(&viewport);

    Ok(DomScaffold { container, viewport, content, items })
}

/// Detach the viewport (and everything inside it) from `container`, the
/// final step of `destroy`.
pub fn teardown_scaffold(scaffold: &DomScaffold) {
    let _ = scaffold.container.remove_child(&scaffold.viewport);
}

/// Read `element`'s main-axis client size (`clientHeight`/`clientWidth`),
/// the container size fed into `render_if_needed` on every scroll/resize
/// (spec §4.5 step 1). `clientHeight`/`clientWidth` are part of the DOM
/// `Element` interface, so no `HtmlElement` cast is needed here.
pub fn client_size(element: &Element, orientation: Orientation) -> f64 {
    match orientation {
        Orientation::Vertical => element.client_height() as f64,
        Orientation::Horizontal => element.client_width() as f64,
    }
}

/// Set the content spacer's main-axis size to `size`, producing the
/// viewport's native scroll track (spec §6: "content-size spacer ...
/// sets `height`/`width` to produce the scroll track"). `size` is the
/// scroll controller's `virtual_size()` — the possibly-capped track
/// length, not the true (possibly much larger) content extent.
pub fn set_content_size(content: &Element, orientation: Orientation, size: f64) {
    let Some(html_el) = content.dyn_ref::<HtmlElement>() else {
        return;
    };
    let style = html_el.style();
    match orientation {
        Orientation::Vertical => {
            let _ = style.set_property("height", &format!("{size}px"));
            let _ = style.set_property("width", "100%");
        }
        Orientation::Horizontal => {
            let _ = style.set_property("width", &format!("{size}px"));
            let _ = style.set_property("height", "100%");
        }
    }
}
