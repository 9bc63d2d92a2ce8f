//! A stack of reusable DOM nodes of a single tag (spec §3, §4.4).
//!
//! `acquire` pops a previously released element or creates a fresh one;
//! `release` detaches an element, clears its identity attributes via a
//! per-consumer reset callback, and pushes it back onto the stack if the
//! pool is under `max_size`.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

/// A reset hook run on an element before it re-enters the pool. Different
/// consumers (list rows, grid cells, table cells) clear different sets of
/// attributes, so this is supplied per [`ElementPool`] rather than
/// hard-coded.
pub type ResetFn = Box<dyn Fn(&Element)>;

/// Stack of up to `max_size` reusable elements of one tag (spec:
/// `DEFAULT_POOL_MAX` = 100).
pub struct ElementPool {
    document: Document,
    tag: String,
    max_size: usize,
    free: Vec<Element>,
    reset: ResetFn,
}

impl std::fmt::Debug for ElementPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementPool")
            .field("tag", &self.tag)
            .field("max_size", &self.max_size)
            .field("free", &self.free.len())
            .finish()
    }
}

impl ElementPool {
    /// Construct an empty pool for elements of `tag`, using `document` to
    /// create new ones when the stack is empty.
    pub fn new(document: Document, tag: impl Into<String>, max_size: usize, reset: ResetFn) -> Self {
        Self {
            document,
            tag: tag.into(),
            max_size,
            free: Vec::new(),
            reset,
        }
    }

    /// Pop a free element, or create one via `document.createElement(tag)`.
    pub fn acquire(&mut self) -> Element {
        match self.free.pop() {
            Some(el) => el,
            None => self
                .document
                .create_element(&self.tag)
                .expect("create_element should not fail for a plain tag name"),
        }
    }

    /// Detach `el` from its parent, clear known identity attributes/style
    /// via the consumer-supplied reset hook, and push it back if under
    /// `max_size`. Elements beyond the cap are simply dropped (and thus
    /// garbage collected by the DOM once unreferenced).
    pub fn release(&mut self, el: Element) {
        if let Some(parent) = el.parent_node() {
            let _ = parent.remove_child(&el);
        }
        (self.reset)(&el);
        if self.free.len() < self.max_size {
            self.free.push(el);
        }
    }

    /// Number of elements currently idle in the pool.
    pub fn size(&self) -> usize {
        self.free.len()
    }

    /// Drop every pooled element.
    pub fn clear(&mut self) {
        self.free.clear();
    }
}

/// The default reset hook for list-row elements: clears the identity
/// attributes the renderer sets (`data-index`, `data-id`), selection and
/// focus classes, and the positioning transform, matching what
/// [`crate::renderer::Renderer`] writes on materialize.
pub fn default_row_reset(class_prefix: &str) -> ResetFn {
    let selected = format!("{class_prefix}-item--selected");
    let focused = format!("{class_prefix}-item--focused");
    let placeholder = format!("{class_prefix}-item--placeholder");
    Box::new(move |el: &Element| {
        let _ = el.remove_attribute("data-index");
        let _ = el.remove_attribute("data-id");
        let _ = el.class_list().remove_3(&selected, &focused, &placeholder);
        if let Some(html_el) = el.dyn_ref::<HtmlElement>() {
            let _ = html_el.style().remove_property("transform");
        }
    })
}

#[cfg(all(test, target_arch = "wasm32"))]
mod dom_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn acquire_creates_then_reuses() {
        let document = web_sys::window().unwrap().document().unwrap();
        let mut pool = ElementPool::new(document, "div", 100, default_row_reset("vlist"));
        let el = pool.acquire();
        el.set_attribute("data-index", "3").unwrap();
        pool.release(el);
        assert_eq!(pool.size(), 1);
        let el2 = pool.acquire();
        assert!(el2.get_attribute("data-index").is_none());
        assert_eq!(pool.size(), 0);
    }

    #[wasm_bindgen_test]
    fn release_beyond_cap_drops_element() {
        let document = web_sys::window().unwrap().document().unwrap();
        let mut pool = ElementPool::new(document, "div", 1, default_row_reset("vlist"));
        pool.release(pool_new_div(&pool));
        pool.release(pool_new_div(&pool));
        assert_eq!(pool.size(), 1);
    }

    fn pool_new_div(pool: &ElementPool) -> Element {
        pool.document.create_element("div").unwrap()
    }
}
