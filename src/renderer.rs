//! Diffs a target range against the tracked-item map: applies templates
//! only on change, positions items, and releases stale elements after a
//! grace period (spec §4.3).

use std::collections::{HashMap, HashSet};

use wasm_bindgen::JsCast;
use web_sys::{DocumentFragment, Element, HtmlElement};

use crate::element_pool::ElementPool;
use crate::range_math::Range;
use crate::tracked_item::{ItemId, TrackedItem};
use crate::viewport_state::Orientation;

/// Default number of frames a tracked element survives after its index
/// leaves the render range (spec `RELEASE_GRACE`).
pub const RELEASE_GRACE: u64 = 2;

/// What a template function produced for one item.
pub enum TemplateOutput {
    /// HTML to assign via a single `set_inner_html` call (spec §9: "a
    /// single `innerHTML` assignment per template application").
    Html(String),
    /// A DOM node to attach via `replace_children`.
    Node(web_sys::Node),
}

/// A diff-ready description of one rendered index, computed by the core
/// render loop from the size cache and handed to [`Renderer::render`].
pub struct Placement<'a, T> {
    /// The item's index.
    pub index: usize,
    /// The item data, or `None` to render a placeholder (spec §4.9: the
    /// data manager returned `undefined` for an in-range index).
    pub item: Option<&'a T>,
    /// Main-axis offset, from the size cache.
    pub offset: f64,
    /// Whether `index` is in the selected-id set.
    pub selected: bool,
    /// Whether `index` is the focused index.
    pub focused: bool,
}

/// Per-render outcome, useful for tests and for emitting `range:change`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Items newly materialized this call.
    pub materialized: usize,
    /// Items whose template was re-applied because `id` changed.
    pub template_reapplied: usize,
    /// Items released back to the pool this call.
    pub released: usize,
}

/// Owns the tracked-item map and drives the diff/materialize/release
/// algorithm against one items-container element.
pub struct Renderer<T> {
    items_container: Element,
    document: web_sys::Document,
    pool: ElementPool,
    tracked: HashMap<usize, TrackedItem>,
    visible_set: HashSet<usize>,
    class_prefix: String,
    orientation: Orientation,
    release_grace: u64,
    get_id: Box<dyn Fn(&T) -> Option<ItemId>>,
    template: Box<dyn Fn(&T, usize) -> TemplateOutput>,
}

impl<T> std::fmt::Debug for Renderer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("tracked", &self.tracked.len())
            .field("class_prefix", &self.class_prefix)
            .field("release_grace", &self.release_grace)
            .finish()
    }
}

impl<T> Renderer<T> {
    /// Construct a renderer over `items_container`, backed by `pool`.
    pub fn new(
        document: web_sys::Document,
        items_container: Element,
        pool: ElementPool,
        class_prefix: impl Into<String>,
        orientation: Orientation,
        get_id: Box<dyn Fn(&T) -> Option<ItemId>>,
        template: Box<dyn Fn(&T, usize) -> TemplateOutput>,
    ) -> Self {
        Self {
            items_container,
            document,
            pool,
            tracked: HashMap::new(),
            visible_set: HashSet::new(),
            class_prefix: class_prefix.into(),
            orientation,
            release_grace: RELEASE_GRACE,
            get_id,
            template,
        }
    }

    /// Number of currently-tracked (materialized or grace-held) indices.
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Whether `index` currently has a tracked DOM element.
    pub fn is_tracked(&self, index: usize) -> bool {
        self.tracked.contains_key(&index)
    }

    /// The element currently backing `index`, if tracked. Exposed for
    /// `item:click`/`item:dblclick` delegation and tests asserting pointer
    /// equality across the grace window.
    pub fn element_for(&self, index: usize) -> Option<&Element> {
        self.tracked.get(&index).map(|t| &t.element)
    }

    /// Expose the configured `get_id` extractor so callers building
    /// [`Placement`]s (the render loop, checking selection membership) can
    /// derive an item's id without duplicating that mapping.
    pub fn id_of(&self, item: &T) -> Option<ItemId> {
        (self.get_id)(item)
    }

    /// Run one diff/materialize/release pass for `placements` (step 1-5 of
    /// spec §4.3), then release anything outside grace (step 6).
    pub fn render(&mut self, placements: &[Placement<'_, T>], frame: u64) -> RenderStats {
        let mut stats = RenderStats::default();
        self.visible_set.clear();
        self.visible_set.extend(placements.iter().map(|p| p.index));

        let mut fragment: Option<DocumentFragment> = None;

        for placement in placements {
            if self.tracked.contains_key(&placement.index) {
                self.diff_existing(placement, frame, &mut stats);
            } else {
                self.materialize(placement, frame, &mut fragment, &mut stats);
            }
        }

        if let Some(fragment) = fragment {
            let _ = self.items_container.append_child(&fragment);
        }

        self.release_stale(frame, &mut stats);
        stats
    }

    fn diff_existing(&mut self, placement: &Placement<'_, T>, frame: u64, stats: &mut RenderStats) {
        let tracked = self.tracked.get_mut(&placement.index).unwrap();
        let new_id = placement.item.and_then(|item| (self.get_id)(item));
        if new_id != tracked.last_item_id {
            if let Some(item) = placement.item {
                apply_template(&tracked.element, (self.template)(item, placement.index));
            } else {
                apply_placeholder(&tracked.element, &self.class_prefix);
            }
            tracked.last_item_id = new_id;
            stats.template_reapplied += 1;
        }
        if tracked.last_selected != placement.selected {
            toggle_class(&tracked.element, &format!("{}-item--selected", self.class_prefix), placement.selected);
            tracked.last_selected = placement.selected;
        }
        if tracked.last_focused != placement.focused {
            toggle_class(&tracked.element, &format!("{}-item--focused", self.class_prefix), placement.focused);
            tracked.last_focused = placement.focused;
        }
        if tracked.last_offset != placement.offset {
            set_transform(&tracked.element, self.orientation, placement.offset);
            tracked.last_offset = placement.offset;
        }
        tracked.last_seen_frame = frame;
    }

    fn materialize(
        &mut self,
        placement: &Placement<'_, T>,
        frame: u64,
        fragment: &mut Option<DocumentFragment>,
        stats: &mut RenderStats,
    ) {
        let el = self.pool.acquire();
        let _ = el.set_attribute("data-index", &placement.index.to_string());
        let _ = el.set_attribute("role", "option");
        let _ = el.set_attribute("aria-posinset", &(placement.index + 1).to_string());

        let id = placement.item.and_then(|item| (self.get_id)(item));
        if let Some(id) = &id {
            let _ = el.set_attribute("data-id", &id.to_string());
        }
        if let Some(item) = placement.item {
            apply_template(&el, (self.template)(item, placement.index));
        } else {
            apply_placeholder(&el, &self.class_prefix);
        }
        toggle_class(&el, &format!("{}-item--selected", self.class_prefix), placement.selected);
        toggle_class(&el, &format!("{}-item--focused", self.class_prefix), placement.focused);
        set_transform(&el, self.orientation, placement.offset);

        let frag = fragment.get_or_insert_with(|| self.document.create_document_fragment());
        let _ = frag.append_child(&el);

        let mut tracked = TrackedItem::new(el, frame);
        tracked.last_item_id = id;
        tracked.last_selected = placement.selected;
        tracked.last_focused = placement.focused;
        tracked.last_offset = placement.offset;
        self.tracked.insert(placement.index, tracked);
        stats.materialized += 1;
    }

    fn release_stale(&mut self, frame: u64, stats: &mut RenderStats) {
        let stale: Vec<usize> = self
            .tracked
            .iter()
            .filter(|(index, tracked)| {
                !self.visible_set.contains(index) && frame.saturating_sub(tracked.last_seen_frame) > self.release_grace
            })
            .map(|(index, _)| *index)
            .collect();
        for index in stale {
            if let Some(tracked) = self.tracked.remove(&index) {
                self.pool.release(tracked.element);
                stats.released += 1;
            }
        }
    }

    /// Release every tracked element unconditionally, e.g. on `destroy` or
    /// a full data reset.
    pub fn clear(&mut self) {
        for (_, tracked) in self.tracked.drain() {
            self.pool.release(tracked.element);
        }
        self.visible_set.clear();
    }
}

fn apply_template(el: &Element, output: TemplateOutput) {
    match output {
        TemplateOutput::Html(html) => el.set_inner_html(&html),
        TemplateOutput::Node(node) => {
            let _ = el.replace_children_with_node_1(&node);
        }
    }
}

fn apply_placeholder(el: &Element, class_prefix: &str) {
    el.set_inner_html(crate::DEFAULT_MASK_CHARACTER);
    let _ = el.class_list().add_1(&format!("{class_prefix}-item--placeholder"));
}

fn toggle_class(el: &Element, class: &str, on: bool) {
    let _ = el.class_list().toggle_with_force(class, on);
}

fn set_transform(el: &Element, orientation: Orientation, offset: f64) {
    if let Some(html_el) = el.dyn_ref::<HtmlElement>() {
        let style = html_el.style();
        // `position: absolute` makes the transform the row's sole
        // positioning mechanism; left in flow, the row's flow position
        // would stack with the transform offset (spec §4.3/§9: "Template
        // dispatch"/"Axis-neutral types" assume transform-only
        // positioning).
        let _ = style.set_property("position", "absolute");
        let _ = style.set_property("top", "0");
        let _ = style.set_property("left", "0");
        let transform = format!("{}({}px)", orientation.transform_fn(), offset);
        let _ = style.set_property("transform", &transform);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod dom_tests {
    use super::*;
    use crate::element_pool::default_row_reset;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn new_renderer() -> Renderer<String> {
        let document = web_sys::window().unwrap().document().unwrap();
        let container = document.create_element("div").unwrap();
        let pool = ElementPool::new(document.clone(), "div", 100, default_row_reset("vlist"));
        Renderer::new(
            document,
            container,
            pool,
            "vlist",
            Orientation::Vertical,
            Box::new(|_s: &String| None),
            Box::new(|s: &String, _i: usize| TemplateOutput::Html(s.clone())),
        )
    }

    #[wasm_bindgen_test]
    fn idempotent_render_causes_no_second_materialize() {
        let mut renderer = new_renderer();
        let items = vec!["a".to_string(), "b".to_string()];
        let placements = |items: &[String]| -> Vec<Placement<'_, String>> {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| Placement { index: i, item: Some(item), offset: i as f64 * 10.0, selected: false, focused: false })
                .collect()
        };
        let stats1 = renderer.render(&placements(&items), 0);
        assert_eq!(stats1.materialized, 2);
        let stats2 = renderer.render(&placements(&items), 0);
        assert_eq!(stats2.materialized, 0);
        assert_eq!(stats2.template_reapplied, 0);
    }

    #[wasm_bindgen_test]
    fn grace_window_preserves_element_identity() {
        let mut renderer = new_renderer();
        let items = vec!["a".to_string()];
        let p0 = vec![Placement { index: 0, item: Some(&items[0]), offset: 0.0, selected: false, focused: false }];
        renderer.render(&p0, 0);
        let el_before = renderer.element_for(0).cloned();

        renderer.render(&[], 1);
        assert!(renderer.is_tracked(0), "still within grace at frame 1");
        renderer.render(&p0, 2);
        let el_after = renderer.element_for(0).cloned();
        assert_eq!(el_before, el_after, "same element reused inside grace window");
    }

    #[wasm_bindgen_test]
    fn release_after_grace_expires() {
        let mut renderer = new_renderer();
        let items = vec!["a".to_string()];
        let p0 = vec![Placement { index: 0, item: Some(&items[0]), offset: 0.0, selected: false, focused: false }];
        renderer.render(&p0, 0);
        renderer.render(&[], 10);
        assert!(!renderer.is_tracked(0));
    }
}
