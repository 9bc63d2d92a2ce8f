//! Masonry layout feature: assigns each rendered item to one of `N` lanes
//! (spec §4.8 "layout" priority band).
//!
//! True shortest-lane masonry needs every item's real size known up front
//! to pick the lane with the least accumulated height — exactly what
//! virtualization withholds, since only rendered items are ever measured.
//! This feature uses round-robin lane assignment instead (`index % lanes`),
//! an explicit simplification consistent with the spec's "concrete
//! algorithms ... summarized, not fully specified" scope note. It exposes
//! `laneOffsetPercent(index)` and `getLanes()` so a template can position
//! its own markup cross-axis; [`crate::renderer::Placement`] has no
//! cross-axis offset field of its own to drive this from the core side.

use std::cell::Cell;
use std::rc::Rc;

use crate::context::BuilderContext;
use crate::feature::{priority, Feature};

/// Round-robin lane assignment for a masonry-style cross-axis layout.
#[derive(Debug)]
pub struct MasonryFeature {
    initial_lanes: usize,
}

impl MasonryFeature {
    /// Start with `lanes` lanes (at least 1).
    pub fn new(lanes: usize) -> Self {
        Self { initial_lanes: lanes.max(1) }
    }
}

impl<T: 'static> Feature<T> for MasonryFeature {
    fn name(&self) -> &str {
        "masonry"
    }

    fn priority(&self) -> i32 {
        priority::LAYOUT
    }

    fn conflicts(&self) -> &[&str] {
        &["grid"]
    }

    fn setup(&mut self, ctx: &mut BuilderContext<T>) {
        let lanes = Rc::new(Cell::new(self.initial_lanes));

        let offset_lanes = lanes.clone();
        ctx.register_method::<Rc<dyn Fn(usize) -> f64>>(
            "laneOffsetPercent",
            Rc::new(move |index: usize| {
                let n = offset_lanes.get().max(1);
                (index % n) as f64 * (100.0 / n as f64)
            }),
        );

        let lane_of_lanes = lanes.clone();
        ctx.register_method::<Rc<dyn Fn(usize) -> usize>>(
            "laneOf",
            Rc::new(move |index: usize| index % lane_of_lanes.get().max(1)),
        );

        let set_lanes_state = lanes.clone();
        let trigger = ctx.render_trigger();
        ctx.register_method::<Rc<dyn Fn(usize)>>(
            "setLanes",
            Rc::new(move |n: usize| {
                set_lanes_state.set(n.max(1));
                trigger.set(true);
            }),
        );

        ctx.register_method::<Rc<dyn Fn() -> usize>>("getLanes", Rc::new(move || lanes.get()));
    }
}
