//! Sections feature: exposes a binary search from item index to enclosing
//! section start (spec §4.8 "sections sticky-header binary search",
//! summarized at the interface level per §1's scope note).
//!
//! Sticky visual behavior is a CSS `position: sticky` concern driven by a
//! `data-group`-style attribute the item template sets using
//! `getSectionForIndex`/`isSectionStart` — the core renderer has no
//! dedicated "header row" concept, so this feature contributes the lookup
//! rather than DOM manipulation of its own.

use std::rc::Rc;

use crate::context::BuilderContext;
use crate::feature::{priority, Feature};

/// Ascending, deduplicated section-start indices; index `0` is implicitly
/// a section start even if not listed.
#[derive(Debug)]
pub struct SectionsFeature {
    boundaries: Vec<usize>,
}

impl SectionsFeature {
    /// Construct from an unsorted list of section-start indices.
    pub fn new(mut boundaries: Vec<usize>) -> Self {
        boundaries.sort_unstable();
        boundaries.dedup();
        Self { boundaries }
    }

    fn section_start_for(boundaries: &[usize], index: usize) -> usize {
        let pos = boundaries.partition_point(|&b| b <= index);
        if pos == 0 {
            0
        } else {
            boundaries[pos - 1]
        }
    }
}

impl<T: 'static> Feature<T> for SectionsFeature {
    fn name(&self) -> &str {
        "sections"
    }

    fn priority(&self) -> i32 {
        priority::SECTIONS
    }

    fn setup(&mut self, ctx: &mut BuilderContext<T>) {
        let boundaries = Rc::new(self.boundaries.clone());

        let lookup = boundaries.clone();
        let get_section_for_index: Rc<dyn Fn(usize) -> usize> =
            Rc::new(move |index: usize| Self::section_start_for(&lookup, index));
        ctx.register_method("getSectionForIndex", get_section_for_index);

        let start_check = boundaries.clone();
        let is_section_start: Rc<dyn Fn(usize) -> bool> =
            Rc::new(move |index: usize| index == 0 || start_check.binary_search(&index).is_ok());
        ctx.register_method("isSectionStart", is_section_start);

        let get_boundaries: Rc<dyn Fn() -> Vec<usize>> = Rc::new(move || (*boundaries).clone());
        ctx.register_method("getSectionBoundaries", get_boundaries);
    }
}
