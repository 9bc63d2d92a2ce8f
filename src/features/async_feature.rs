//! Async data-loading feature: substitutes [`AsyncDataManager`] for the
//! default in-memory store, paging items in on demand (spec §4.7/§4.8;
//! §6 events `load:start`/`load:end`).
//!
//! A genuinely non-blocking fetch would need [`DataManager::get_item`] to
//! hand back owned or reference-counted data instead of a borrow tied to
//! `&self` — the same ownership mismatch [`crate::list`] already documents
//! for `getItem`/`getItems`. This manager's loader callback is therefore
//! synchronous: a caller doing real network I/O resolves it ahead of time
//! (e.g. maintains its own prefetch cache behind the closure) rather than
//! the manager awaiting a `Promise` mid-page-load.

use std::collections::{HashMap, HashSet};

use crate::context::BuilderContext;
use crate::data_manager::{AsyncLoadEvent, DataManager, Invalidation};
use crate::feature::{priority, Feature};
use crate::range_math::Range;

/// How far past the rendered range to preload, and the lowest scroll
/// velocity (px/ms) below which preloading still happens (spec §4.8
/// reference values; a feature may tune these further).
pub const PRELOAD_ITEMS_AHEAD: usize = 20;
/// Reference scroll-velocity threshold (px/ms) above which preload
/// requests are skipped, since the viewport is moving too fast for the
/// preloaded page to matter before it's scrolled past.
pub const CANCEL_LOAD_VELOCITY_THRESHOLD: f64 = 5.0;

/// Pages items in lazily via a caller-supplied loader keyed by page index
/// (`start / page_size`).
pub struct AsyncDataManager<T> {
    loaded: HashMap<usize, T>,
    requested: HashSet<(usize, usize)>,
    total: usize,
    page_size: usize,
    events: Vec<AsyncLoadEvent>,
    loader: Box<dyn Fn(usize, usize) -> Vec<T>>,
}

impl<T> std::fmt::Debug for AsyncDataManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncDataManager")
            .field("total", &self.total)
            .field("page_size", &self.page_size)
            .field("loaded_count", &self.loaded.len())
            .finish_non_exhaustive()
    }
}

impl<T> AsyncDataManager<T> {
    /// Construct a manager for `total` logical items, fetched `page_size`
    /// at a time via `loader(start, end) -> items`.
    pub fn new(total: usize, page_size: usize, loader: Box<dyn Fn(usize, usize) -> Vec<T>>) -> Self {
        Self {
            loaded: HashMap::new(),
            requested: HashSet::new(),
            total,
            page_size: page_size.max(1),
            events: Vec::new(),
            loader,
        }
    }

    fn page_loaded(&self, start: usize, end: usize) -> bool {
        (start..end).all(|i| self.loaded.contains_key(&i))
    }
}

impl<T: 'static> DataManager<T> for AsyncDataManager<T> {
    fn get_item(&self, index: usize) -> Option<&T> {
        self.loaded.get(&index)
    }

    fn len(&self) -> usize {
        self.total
    }

    fn set_items(&mut self, items: Vec<T>) -> Invalidation {
        self.loaded.clear();
        self.requested.clear();
        self.total = items.len();
        for (i, item) in items.into_iter().enumerate() {
            self.loaded.insert(i, item);
        }
        Invalidation::Reset
    }

    fn append_items(&mut self, items: Vec<T>) -> Invalidation {
        let start = self.total;
        let count = items.len();
        for (i, item) in items.into_iter().enumerate() {
            self.loaded.insert(start + i, item);
        }
        self.total += count;
        Invalidation::Append
    }

    fn prepend_items(&mut self, items: Vec<T>) -> Invalidation {
        let shift = items.len();
        let shifted: HashMap<usize, T> = self.loaded.drain().map(|(i, v)| (i + shift, v)).collect();
        self.loaded = shifted;
        for (i, item) in items.into_iter().enumerate() {
            self.loaded.insert(i, item);
        }
        self.requested.clear();
        self.total += shift;
        Invalidation::Shift
    }

    fn update_item(&mut self, index: usize, patch: impl FnOnce(&mut T)) -> Invalidation {
        if let Some(item) = self.loaded.get_mut(&index) {
            patch(item);
        } else {
            log::warn!("update_item({index}) on an unloaded async page");
        }
        Invalidation::Single(index)
    }

    fn remove_item(&mut self, index: usize) -> Invalidation {
        self.loaded.remove(&index);
        let shifted: HashMap<usize, T> = self
            .loaded
            .drain()
            .filter_map(|(i, v)| if i > index { Some((i - 1, v)) } else { Some((i, v)) })
            .collect();
        self.loaded = shifted;
        self.requested.clear();
        self.total = self.total.saturating_sub(1);
        Invalidation::Shift
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn ensure_loaded(&mut self, range: Range) {
        if range.is_empty() {
            return;
        }
        let page = self.page_size;
        let mut page_start = (range.start / page) * page;
        while page_start < range.end && page_start < self.total {
            let page_end = (page_start + page).min(self.total);
            let key = (page_start, page_end);
            if !self.requested.contains(&key) && !self.page_loaded(page_start, page_end) {
                self.requested.insert(key);
                self.events.push(AsyncLoadEvent::Start { start: page_start, end: page_end });
                let items = (self.loader)(page_start, page_end);
                for (i, item) in items.into_iter().enumerate() {
                    self.loaded.insert(page_start + i, item);
                }
                self.requested.remove(&key);
                self.events.push(AsyncLoadEvent::End { start: page_start, end: page_end });
            }
            page_start = page_end;
        }
    }

    fn drain_events(&mut self) -> Vec<AsyncLoadEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Installs [`AsyncDataManager`] in place of the default in-memory store.
pub struct AsyncFeature<T> {
    total: usize,
    page_size: usize,
    loader: Box<dyn Fn(usize, usize) -> Vec<T>>,
}

impl<T> std::fmt::Debug for AsyncFeature<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncFeature")
            .field("total", &self.total)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl<T> AsyncFeature<T> {
    /// Construct a feature that pages `total` logical items in
    /// `page_size` at a time via `loader`.
    pub fn new(total: usize, page_size: usize, loader: Box<dyn Fn(usize, usize) -> Vec<T>>) -> Self {
        Self { total, page_size, loader }
    }
}

impl<T: 'static> Feature<T> for AsyncFeature<T> {
    fn name(&self) -> &str {
        "async"
    }

    fn priority(&self) -> i32 {
        priority::DATA
    }

    fn setup(&mut self, ctx: &mut BuilderContext<T>) {
        let loader = std::mem::replace(&mut self.loader, Box::new(|_, _| Vec::new()));
        let manager = AsyncDataManager::new(self.total, self.page_size, loader);
        ctx.set_data_manager(Box::new(manager));
    }
}
