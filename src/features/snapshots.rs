//! Snapshots feature: persists and restores a scroll position across
//! `destroy`/rebuild via `sessionStorage`, for the SPA-navigation case the
//! GLOSSARY's "Snapshot" entry describes.
//!
//! Unlike most other features, `setup`/`destroy` both run with direct
//! `&mut BuilderContext` access (no registered-method indirection needed),
//! since persistence only has to happen at those two fixed points.

use web_sys::Storage;

use crate::context::BuilderContext;
use crate::feature::{priority, Feature};

fn storage() -> Option<Storage> {
    web_sys::window()?.session_storage().ok()?
}

fn parse_snapshot(raw: &str) -> Option<(usize, f64)> {
    let (index, offset) = raw.split_once(':')?;
    Some((index.parse().ok()?, offset.parse().ok()?))
}

/// Keys its persisted snapshot by `storage_key`; multiple lists sharing a
/// page must use distinct keys.
#[derive(Debug)]
pub struct SnapshotsFeature {
    storage_key: String,
}

impl SnapshotsFeature {
    /// Construct with the `sessionStorage` key this instance persists
    /// under.
    pub fn new(storage_key: impl Into<String>) -> Self {
        Self { storage_key: storage_key.into() }
    }
}

impl<T: 'static> Feature<T> for SnapshotsFeature {
    fn name(&self) -> &str {
        "snapshots"
    }

    fn priority(&self) -> i32 {
        priority::SNAPSHOTS
    }

    fn setup(&mut self, ctx: &mut BuilderContext<T>) {
        let Some(storage) = storage() else {
            return;
        };
        let Ok(Some(raw)) = storage.get_item(&self.storage_key) else {
            return;
        };
        let Some((index, offset_in_item)) = parse_snapshot(&raw) else {
            return;
        };
        if index >= ctx.data_manager.len() {
            return;
        }
        let pos = ctx.size_cache.offset(index) + offset_in_item;
        ctx.scroll_controller.set_scroll_top(pos);
        ctx.force_render();
    }

    fn destroy(&mut self, ctx: &mut BuilderContext<T>) {
        let Some(storage) = storage() else {
            return;
        };
        let scroll_pos = ctx.scroll_controller.get_scroll_top();
        let index = ctx.size_cache.index_at_offset(scroll_pos);
        let offset_in_item = scroll_pos - ctx.size_cache.offset(index);
        let raw = format!("{index}:{offset_in_item}");
        let _ = storage.set_item(&self.storage_key, &raw);
    }
}
