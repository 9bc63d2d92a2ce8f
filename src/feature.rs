//! The `Feature` trait features implement to extend the core without
//! forking it (spec §4.8).

use crate::context::BuilderContext;

/// Canonical feature priorities (spec §4.8: "lower numbers run first").
pub mod priority {
    /// Layout features (grid, masonry).
    pub const LAYOUT: i32 = 10;
    /// Data features (async paging).
    pub const DATA: i32 = 20;
    /// Sizing/compression (scale).
    pub const SCALE: i32 = 30;
    /// Selection.
    pub const SELECTION: i32 = 50;
    /// Sticky concerns (sections).
    pub const SECTIONS: i32 = 60;
    /// UI overlays (scrollbar).
    pub const SCROLLBAR: i32 = 70;
    /// Snapshots, run last.
    pub const SNAPSHOTS: i32 = 80;
}

/// A compositional unit applied at `build()` time. Features register
/// methods, install handlers/slots, and may wrap or replace the data
/// manager or scroll controller — all through the [`BuilderContext`] they
/// receive in [`Feature::setup`].
pub trait Feature<T> {
    /// A stable, unique name used for conflict detection and logging.
    fn name(&self) -> &str;

    /// Where this feature runs relative to others (see [`priority`]).
    /// Default is [`priority::SELECTION`]'s tier, the most common case.
    fn priority(&self) -> i32 {
        priority::SELECTION
    }

    /// Names of features this one cannot coexist with. `build()` throws a
    /// [`crate::error::ConfigError::Conflict`] if both are present.
    fn conflicts(&self) -> &[&str] {
        &[]
    }

    /// Mutate `ctx` to install this feature's behavior.
    fn setup(&mut self, ctx: &mut BuilderContext<T>);

    /// Optional teardown hook, pushed onto `ctx.handlers.destroy_handlers`
    /// by the builder right after `setup` returns (so implementers don't
    /// need to push it themselves).
    fn destroy(&mut self, _ctx: &mut BuilderContext<T>) {}
}
