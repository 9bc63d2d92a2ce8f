//! A coordination core for rendering arbitrarily large ordered sequences of
//! items inside a scrollable browser viewport while keeping only a small,
//! bounded number of DOM elements materialized at any time.
//!
//! The crate has no framework dependency of its own — no VDOM diffing, no
//! component lifecycle. Framework bindings (React/Vue/Svelte/Solid-style
//! wrappers, or a Yew component) are external collaborators that call
//! [`builder::vlist`] and drive the returned [`list::VList`] handle.
//!
//! ```no_run
//! use std::rc::Rc;
//! use vlist::builder::vlist;
//! use vlist::config::{Container, ItemConfig, ListConfig};
//! use vlist::renderer::TemplateOutput;
//! use vlist::size_cache::SizeSource;
//!
//! let item = ItemConfig::new(
//!     SizeSource::Fixed(48.0),
//!     Rc::new(|item: &String, _index: usize| TemplateOutput::Html(item.clone())),
//! );
//! let config = ListConfig::new(Container::Selector("#list".into()), item)
//!     .with_items((0..10_000).map(|i| format!("row {i}")).collect());
//! let list = vlist(config).build().expect("container must resolve");
//! list.destroy();
//! ```

#![deny(missing_docs, missing_debug_implementations, bare_trait_objects, anonymous_parameters, elided_lifetimes_in_paths)]

pub mod builder;
pub mod config;
pub mod context;
pub mod data_manager;
pub mod dom;
pub mod element_pool;
pub mod emitter;
pub mod error;
pub mod feature;
pub mod features;
pub mod list;
pub mod range_math;
pub mod render_loop;
pub mod renderer;
pub mod scroll_controller;
pub mod size_cache;
pub mod tracked_item;
pub mod velocity;
pub mod viewport_state;

/// Placeholder glyph rendered for an in-range index the data manager has
/// not yet resolved (spec §6 `DEFAULT_MASK_CHARACTER`, §7 "Missing data
/// appears as a visible placeholder").
pub const DEFAULT_MASK_CHARACTER: &str = "x";

/// Default number of items rendered beyond the visible range on each side
/// (spec §6 `DEFAULT_OVERSCAN`).
pub const DEFAULT_OVERSCAN: usize = 3;

/// Default cap on idle elements retained per element pool (spec §6
/// `DEFAULT_POOL_MAX`).
pub const DEFAULT_POOL_MAX: usize = 100;

/// Installs [`console_error_panic_hook`] so a Rust panic surfaces as a
/// readable stack trace in the browser console instead of an opaque
/// `unreachable` trap. Consumers call this once during bootstrap; the
/// crate never installs it automatically (spec's ambient-stack note: "the
/// crate does not install a logger [or panic hook]; consumers wire one
/// up").
#[cfg(feature = "panic-hook")]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}
