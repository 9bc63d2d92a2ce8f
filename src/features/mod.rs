//! Feature implementations installed via `vlist(config).use_feature(...)`
//! (spec §4.8). Each module implements [`crate::feature::Feature`] at the
//! level the spec names it: the interface a feature presents to the core
//! and to external callers is specified; the concrete algorithm behind it
//! is summarized, not prescribed (spec §1).

pub mod async_feature;
pub mod grid;
pub mod masonry;
pub mod page_scroll;
pub mod scrollbar;
pub mod sections;
pub mod selection;
pub mod snapshots;
