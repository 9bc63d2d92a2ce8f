//! Error types surfaced synchronously from the builder and public handle.
//!
//! Per the error taxonomy, *configuration errors* are the only ones that
//! throw: an unresolvable container, conflicting features, or an invalid
//! orientation. Data/state errors degrade gracefully (placeholders, clamped
//! reads, logged warnings) and never appear here.

use thiserror::Error;

/// Errors thrown synchronously from [`crate::builder::VlistBuilder::build`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `config.container` did not resolve to an element, either because the
    /// selector matched nothing or the element reference was already
    /// detached from the document.
    #[error("container did not resolve to an element: {0}")]
    NoContainer(String),

    /// Two registered features declared each other (or a shared name) as a
    /// conflict.
    #[error("feature '{a}' conflicts with feature '{b}'")]
    Conflict {
        /// The first feature's name.
        a: String,
        /// The second feature's name.
        b: String,
    },

    /// `orientation` was set to something other than `vertical`/`horizontal`.
    #[error("invalid orientation: {0}")]
    InvalidOrientation(String),
}

/// Errors surfaced from public methods that can fail after the list is
/// built (`scrollToIndex` to an out-of-range index, a double `destroy`, ...).
#[derive(Debug, Error)]
pub enum StateError {
    /// The index passed to a public method was out of `[0, item_count)`.
    #[error("index {index} out of range for {count} items")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The current item count.
        count: usize,
    },

    /// The list instance was already destroyed; the call is a no-op.
    #[error("list instance already destroyed")]
    AlreadyDestroyed,
}
