#![forbid(unsafe_code)]

//! Core: geometry, viewport conditions, pointer input, scroll progress
//! primitives, and the host collaborator traits.
//!
//! Nothing in this crate mutates a page. It describes what the runtime
//! computes from scroll position and viewport state, and the narrow
//! [`host`] interfaces through which the runtime reaches an animation
//! engine and a layout provider.

pub mod animation;
pub mod crossing;
pub mod element;
pub mod error;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod pointer;
pub mod viewport;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
