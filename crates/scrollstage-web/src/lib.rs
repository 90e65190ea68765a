#![forbid(unsafe_code)]

//! `scrollstage-web` provides a host-driven, deterministic binding of the
//! scrollstage choreography.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment pushes scroll, resize and
//!   pointer events.
//! - **Deterministic time**: the host advances a monotonic clock explicitly.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! This crate intentionally does not bind to `wasm-bindgen` or a real DOM.
//! [`RecordingEngine`] and [`StaticLayout`] stand in for the page so the whole
//! choreography can be driven frame by frame in tests, and serve as a
//! reference for embedders writing a real binding.

pub mod engine;
pub mod host;
pub mod layout;
pub mod page;

use core::time::Duration;

pub use engine::{EngineCall, RecordingEngine};
pub use host::{FRAME, HostEvent, StepResult, WebHost};
pub use layout::StaticLayout;
pub use page::{demo_page, demo_viewport};

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}
