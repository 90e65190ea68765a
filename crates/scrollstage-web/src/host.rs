#![forbid(unsafe_code)]

//! Host-driven page runner.
//!
//! [`WebHost`] plays the part of the browser event loop. The embedder (or a
//! test) pushes [`HostEvent`]s and calls [`WebHost::step`] once per
//! animation frame:
//!
//! 1. Queued events are drained in order. Scroll events only move the
//!    layout and mark the page dirty, so any number of them within a frame
//!    coalesce into a single region evaluation.
//! 2. The clock and the engine's tweens advance by `dt`.
//! 3. The choreographer runs its frame.

use std::collections::VecDeque;
use std::time::Duration;

use scrollstage_core::pointer::PointerEvent;
use scrollstage_core::viewport::Viewport;
use scrollstage_runtime::choreographer::Choreographer;
use scrollstage_runtime::config::{ChoreographyConfig, ConfigError};
use scrollstage_runtime::router::RouterPass;
use scrollstage_runtime::ticket::TicketSnapshot;

use crate::DeterministicClock;
use crate::engine::RecordingEngine;
use crate::layout::StaticLayout;
use crate::page::demo_page;

/// Frame length used by [`WebHost::settle`].
pub const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Document scrolled to `y`.
    Scroll(f64),
    Resize(Viewport),
    Pointer(PointerEvent),
}

/// Result of a single [`WebHost::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    pub events_processed: u32,
    /// Scroll events folded into this frame's single evaluation.
    pub scrolls_coalesced: u32,
    /// Whether regions were evaluated during this step.
    pub evaluated: bool,
    /// Region bindings that reported a change.
    pub updates: usize,
    pub frame_idx: u64,
}

pub struct WebHost {
    choreographer: Choreographer<RecordingEngine, StaticLayout>,
    clock: DeterministicClock,
    queue: VecDeque<HostEvent>,
    frame_idx: u64,
}

impl WebHost {
    pub fn new(config: ChoreographyConfig, layout: StaticLayout) -> Result<Self, ConfigError> {
        Ok(Self {
            choreographer: Choreographer::new(config, RecordingEngine::new(), layout)?,
            clock: DeterministicClock::new(),
            queue: VecDeque::new(),
            frame_idx: 0,
        })
    }

    /// The reference page with the default configuration.
    pub fn demo() -> Result<Self, ConfigError> {
        Self::new(ChoreographyConfig::default(), demo_page())
    }

    /// Size the layout to `viewport` and load the page.
    pub fn load(&mut self, viewport: Viewport) -> RouterPass {
        self.layout_mut().set_viewport(viewport.width, viewport.height);
        self.choreographer.load(viewport)
    }

    pub fn push_event(&mut self, event: HostEvent) {
        self.queue.push_back(event);
    }

    pub fn scroll_to(&mut self, y: f64) {
        self.push_event(HostEvent::Scroll(y));
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.push_event(HostEvent::Resize(viewport));
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        self.push_event(HostEvent::Pointer(event));
    }

    /// Process queued events and run one frame of `dt`.
    pub fn step(&mut self, dt: Duration) -> StepResult {
        let mut events_processed = 0;
        let mut scrolls_coalesced = 0;
        while let Some(event) = self.queue.pop_front() {
            events_processed += 1;
            match event {
                HostEvent::Scroll(y) => {
                    scrolls_coalesced += 1;
                    self.layout_mut().set_scroll(y);
                    self.choreographer.scroll();
                }
                HostEvent::Resize(viewport) => {
                    self.layout_mut().set_viewport(viewport.width, viewport.height);
                    let pass = self.choreographer.resize(viewport);
                    tracing::debug!(
                        activated = ?pass.activated,
                        deactivated = ?pass.deactivated,
                        "viewport resized"
                    );
                }
                HostEvent::Pointer(event) => {
                    self.choreographer.pointer(&event);
                }
            }
        }

        self.clock.advance(dt);
        self.engine_mut().advance(dt);
        let evaluated = self.choreographer.needs_frame();
        let updates = self.choreographer.frame(dt).len();
        self.frame_idx += 1;

        StepResult {
            events_processed,
            scrolls_coalesced,
            evaluated,
            updates,
            frame_idx: self.frame_idx,
        }
    }

    /// Step [`FRAME`]s until nothing is pending, at most `max_frames`.
    /// Returns the number of frames run.
    pub fn settle(&mut self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && (!self.queue.is_empty() || self.choreographer.needs_frame()) {
            self.step(FRAME);
            frames += 1;
        }
        frames
    }

    /// Run [`FRAME`]s covering at least `duration` of host time.
    pub fn run_for(&mut self, duration: Duration) {
        let end = self.clock.now() + duration;
        while self.clock.now() < end {
            self.step(FRAME);
        }
    }

    pub fn teardown(&mut self) {
        self.queue.clear();
        self.choreographer.teardown();
    }

    #[must_use]
    pub fn choreographer(&self) -> &Choreographer<RecordingEngine, StaticLayout> {
        &self.choreographer
    }

    pub fn choreographer_mut(&mut self) -> &mut Choreographer<RecordingEngine, StaticLayout> {
        &mut self.choreographer
    }

    #[must_use]
    pub fn engine(&self) -> &RecordingEngine {
        self.choreographer.stage().engine()
    }

    pub fn engine_mut(&mut self) -> &mut RecordingEngine {
        self.choreographer.stage_mut().engine_mut()
    }

    #[must_use]
    pub fn layout(&self) -> &StaticLayout {
        self.choreographer.stage().layout()
    }

    pub fn layout_mut(&mut self) -> &mut StaticLayout {
        self.choreographer.stage_mut().layout_mut()
    }

    #[must_use]
    pub fn ticket(&self) -> TicketSnapshot {
        self.choreographer.ticket_snapshot()
    }

    #[must_use]
    pub fn clock(&self) -> &DeterministicClock {
        &self.clock
    }

    #[must_use]
    pub fn frame_idx(&self) -> u64 {
        self.frame_idx
    }
}

impl std::fmt::Debug for WebHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebHost")
            .field("choreographer", &self.choreographer)
            .field("now", &self.clock.now())
            .field("queued", &self.queue.len())
            .field("frame_idx", &self.frame_idx)
            .finish()
    }
}
