#![forbid(unsafe_code)]

//! Floating ticket state machine.
//!
//! The ticket is hidden until its zone is entered. On entry it is fixed at a
//! snapshot of the peek badge's position ([`AnchorRect`]), the peek is
//! hidden, and zone progress then moves the ticket along a [`SegmentPath`]
//! until it settles at the path's terminal offset. Leaving the zone back
//! upwards undoes every style the machine wrote.
//!
//! # State Machine
//!
//! ```text
//!            enter                progress in (0,1)        progress = 1
//!  Hidden ─────────▶ Anchored ─────────────────▶ Transitioning ─────────▶ Settled
//!    ▲                  ▲  progress = 0               │  ▲                  │
//!    │                  └─────────────────────────────┘  └──────────────────┘
//!    └──────────────────── leave_back (from any visible state) ──────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. Every handler is idempotent; a repeated event never re-animates.
//! 2. The anchor is captured once per visible episode. While `Anchored` a
//!    repeated `enter` recaptures only after [`invalidate_geometry`]; while
//!    `Transitioning` or `Settled` it is ignored.
//! 3. `leave_back` returns to a state indistinguishable from page load.
//! 4. Progress updates are treated as absolute: a lower value after a higher
//!    one moves the ticket back along the path.
//!
//! [`invalidate_geometry`]: TicketStateMachine::invalidate_geometry

use std::fmt;

use scrollstage_core::animation::{SegmentPath, clamp_progress};
use scrollstage_core::crossing::Crossing;
use scrollstage_core::element::{ElementId, Prop, Props, Timing};
use scrollstage_core::error::ChoreographyError;
use scrollstage_core::geometry::Point;
use scrollstage_core::host::{AnimationEngine, LayoutProvider};

use crate::handles::HandleRegistry;
use crate::region::RegionUpdate;

const OWNER: &str = "ticket";

/// Every property the machine writes on the ticket.
pub const TICKET_PROPS: [Prop; 7] = [
    Prop::Position,
    Prop::Top,
    Prop::Left,
    Prop::X,
    Prop::Y,
    Prop::Visibility,
    Prop::Opacity,
];

/// Every property the machine writes on the peek badge.
pub const PEEK_PROPS: [Prop; 2] = [Prop::Opacity, Prop::PointerEvents];

/// Where the ticket zone starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "policy-config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "policy-config", serde(rename_all = "kebab-case"))]
pub enum TicketTrigger {
    /// Middle of the viewport reaches the top of the about section.
    #[default]
    AboutZone,
    /// Top of the pinned panels enters the bottom of the viewport.
    PanelsEntry,
}

/// Point-in-time `{top, left}` of the peek badge in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorRect {
    top: f64,
    left: f64,
}

impl AnchorRect {
    /// Fixed position used when the peek badge is absent.
    #[must_use]
    pub const fn fallback(top: f64, left: f64) -> Self {
        Self { top, left }
    }

    /// Snapshot of `peek`'s current box shifted by its drag `translation`.
    #[must_use]
    pub fn capture(peek: &ElementId, layout: &dyn LayoutProvider, translation: Point) -> Option<Self> {
        let b = layout.bounding_box(peek)?;
        Some(Self {
            top: b.top + translation.y,
            left: b.left + translation.x,
        })
    }

    #[must_use]
    pub const fn top(&self) -> f64 {
        self.top
    }

    #[must_use]
    pub const fn left(&self) -> f64 {
        self.left
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TicketZoneState {
    #[default]
    Hidden,
    Anchored,
    Transitioning(f64),
    Settled,
}

impl TicketZoneState {
    fn name(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Anchored => "anchored",
            Self::Transitioning(_) => "transitioning",
            Self::Settled => "settled",
        }
    }
}

impl fmt::Display for TicketZoneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transitioning(p) => write!(f, "transitioning({p:.3})"),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketConfig {
    pub ticket: ElementId,
    pub peek: Option<ElementId>,
    pub fallback: AnchorRect,
    pub path: SegmentPath,
    /// Opacity fade on reveal; `None` shows the ticket at full opacity.
    pub fade_in: Option<Timing>,
}

impl TicketConfig {
    #[must_use]
    pub fn new(ticket: impl Into<ElementId>, path: SegmentPath) -> Self {
        Self {
            ticket: ticket.into(),
            peek: None,
            fallback: AnchorRect::fallback(24.0, 24.0),
            path,
            fade_in: None,
        }
    }

    #[must_use]
    pub fn peek(mut self, peek: impl Into<ElementId>) -> Self {
        self.peek = Some(peek.into());
        self
    }

    #[must_use]
    pub fn fallback(mut self, fallback: AnchorRect) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub fn fade_in(mut self, timing: Timing) -> Self {
        self.fade_in = Some(timing);
        self
    }
}

/// Observable state for embedders and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TicketSnapshot {
    pub state: TicketZoneState,
    pub anchor: Option<AnchorRect>,
    pub offset: Option<Point>,
    pub peek_hidden: bool,
}

#[derive(Debug)]
pub struct TicketStateMachine {
    config: TicketConfig,
    state: TicketZoneState,
    anchor: Option<AnchorRect>,
    anchor_epoch: u64,
    epoch: u64,
    offset: Option<Point>,
    peek_hidden: bool,
    peek_translation: Point,
    handles: HandleRegistry,
}

impl TicketStateMachine {
    #[must_use]
    pub fn new(config: TicketConfig) -> Self {
        Self {
            config,
            state: TicketZoneState::Hidden,
            anchor: None,
            anchor_epoch: 0,
            epoch: 0,
            offset: None,
            peek_hidden: false,
            peek_translation: Point::default(),
            handles: HandleRegistry::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &TicketConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> TicketZoneState {
        self.state
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.state == TicketZoneState::Hidden
    }

    #[must_use]
    pub fn peek_hidden(&self) -> bool {
        self.peek_hidden
    }

    #[must_use]
    pub fn snapshot(&self) -> TicketSnapshot {
        TicketSnapshot {
            state: self.state,
            anchor: self.anchor,
            offset: self.offset,
            peek_hidden: self.peek_hidden,
        }
    }

    /// Layout changed; the next `enter` while anchored recaptures.
    pub fn invalidate_geometry(&mut self) {
        self.epoch += 1;
    }

    /// Fails with [`ChoreographyError::StaleGeometry`] when the held anchor
    /// was captured before the last [`invalidate_geometry`](Self::invalidate_geometry).
    pub fn check_anchor(&self) -> Result<(), ChoreographyError> {
        if self.anchor.is_some() && self.anchor_epoch != self.epoch {
            Err(ChoreographyError::StaleGeometry {
                captured: self.anchor_epoch,
                current: self.epoch,
            })
        } else {
            Ok(())
        }
    }

    /// Current drag translation of the peek badge, added to captures.
    pub fn set_peek_translation(&mut self, translation: Point) {
        self.peek_translation = translation;
    }

    pub fn pause_animations(&mut self, engine: &mut dyn AnimationEngine) {
        self.handles.pause_all(engine);
    }

    pub fn resume_animations(&mut self, engine: &mut dyn AnimationEngine) {
        self.handles.resume_all(engine);
    }

    /// Dispatch a zone update: crossings in order, then progress.
    pub fn apply(
        &mut self,
        update: &RegionUpdate,
        engine: &mut dyn AnimationEngine,
        layout: &dyn LayoutProvider,
    ) {
        for crossing in &update.crossings {
            match crossing {
                Crossing::Enter => self.enter(engine, layout),
                Crossing::Leave => self.leave(),
                Crossing::EnterBack => self.enter_back(engine, layout),
                Crossing::LeaveBack => self.leave_back(engine),
            }
        }
        self.progress(update.progress, engine);
    }

    pub fn enter(&mut self, engine: &mut dyn AnimationEngine, layout: &dyn LayoutProvider) {
        match self.state {
            TicketZoneState::Hidden => self.reveal(engine, layout),
            TicketZoneState::Anchored => match self.check_anchor() {
                Ok(()) => tracing::trace!(state = %self.state, "ticket enter ignored"),
                Err(stale) => {
                    let rect = self.capture(layout);
                    engine.set(
                        &self.config.ticket,
                        &Props::new()
                            .with(Prop::Top, rect.top)
                            .with(Prop::Left, rect.left),
                    );
                    self.anchor = Some(rect);
                    self.anchor_epoch = self.epoch;
                    tracing::debug!(
                        top = rect.top,
                        left = rect.left,
                        error = %stale,
                        "ticket anchor recaptured"
                    );
                }
            },
            TicketZoneState::Transitioning(_) | TicketZoneState::Settled => {
                tracing::trace!(state = %self.state, "ticket enter ignored");
            }
        }
    }

    /// Scrolling back up into the zone from below.
    pub fn enter_back(&mut self, engine: &mut dyn AnimationEngine, layout: &dyn LayoutProvider) {
        if self.state == TicketZoneState::Hidden {
            self.reveal(engine, layout);
        }
    }

    /// Passing the far boundary. Settling is driven by progress.
    pub fn leave(&mut self) {
        tracing::trace!(state = %self.state, "ticket zone left");
    }

    pub fn leave_back(&mut self, engine: &mut dyn AnimationEngine) {
        if self.state == TicketZoneState::Hidden {
            return;
        }
        self.handles.cancel_all(engine);
        engine.clear(&self.config.ticket, &TICKET_PROPS);
        if self.peek_hidden
            && let Some(peek) = &self.config.peek
        {
            engine.clear(peek, &PEEK_PROPS);
        }
        self.peek_hidden = false;
        self.anchor = None;
        self.offset = None;
        self.transition(TicketZoneState::Hidden);
    }

    /// Absolute zone progress. Ignored while hidden.
    pub fn progress(&mut self, progress: f64, engine: &mut dyn AnimationEngine) {
        if self.state == TicketZoneState::Hidden {
            return;
        }
        let p = clamp_progress(progress);
        let offset = self.config.path.sample(p);
        if self.offset != Some(offset) {
            engine.set(
                &self.config.ticket,
                &Props::new().with(Prop::X, offset.x).with(Prop::Y, offset.y),
            );
            self.offset = Some(offset);
        }
        let next = if p >= 1.0 {
            TicketZoneState::Settled
        } else if p <= 0.0 {
            TicketZoneState::Anchored
        } else {
            TicketZoneState::Transitioning(p)
        };
        self.transition(next);
    }

    /// Return to hidden regardless of zone state (page teardown).
    pub fn reset(&mut self, engine: &mut dyn AnimationEngine) {
        self.leave_back(engine);
    }

    fn capture(&self, layout: &dyn LayoutProvider) -> AnchorRect {
        self.config
            .peek
            .as_ref()
            .and_then(|peek| AnchorRect::capture(peek, layout, self.peek_translation))
            .unwrap_or_else(|| {
                tracing::debug!("peek badge missing, using fallback anchor");
                self.config.fallback
            })
    }

    fn reveal(&mut self, engine: &mut dyn AnimationEngine, layout: &dyn LayoutProvider) {
        let rect = self.capture(layout);
        let origin = self.config.path.origin();
        let ticket = &self.config.ticket;
        let props = Props::new()
            .with(Prop::Position, "fixed")
            .with(Prop::Top, rect.top)
            .with(Prop::Left, rect.left)
            .with(Prop::X, origin.x)
            .with(Prop::Y, origin.y)
            .with(Prop::Visibility, "visible");
        match &self.config.fade_in {
            Some(timing) => {
                engine.set(ticket, &props);
                let handle = engine.animate(
                    ticket,
                    Some(&Props::new().with(Prop::Opacity, 0.0)),
                    &Props::new().with(Prop::Opacity, 1.0),
                    timing,
                );
                self.handles.track(OWNER, handle);
            }
            None => engine.set(ticket, &props.with(Prop::Opacity, 1.0)),
        }

        if let Some(peek) = &self.config.peek
            && layout.contains(peek)
        {
            engine.set(
                peek,
                &Props::new()
                    .with(Prop::Opacity, 0.0)
                    .with(Prop::PointerEvents, "none"),
            );
            self.peek_hidden = true;
        }

        self.anchor = Some(rect);
        self.anchor_epoch = self.epoch;
        self.offset = Some(origin);
        self.transition(TicketZoneState::Anchored);
    }

    fn transition(&mut self, next: TicketZoneState) {
        if self.state.name() != next.name() {
            tracing::debug!(from = %self.state, to = %next, "ticket transition");
        }
        self.state = next;
    }
}
