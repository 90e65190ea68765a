#![forbid(unsafe_code)]

//! Runtime: everything that drives a page through the host collaborators.
//!
//! # Role in scrollstage
//! `scrollstage-runtime` turns the primitives of `scrollstage-core` into
//! behavior. It owns the scroll-bound region engine, the responsive
//! variant router, the floating ticket state machine, the peek drag and
//! the timers, and composes them into a page with [`Choreographer`].
//!
//! # How it fits in the system
//! The host owns the event loop. It forwards scroll, resize, pointer and
//! frame callbacks into a [`Choreographer`], which reaches the page only
//! through the [`AnimationEngine`](scrollstage_core::host::AnimationEngine)
//! and [`LayoutProvider`](scrollstage_core::host::LayoutProvider) it was
//! built with. Nothing here blocks or spawns.

pub mod cancellation;
pub mod choreographer;
pub mod config;
pub mod divider;
pub mod drag;
pub mod entrance;
pub mod flicker;
pub mod handles;
pub mod listeners;
pub mod region;
pub mod router;
pub mod stage;
pub mod ticket;

#[cfg(test)]
mod testkit;

pub use cancellation::{CancellationSource, CancellationToken};
pub use choreographer::{Choreographer, PageBindings};
pub use config::{ChoreographyConfig, ConfigError};
pub use divider::{COMPACT_VARIANT, DESKTOP_VARIANT, DIVIDER_GROUP, DividerConfig, Parallax};
pub use drag::{DragConfig, DragOutcome, PointerDrag};
pub use entrance::{EntranceStep, play_entrance};
pub use flicker::{FlickerConfig, FlickerLoop};
pub use handles::HandleRegistry;
pub use listeners::{ListenerId, PointerListeners};
pub use region::{
    Anchor, BindingId, Extent, PinPhase, PinState, RegionBounds, RegionEnd, RegionUpdate,
    ScrollRegion, ScrollRegionEngine, Scrub, ScrubTween,
};
pub use router::{ResponsiveRouter, RouterPass, Teardown, teardown};
pub use stage::{FrameCx, Stage};
pub use ticket::{
    AnchorRect, TicketConfig, TicketSnapshot, TicketStateMachine, TicketTrigger, TicketZoneState,
};
