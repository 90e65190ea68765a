#![forbid(unsafe_code)]

//! Boundary crossing detection for scroll regions.
//!
//! A [`CrossingDetector`] remembers which side of a region the scroll
//! position was on at the previous evaluation and queues the crossing events
//! implied by the new side. Events are drained by the caller, the same way
//! animation milestones are polled instead of delivered through closures.
//!
//! # Invariants
//!
//! 1. The initial side is [`Side::Before`]; a page loaded inside a region
//!    therefore receives `Enter` on its first evaluation.
//! 2. Jumping over a whole region emits both events, in scroll order:
//!    `Enter, Leave` downward and `EnterBack, LeaveBack` upward.
//! 3. Re-observing the same side emits nothing.
//! 4. `drain()` clears the queue; events are not replayed.

/// Where a scroll position lies relative to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    Before,
    Inside,
    After,
}

impl Side {
    /// Side of `position` for the region `[start, end)`.
    ///
    /// Zero-length regions have no inside: positions at or past `start` are
    /// after it.
    #[must_use]
    pub fn of(position: f64, start: f64, end: f64) -> Self {
        if position < start {
            Self::Before
        } else if position < end {
            Self::Inside
        } else {
            Self::After
        }
    }
}

/// A boundary crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crossing {
    /// Crossed the start moving down.
    Enter,
    /// Crossed the end moving down.
    Leave,
    /// Crossed the end moving up.
    EnterBack,
    /// Crossed the start moving up.
    LeaveBack,
}

/// Queues crossings implied by successive [`Side`] observations.
#[derive(Debug, Clone, Default)]
pub struct CrossingDetector {
    side: Side,
    events: Vec<Crossing>,
}

impl CrossingDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Side recorded at the last observation.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Record the current side and queue any crossings.
    pub fn observe(&mut self, next: Side) {
        use Crossing::*;
        let crossed: &[Crossing] = match (self.side, next) {
            (Side::Before, Side::Inside) => &[Enter],
            (Side::Before, Side::After) => &[Enter, Leave],
            (Side::Inside, Side::After) => &[Leave],
            (Side::Inside, Side::Before) => &[LeaveBack],
            (Side::After, Side::Inside) => &[EnterBack],
            (Side::After, Side::Before) => &[EnterBack, LeaveBack],
            _ => &[],
        };
        self.events.extend_from_slice(crossed);
        self.side = next;
    }

    /// Drain queued crossings in the order they happened.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Crossing> {
        self.events.drain(..)
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.events.len()
    }
}
