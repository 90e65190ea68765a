#![forbid(unsafe_code)]

//! Scroll-driven animation primitives.
//!
//! Unlike time-based tweens, everything here is evaluated from a progress
//! value the caller supplies. The only time-dependent piece is [`Lag`], the
//! low-pass filter used for smoothed scrubbing; it advances by an explicit
//! `dt` so results stay reproducible under a host-controlled clock.
//!
//! The tween engine itself is a host collaborator; these easing functions
//! shape path segments and stagger distribution only.

pub mod path;
pub mod stagger;

use std::time::Duration;

pub use path::{SegmentEasing, SegmentPath};
pub use stagger::{StaggerMode, stagger_offsets};

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f64) -> f64;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in (slow start).
#[inline]
pub fn ease_in(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out.
#[inline]
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Hermite smoothstep.
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Clamp a progress value into `[0, 1]`, mapping NaN to `0`.
#[inline]
pub fn clamp_progress(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

// ---------------------------------------------------------------------------
// Lag
// ---------------------------------------------------------------------------

/// Distance under which [`Lag`] snaps onto its target.
pub const LAG_SNAP_EPSILON: f64 = 1e-4;

/// Exponential low-pass filter with time constant `lag`.
///
/// Each tick moves the value by `1 − e^(−dt/lag)` of the remaining distance
/// and snaps once within [`LAG_SNAP_EPSILON`], so a settled filter reports
/// its target exactly. The first tick after construction or [`reset`](Lag::reset)
/// adopts the target directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lag {
    lag: Duration,
    value: Option<f64>,
}

impl Lag {
    #[must_use]
    pub const fn new(lag: Duration) -> Self {
        Self { lag, value: None }
    }

    /// Configured time constant.
    #[must_use]
    pub const fn lag(&self) -> Duration {
        self.lag
    }

    /// Current filtered value, `None` before the first tick.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        self.value
    }

    /// Whether the filter sits exactly on `target`.
    #[must_use]
    pub fn is_settled(&self, target: f64) -> bool {
        self.value == Some(target)
    }

    /// Advance towards `target` by `dt` and return the new value.
    pub fn tick(&mut self, target: f64, dt: Duration) -> f64 {
        let next = match self.value {
            None => target,
            Some(_) if self.lag.is_zero() => target,
            Some(current) => {
                let alpha = 1.0 - (-dt.as_secs_f64() / self.lag.as_secs_f64()).exp();
                let next = current + (target - current) * alpha;
                if (target - next).abs() < LAG_SNAP_EPSILON {
                    target
                } else {
                    next
                }
            }
        };
        self.value = Some(next);
        next
    }
}
