#![forbid(unsafe_code)]

//! Self-rescheduling sign flicker.
//!
//! Each firing hands the engine a short yoyo opacity flash, then schedules
//! the next firing a random delay after the flash completes. The loop is a
//! timer task polled with the host clock; it stops for good once its
//! [`CancellationToken`] is revoked, cancelling the flash it started last.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use scrollstage_core::element::{ElementId, Prop, Props, Timing};
use scrollstage_core::host::{AnimationEngine, AnimationHandle};

use crate::cancellation::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub struct FlickerConfig {
    pub target: ElementId,
    pub opacity_min: f64,
    pub opacity_max: f64,
    /// Length of one half-cycle of the flash.
    pub flash: Duration,
    /// Extra yoyo repetitions per flash.
    pub repeats: i32,
    pub delay_min: Duration,
    pub delay_max: Duration,
    pub seed: u64,
}

impl FlickerConfig {
    #[must_use]
    pub fn new(target: impl Into<ElementId>) -> Self {
        Self {
            target: target.into(),
            opacity_min: 0.72,
            opacity_max: 0.88,
            flash: Duration::from_millis(80),
            repeats: 5,
            delay_min: Duration::from_secs(8),
            delay_max: Duration::from_secs(25),
            seed: 0x5eed,
        }
    }

    fn timing(&self) -> Timing {
        Timing::new(self.flash).repeat(self.repeats, true)
    }
}

#[derive(Debug)]
pub struct FlickerLoop {
    config: FlickerConfig,
    rng: ChaCha8Rng,
    token: CancellationToken,
    due: Option<Duration>,
    last: Option<AnimationHandle>,
    fired: u64,
}

impl FlickerLoop {
    /// A loop that fires on its first poll.
    #[must_use]
    pub fn new(config: FlickerConfig, token: CancellationToken) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            token,
            due: Some(Duration::ZERO),
            last: None,
            fired: 0,
        }
    }

    /// Host time of the next firing, `None` once stopped.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.due
    }

    #[must_use]
    pub fn fired(&self) -> u64 {
        self.fired
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.due.is_none()
    }

    /// Fire if due at `now`. Returns whether a flash was started.
    pub fn poll(&mut self, now: Duration, engine: &mut dyn AnimationEngine) -> bool {
        if self.token.is_cancelled() {
            self.stop(engine);
            return false;
        }
        let Some(due) = self.due else {
            return false;
        };
        if now < due {
            return false;
        }

        let low = self.config.opacity_min.min(self.config.opacity_max);
        let high = self.config.opacity_min.max(self.config.opacity_max);
        let opacity = self.rng.gen_range(low..=high);
        let timing = self.config.timing();
        self.last = Some(engine.animate(
            &self.config.target,
            None,
            &Props::new().with(Prop::Opacity, opacity),
            &timing,
        ));
        self.fired += 1;

        let low = self.config.delay_min.min(self.config.delay_max).as_secs_f64();
        let high = self.config.delay_min.max(self.config.delay_max).as_secs_f64();
        let delay = Duration::from_secs_f64(self.rng.gen_range(low..=high));
        let flash = timing.total().unwrap_or_default();
        self.due = Some(now + flash + delay);
        tracing::trace!(opacity, delay_s = delay.as_secs_f64(), "flicker fired");
        true
    }

    fn stop(&mut self, engine: &mut dyn AnimationEngine) {
        if let Some(handle) = self.last.take() {
            engine.cancel(handle);
        }
        if self.due.take().is_some() {
            tracing::debug!(target_element = %self.config.target, "flicker cancelled");
        }
    }
}
