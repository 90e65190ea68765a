#![forbid(unsafe_code)]

//! One-shot entrance sequence played on load.
//!
//! A step animates a group of elements from explicit start values to their
//! resting values. Steps begin at their own `at` offset; elements within a
//! step are spread by the step's stagger. Missing elements are skipped
//! without shifting the others.

use std::borrow::Cow;
use std::time::Duration;

use scrollstage_core::animation::{StaggerMode, stagger_offsets};
use scrollstage_core::element::{ElementId, Props, Timing};

use crate::stage::FrameCx;

/// Owner tag for entrance tweens in the shared handle registry.
pub const ENTRANCE_OWNER: &str = "entrance";

#[derive(Debug, Clone, PartialEq)]
pub struct EntranceStep {
    pub targets: Vec<ElementId>,
    pub from: Props,
    pub to: Props,
    pub duration: Duration,
    pub ease: Cow<'static, str>,
    /// Start offset from the beginning of the sequence.
    pub at: Duration,
    pub stagger: Duration,
    pub stagger_mode: StaggerMode,
}

impl EntranceStep {
    #[must_use]
    pub fn new(targets: impl IntoIterator<Item = ElementId>, from: Props, to: Props) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            from,
            to,
            duration: Duration::from_millis(1200),
            ease: Cow::Borrowed("power3.out"),
            at: Duration::ZERO,
            stagger: Duration::ZERO,
            stagger_mode: StaggerMode::Linear,
        }
    }

    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn ease(mut self, ease: impl Into<Cow<'static, str>>) -> Self {
        self.ease = ease.into();
        self
    }

    #[must_use]
    pub fn at(mut self, at: Duration) -> Self {
        self.at = at;
        self
    }

    #[must_use]
    pub fn stagger(mut self, each: Duration, mode: StaggerMode) -> Self {
        self.stagger = each;
        self.stagger_mode = mode;
        self
    }

    /// Start delay of each target.
    #[must_use]
    pub fn delays(&self) -> Vec<Duration> {
        stagger_offsets(self.targets.len(), self.stagger, self.stagger_mode)
            .into_iter()
            .map(|offset| self.at + offset)
            .collect()
    }
}

/// Hand every step to the engine. Returns how many tweens were started.
pub fn play_entrance(steps: &[EntranceStep], cx: &mut FrameCx<'_>) -> usize {
    let mut started = 0;
    for step in steps {
        for (target, delay) in step.targets.iter().zip(step.delays()) {
            if !cx.layout.contains(target) {
                tracing::debug!(element = %target, "entrance target missing");
                continue;
            }
            let timing = Timing::new(step.duration)
                .delay(delay)
                .ease(step.ease.clone());
            let handle = cx.engine.animate(target, Some(&step.from), &step.to, &timing);
            cx.handles.track(ENTRANCE_OWNER, handle);
            started += 1;
        }
    }
    started
}
