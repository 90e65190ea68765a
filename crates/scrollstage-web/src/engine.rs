#![forbid(unsafe_code)]

//! Recording animation engine.
//!
//! [`RecordingEngine`] keeps an inline style map per element and a call log.
//! Tweens are timed against [`RecordingEngine::advance`] but not
//! interpolated: explicit start values are written when a tween is created
//! and end values when it completes. That is enough to observe what the
//! choreography asked for, frame by frame, without a tween engine.

use std::collections::BTreeMap;
use std::time::Duration;

use scrollstage_core::element::{ElementId, Prop, PropValue, Props, Timing};
use scrollstage_core::host::{AnimationEngine, AnimationHandle};

/// One call made against the engine, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Animate {
        target: ElementId,
        handle: AnimationHandle,
        to: Props,
    },
    Set {
        target: ElementId,
        props: Props,
    },
    Clear {
        target: ElementId,
        props: Vec<Prop>,
    },
    Cancel(AnimationHandle),
    Pause(AnimationHandle),
    Resume(AnimationHandle),
}

impl EngineCall {
    /// Element the call wrote to, if any.
    #[must_use]
    pub fn target(&self) -> Option<&ElementId> {
        match self {
            Self::Animate { target, .. } | Self::Set { target, .. } | Self::Clear { target, .. } => {
                Some(target)
            }
            Self::Cancel(_) | Self::Pause(_) | Self::Resume(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Tween {
    target: ElementId,
    /// Values written on completion; `None` entries are cleared.
    end: Vec<(Prop, Option<PropValue>)>,
    /// Time left including delay; `None` repeats forever.
    remaining: Option<Duration>,
    paused: bool,
}

#[derive(Debug, Default)]
pub struct RecordingEngine {
    styles: BTreeMap<ElementId, BTreeMap<Prop, PropValue>>,
    tweens: BTreeMap<AnimationHandle, Tween>,
    calls: Vec<EngineCall>,
    next_handle: u64,
    completed: u64,
}

impl RecordingEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance tween time by `dt`, completing every tween that runs out.
    pub fn advance(&mut self, dt: Duration) {
        let mut done = Vec::new();
        for (handle, tween) in &mut self.tweens {
            if tween.paused {
                continue;
            }
            if let Some(remaining) = &mut tween.remaining {
                *remaining = remaining.saturating_sub(dt);
                if remaining.is_zero() {
                    done.push(*handle);
                }
            }
        }
        for handle in done {
            if let Some(tween) = self.tweens.remove(&handle) {
                let style = self.styles.entry(tween.target.clone()).or_default();
                for (prop, value) in tween.end {
                    match value {
                        Some(value) => style.insert(prop, value),
                        None => style.remove(&prop),
                    };
                }
                if style.is_empty() {
                    self.styles.remove(&tween.target);
                }
                self.completed += 1;
            }
        }
    }

    /// Current inline value of `prop` on `target`.
    #[must_use]
    pub fn value(&self, target: &str, prop: Prop) -> Option<&PropValue> {
        self.styles.get(&ElementId::new(target))?.get(&prop)
    }

    #[must_use]
    pub fn num(&self, target: &str, prop: Prop) -> Option<f64> {
        self.value(target, prop).and_then(PropValue::as_num)
    }

    #[must_use]
    pub fn keyword(&self, target: &str, prop: Prop) -> Option<&str> {
        self.value(target, prop).and_then(PropValue::as_keyword)
    }

    /// Properties with an inline override on `target`.
    #[must_use]
    pub fn inline_props(&self, target: &str) -> Vec<Prop> {
        self.styles
            .get(&ElementId::new(target))
            .map(|s| s.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Tweens neither completed nor cancelled.
    #[must_use]
    pub fn running(&self) -> usize {
        self.tweens.len()
    }

    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed
    }

    #[must_use]
    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    /// Calls that touched `target`, in order.
    pub fn calls_for<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a EngineCall> + 'a {
        self.calls
            .iter()
            .filter(move |c| c.target().is_some_and(|t| t.as_str() == target))
    }

    pub fn take_calls(&mut self) -> Vec<EngineCall> {
        std::mem::take(&mut self.calls)
    }

    fn write(&mut self, target: &ElementId, props: &Props) {
        let style = self.styles.entry(target.clone()).or_default();
        for (prop, value) in props.iter() {
            style.insert(*prop, value.clone());
        }
    }
}

impl AnimationEngine for RecordingEngine {
    fn animate(
        &mut self,
        target: &ElementId,
        from: Option<&Props>,
        to: &Props,
        timing: &Timing,
    ) -> AnimationHandle {
        let start: Vec<(Prop, Option<PropValue>)> = to
            .keys()
            .map(|prop| {
                let explicit = from.and_then(|f| f.get(prop)).cloned();
                let current = self.value(target.as_str(), prop).cloned();
                (prop, explicit.or(current))
            })
            .collect();
        if let Some(from) = from {
            self.write(target, from);
        }

        // An odd number of yoyo repetitions ends where it started.
        let ends_at_start = timing.yoyo && timing.repeat > 0 && timing.repeat % 2 == 1;
        let end = if ends_at_start {
            start
        } else {
            to.iter().map(|(p, v)| (*p, Some(v.clone()))).collect()
        };

        self.next_handle += 1;
        let handle = AnimationHandle(self.next_handle);
        self.tweens.insert(
            handle,
            Tween {
                target: target.clone(),
                end,
                remaining: timing.total(),
                paused: false,
            },
        );
        self.calls.push(EngineCall::Animate {
            target: target.clone(),
            handle,
            to: to.clone(),
        });
        handle
    }

    fn set(&mut self, target: &ElementId, props: &Props) {
        self.write(target, props);
        self.calls.push(EngineCall::Set {
            target: target.clone(),
            props: props.clone(),
        });
    }

    fn clear(&mut self, target: &ElementId, props: &[Prop]) {
        if let Some(style) = self.styles.get_mut(target) {
            for prop in props {
                style.remove(prop);
            }
            if style.is_empty() {
                self.styles.remove(target);
            }
        }
        self.calls.push(EngineCall::Clear {
            target: target.clone(),
            props: props.to_vec(),
        });
    }

    fn is_active(&self, handle: AnimationHandle) -> bool {
        self.tweens.contains_key(&handle)
    }

    fn is_target_active(&self, target: &ElementId) -> bool {
        self.tweens.values().any(|t| &t.target == target)
    }

    fn cancel(&mut self, handle: AnimationHandle) {
        self.tweens.remove(&handle);
        self.calls.push(EngineCall::Cancel(handle));
    }

    fn pause(&mut self, handle: AnimationHandle) {
        if let Some(tween) = self.tweens.get_mut(&handle) {
            tween.paused = true;
        }
        self.calls.push(EngineCall::Pause(handle));
    }

    fn resume(&mut self, handle: AnimationHandle) {
        if let Some(tween) = self.tweens.get_mut(&handle) {
            tween.paused = false;
        }
        self.calls.push(EngineCall::Resume(handle));
    }
}
