#![forbid(unsafe_code)]

//! Owned registry of in-flight animation handles.
//!
//! Handles are tagged with the owner that started them (a variant name, the
//! ticket machine, the entrance sequence). Teardown of an owner cancels
//! exactly its handles, so no tween started by a torn-down variant keeps
//! running.

use std::borrow::Cow;

use scrollstage_core::host::{AnimationEngine, AnimationHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    owner: Cow<'static, str>,
    handle: AnimationHandle,
}

/// Handles grouped by owner.
#[derive(Debug, Clone, Default)]
pub struct HandleRegistry {
    entries: Vec<Entry>,
    paused: bool,
}

impl HandleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `handle` under `owner`.
    pub fn track(&mut self, owner: impl Into<Cow<'static, str>>, handle: AnimationHandle) {
        self.entries.push(Entry {
            owner: owner.into(),
            handle,
        });
    }

    /// Handles recorded for `owner`, oldest first.
    pub fn handles_of<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = AnimationHandle> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.owner == owner)
            .map(|e| e.handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget handles the engine no longer reports as active.
    ///
    /// Does nothing while paused: a paused tween is inactive but still owned.
    pub fn prune(&mut self, engine: &dyn AnimationEngine) {
        if self.paused {
            return;
        }
        self.entries.retain(|e| engine.is_active(e.handle));
    }

    /// Cancel and forget every handle owned by `owner`. Returns how many.
    pub fn cancel_owned(&mut self, owner: &str, engine: &mut dyn AnimationEngine) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| {
            if e.owner == owner {
                engine.cancel(e.handle);
                false
            } else {
                true
            }
        });
        before - self.entries.len()
    }

    /// Cancel and forget everything.
    pub fn cancel_all(&mut self, engine: &mut dyn AnimationEngine) {
        for entry in self.entries.drain(..) {
            engine.cancel(entry.handle);
        }
    }

    pub fn pause_all(&mut self, engine: &mut dyn AnimationEngine) {
        for entry in &self.entries {
            engine.pause(entry.handle);
        }
        self.paused = true;
    }

    pub fn resume_all(&mut self, engine: &mut dyn AnimationEngine) {
        for entry in &self.entries {
            engine.resume(entry.handle);
        }
        self.paused = false;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
