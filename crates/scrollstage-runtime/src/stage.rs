#![forbid(unsafe_code)]

//! The stage: host collaborators plus everything registered against them.
//!
//! [`Stage`] owns the animation engine, the layout provider, the region
//! engine, pointer listeners and the shared handle registry. Responsive
//! variants receive `&mut Stage` in their setup and teardown, which is all
//! they need to bind regions, attach listeners and release what they own.

use std::borrow::Cow;
use std::time::Duration;

use scrollstage_core::element::ElementId;
use scrollstage_core::error::{ChoreographyError, require};
use scrollstage_core::host::{AnimationEngine, LayoutProvider};
use scrollstage_core::pointer::PointerEvent;

use crate::handles::HandleRegistry;
use crate::listeners::{ListenerId, PointerListeners};
use crate::region::{BindingId, RegionUpdate, ScrollRegion, ScrollRegionEngine, ScrubTween};

/// Borrowed collaborators handed to per-frame and per-event code.
pub struct FrameCx<'a> {
    pub engine: &'a mut dyn AnimationEngine,
    pub layout: &'a dyn LayoutProvider,
    pub handles: &'a mut HandleRegistry,
}

impl<'a> FrameCx<'a> {
    pub fn new(
        engine: &'a mut dyn AnimationEngine,
        layout: &'a dyn LayoutProvider,
        handles: &'a mut HandleRegistry,
    ) -> Self {
        Self {
            engine,
            layout,
            handles,
        }
    }
}

#[derive(Debug)]
pub struct Stage<E, L> {
    engine: E,
    layout: L,
    regions: ScrollRegionEngine,
    listeners: PointerListeners,
    handles: HandleRegistry,
}

impl<E: AnimationEngine, L: LayoutProvider> Stage<E, L> {
    pub fn new(engine: E, layout: L) -> Self {
        Self {
            engine,
            layout,
            regions: ScrollRegionEngine::new(),
            listeners: PointerListeners::new(),
            handles: HandleRegistry::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Mutable layout access for hosts that model the page in memory.
    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    pub fn regions(&self) -> &ScrollRegionEngine {
        &self.regions
    }

    pub fn listeners(&self) -> &PointerListeners {
        &self.listeners
    }

    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    /// Collaborators for a frame or event.
    pub fn cx(&mut self) -> FrameCx<'_> {
        FrameCx::new(&mut self.engine, &self.layout, &mut self.handles)
    }

    pub fn contains(&self, element: &ElementId) -> bool {
        self.layout.contains(element)
    }

    pub fn bind_region(
        &mut self,
        label: impl Into<Cow<'static, str>>,
        region: ScrollRegion,
        tween: Option<ScrubTween>,
    ) -> Result<BindingId, ChoreographyError> {
        self.regions.bind_checked(label, region, tween, &self.layout)
    }

    pub fn remove_region(&mut self, id: BindingId) -> bool {
        self.regions.remove(id, &mut self.engine)
    }

    /// Attach a pointer listener after checking its area exists.
    pub fn listen(
        &mut self,
        owner: impl Into<Cow<'static, str>>,
        area: Option<ElementId>,
        handler: impl FnMut(&PointerEvent, &mut FrameCx<'_>) + 'static,
    ) -> Result<ListenerId, ChoreographyError> {
        if let Some(area) = &area {
            require(area, self.layout.contains(area))?;
        }
        Ok(self.listeners.register(owner, area, handler))
    }

    /// Detach `owner`'s listeners and cancel its in-flight tweens.
    pub fn release_owner(&mut self, owner: &str) {
        let listeners = self.listeners.remove_owned(owner);
        let handles = self.handles.cancel_owned(owner, &mut self.engine);
        tracing::debug!(owner, listeners, handles, "owner released");
    }

    /// Forget tracked tweens that have finished.
    pub fn prune_handles(&mut self) {
        self.handles.prune(&self.engine);
    }

    /// Drive every region binding.
    pub fn frame(&mut self, dt: Duration) -> Vec<RegionUpdate> {
        self.prune_handles();
        let mut cx = FrameCx::new(&mut self.engine, &self.layout, &mut self.handles);
        self.regions.frame(dt, &mut cx)
    }

    pub fn refresh(&mut self) {
        self.regions.refresh();
    }

    #[must_use]
    pub fn needs_frame(&self) -> bool {
        self.regions.needs_frame()
    }

    pub fn dispatch_pointer(&mut self, event: &PointerEvent) {
        self.prune_handles();
        let mut cx = FrameCx::new(&mut self.engine, &self.layout, &mut self.handles);
        self.listeners.dispatch(event, &mut cx);
    }

    /// Remove every binding, listener and tracked tween.
    pub fn clear(&mut self) {
        self.regions.clear(&mut self.engine);
        self.listeners = PointerListeners::new();
        self.handles.cancel_all(&mut self.engine);
    }
}
