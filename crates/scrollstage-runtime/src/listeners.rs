#![forbid(unsafe_code)]

//! Owner-tagged pointer listeners.
//!
//! A listener may be scoped to an element's box: it then only receives
//! events that land inside the box, plus a synthesized `Leave` when the
//! pointer moves out (or the host reports the pointer leaving the page).
//! Removing an owner's listeners is how a responsive variant detaches its
//! pointer handling on teardown.

use std::borrow::Cow;
use std::fmt;

use scrollstage_core::element::ElementId;
use scrollstage_core::pointer::{PointerEvent, PointerEventKind};

use crate::stage::FrameCx;

/// Callback invoked for delivered pointer events.
pub type PointerHandler = Box<dyn FnMut(&PointerEvent, &mut FrameCx<'_>)>;

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    owner: Cow<'static, str>,
    area: Option<ElementId>,
    inside: bool,
    handler: PointerHandler,
}

/// Registered pointer listeners in registration order.
#[derive(Default)]
pub struct PointerListeners {
    listeners: Vec<Listener>,
    next_id: u64,
}

impl fmt::Debug for PointerListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerListeners")
            .field(
                "owners",
                &self.listeners.iter().map(|l| &l.owner).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl PointerListeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `owner`, optionally scoped to `area`.
    pub fn register(
        &mut self,
        owner: impl Into<Cow<'static, str>>,
        area: Option<ElementId>,
        handler: impl FnMut(&PointerEvent, &mut FrameCx<'_>) + 'static,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push(Listener {
            id,
            owner: owner.into(),
            area,
            inside: false,
            handler: Box::new(handler),
        });
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        before != self.listeners.len()
    }

    /// Remove every listener registered by `owner`. Returns how many.
    pub fn remove_owned(&mut self, owner: &str) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.owner != owner);
        before - self.listeners.len()
    }

    #[must_use]
    pub fn owned_by(&self, owner: &str) -> usize {
        self.listeners.iter().filter(|l| l.owner == owner).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every interested listener.
    pub fn dispatch(&mut self, event: &PointerEvent, cx: &mut FrameCx<'_>) {
        for listener in &mut self.listeners {
            let Some(area) = &listener.area else {
                (listener.handler)(event, cx);
                continue;
            };
            let inside = event.kind != PointerEventKind::Leave
                && cx
                    .layout
                    .bounding_box(area)
                    .is_some_and(|b| b.contains(event.position));
            if inside {
                listener.inside = true;
                (listener.handler)(event, cx);
            } else if listener.inside {
                listener.inside = false;
                let leave = PointerEvent::new(
                    PointerEventKind::Leave,
                    event.id.0,
                    event.position.x,
                    event.position.y,
                );
                (listener.handler)(&leave, cx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::handles::HandleRegistry;
    use crate::testkit::{FakeEngine, FakeLayout};

    fn recorder(listeners: &mut PointerListeners, owner: &'static str, area: Option<&'static str>) -> Rc<RefCell<Vec<PointerEventKind>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        listeners.register(owner, area.map(ElementId::from_static), move |e: &PointerEvent, _cx: &mut FrameCx<'_>| {
            sink.borrow_mut().push(e.kind);
        });
        seen
    }

    #[test]
    fn scoped_listener_gets_synthesized_leave() {
        let mut engine = FakeEngine::default();
        let layout = FakeLayout::new(1280.0, 800.0).with_box("#hero", 0.0, 0.0, 1280.0, 400.0);
        let mut handles = HandleRegistry::new();
        let mut cx = FrameCx::new(&mut engine, &layout, &mut handles);

        let mut listeners = PointerListeners::new();
        let seen = recorder(&mut listeners, "desktop", Some("#hero"));

        listeners.dispatch(&PointerEvent::moved(1, 10.0, 10.0), &mut cx);
        listeners.dispatch(&PointerEvent::moved(1, 10.0, 500.0), &mut cx);
        listeners.dispatch(&PointerEvent::moved(1, 10.0, 600.0), &mut cx);
        assert_eq!(
            *seen.borrow(),
            vec![PointerEventKind::Move, PointerEventKind::Leave]
        );
    }

    #[test]
    fn remove_owned_only_detaches_that_owner() {
        let mut engine = FakeEngine::default();
        let layout = FakeLayout::new(1280.0, 800.0);
        let mut handles = HandleRegistry::new();
        let mut cx = FrameCx::new(&mut engine, &layout, &mut handles);

        let mut listeners = PointerListeners::new();
        let a = recorder(&mut listeners, "a", None);
        let b = recorder(&mut listeners, "b", None);
        assert_eq!(listeners.remove_owned("a"), 1);

        listeners.dispatch(&PointerEvent::down(1, 0.0, 0.0), &mut cx);
        assert!(a.borrow().is_empty());
        assert_eq!(b.borrow().len(), 1);
        assert_eq!(listeners.owned_by("b"), 1);
    }
}
