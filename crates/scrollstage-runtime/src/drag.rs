#![forbid(unsafe_code)]

//! Pointer drag of the peek badge.
//!
//! # Invariants
//!
//! 1. A gesture is `Down` on the badge, zero or more `Move`, then `Up` or
//!    `Cancel`. Only the pointer that pressed can move or end it.
//! 2. While a gesture is active the controller is the only writer of the
//!    badge's `X`/`Y`.
//! 3. Ending a gesture, by any path, restores non-drag styling.
//! 4. Disabling the controller ends an active gesture first.
//!
//! ## Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | Badge not in the document | Missing element | Presses ignored |
//! | Second pointer presses mid-drag | Multi-touch | Ignored |
//! | Pointer leaves the page mid-drag | Host reports `Cancel` | Gesture committed |

use scrollstage_core::element::{ElementId, Prop, Props};
use scrollstage_core::geometry::Point;
use scrollstage_core::host::{AnimationEngine, LayoutProvider};
use scrollstage_core::pointer::{PointerEvent, PointerEventKind, PointerId};

/// Styling applied while lifted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConfig {
    pub lift_scale: f64,
    pub z_index: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            lift_scale: 1.08,
            z_index: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Gesture {
    pointer: PointerId,
    origin: Point,
    committed: Point,
}

/// Result of feeding one event to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    Ignored,
    Started,
    Moved(Point),
    Released(Point),
}

impl DragOutcome {
    /// Whether the event belonged to a drag gesture.
    #[must_use]
    pub fn consumed(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

#[derive(Debug, Clone)]
pub struct PointerDrag {
    target: ElementId,
    config: DragConfig,
    enabled: bool,
    offset: Point,
    gesture: Option<Gesture>,
}

impl PointerDrag {
    #[must_use]
    pub fn new(target: impl Into<ElementId>, config: DragConfig) -> Self {
        Self {
            target: target.into(),
            config,
            enabled: true,
            offset: Point::default(),
            gesture: None,
        }
    }

    #[must_use]
    pub fn target(&self) -> &ElementId {
        &self.target
    }

    /// Committed translation of the badge.
    #[must_use]
    pub fn offset(&self) -> Point {
        self.offset
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn handle(
        &mut self,
        event: &PointerEvent,
        engine: &mut dyn AnimationEngine,
        layout: &dyn LayoutProvider,
    ) -> DragOutcome {
        match (event.kind, self.gesture) {
            (PointerEventKind::Down, None) if self.enabled => {
                let hit = layout.bounding_box(&self.target).is_some_and(|b| {
                    b.contains(Point::new(
                        event.position.x - self.offset.x,
                        event.position.y - self.offset.y,
                    ))
                });
                if !hit {
                    return DragOutcome::Ignored;
                }
                self.gesture = Some(Gesture {
                    pointer: event.id,
                    origin: event.position,
                    committed: self.offset,
                });
                engine.set(
                    &self.target,
                    &Props::new()
                        .with(Prop::Scale, self.config.lift_scale)
                        .with(Prop::Cursor, "grabbing")
                        .with(Prop::ZIndex, self.config.z_index),
                );
                tracing::trace!(pointer = event.id.0, "drag started");
                DragOutcome::Started
            }
            (PointerEventKind::Move, Some(g)) if g.pointer == event.id => {
                let next = Point::new(
                    g.committed.x + event.position.x - g.origin.x,
                    g.committed.y + event.position.y - g.origin.y,
                );
                self.offset = next;
                engine.set(
                    &self.target,
                    &Props::new().with(Prop::X, next.x).with(Prop::Y, next.y),
                );
                DragOutcome::Moved(next)
            }
            (PointerEventKind::Up | PointerEventKind::Cancel, Some(g)) if g.pointer == event.id => {
                self.release(engine);
                DragOutcome::Released(self.offset)
            }
            _ => DragOutcome::Ignored,
        }
    }

    /// Enable or disable dragging. Disabling ends an active gesture.
    pub fn set_enabled(&mut self, enabled: bool, engine: &mut dyn AnimationEngine) {
        if !enabled && self.gesture.is_some() {
            self.release(engine);
        }
        self.enabled = enabled;
    }

    /// Forget the committed offset and clear every style the drag wrote.
    pub fn reset(&mut self, engine: &mut dyn AnimationEngine) {
        self.gesture = None;
        self.offset = Point::default();
        engine.clear(
            &self.target,
            &[Prop::X, Prop::Y, Prop::Scale, Prop::Cursor, Prop::ZIndex],
        );
    }

    fn release(&mut self, engine: &mut dyn AnimationEngine) {
        self.gesture = None;
        engine.set(
            &self.target,
            &Props::new().with(Prop::Scale, 1.0).with(Prop::Cursor, "grab"),
        );
        engine.clear(&self.target, &[Prop::ZIndex]);
        tracing::trace!(x = self.offset.x, y = self.offset.y, "drag ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{FakeEngine, FakeLayout};

    fn setup() -> (PointerDrag, FakeEngine, FakeLayout) {
        (
            PointerDrag::new("#peek", DragConfig::default()),
            FakeEngine::default(),
            FakeLayout::new(1280.0, 800.0).with_box("#peek", 700.0, 1100.0, 120.0, 60.0),
        )
    }

    #[test]
    fn drag_moves_and_restores_styling() {
        let (mut drag, mut engine, layout) = setup();
        assert_eq!(
            drag.handle(&PointerEvent::down(1, 1150.0, 720.0), &mut engine, &layout),
            DragOutcome::Started
        );
        assert_eq!(engine.num("#peek", Prop::Scale), Some(1.08));
        assert_eq!(engine.keyword("#peek", Prop::Cursor).as_deref(), Some("grabbing"));

        drag.handle(&PointerEvent::moved(1, 1100.0, 650.0), &mut engine, &layout);
        assert_eq!(engine.num("#peek", Prop::X), Some(-50.0));
        assert_eq!(engine.num("#peek", Prop::Y), Some(-70.0));

        let out = drag.handle(&PointerEvent::up(1, 1100.0, 650.0), &mut engine, &layout);
        assert_eq!(out, DragOutcome::Released(Point::new(-50.0, -70.0)));
        assert_eq!(engine.num("#peek", Prop::Scale), Some(1.0));
        assert_eq!(engine.keyword("#peek", Prop::Cursor).as_deref(), Some("grab"));
        assert_eq!(engine.num("#peek", Prop::ZIndex), None);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn second_gesture_starts_from_committed_offset() {
        let (mut drag, mut engine, layout) = setup();
        drag.handle(&PointerEvent::down(1, 1150.0, 720.0), &mut engine, &layout);
        drag.handle(&PointerEvent::moved(1, 1050.0, 720.0), &mut engine, &layout);
        drag.handle(&PointerEvent::up(1, 1050.0, 720.0), &mut engine, &layout);

        // The badge now sits 100px left; pressing where it is starts a drag.
        assert!(drag.handle(&PointerEvent::down(2, 1010.0, 720.0), &mut engine, &layout).consumed());
        drag.handle(&PointerEvent::moved(2, 1010.0, 700.0), &mut engine, &layout);
        assert_eq!(drag.offset(), Point::new(-100.0, -20.0));
    }

    #[test]
    fn foreign_pointer_is_ignored() {
        let (mut drag, mut engine, layout) = setup();
        drag.handle(&PointerEvent::down(1, 1150.0, 720.0), &mut engine, &layout);
        assert_eq!(
            drag.handle(&PointerEvent::moved(7, 0.0, 0.0), &mut engine, &layout),
            DragOutcome::Ignored
        );
        assert_eq!(
            drag.handle(&PointerEvent::up(7, 0.0, 0.0), &mut engine, &layout),
            DragOutcome::Ignored
        );
        assert!(drag.is_dragging());
    }

    #[test]
    fn disabling_force_releases() {
        let (mut drag, mut engine, layout) = setup();
        drag.handle(&PointerEvent::down(1, 1150.0, 720.0), &mut engine, &layout);
        drag.set_enabled(false, &mut engine);
        assert!(!drag.is_dragging());
        assert_eq!(engine.num("#peek", Prop::Scale), Some(1.0));
        assert_eq!(
            drag.handle(&PointerEvent::down(1, 1150.0, 720.0), &mut engine, &layout),
            DragOutcome::Ignored
        );
    }

    #[test]
    fn missing_badge_ignores_presses() {
        let mut drag = PointerDrag::new("#peek", DragConfig::default());
        let mut engine = FakeEngine::default();
        let layout = FakeLayout::new(1280.0, 800.0);
        assert_eq!(
            drag.handle(&PointerEvent::down(1, 10.0, 10.0), &mut engine, &layout),
            DragOutcome::Ignored
        );
        assert!(engine.calls.is_empty());
    }
}
