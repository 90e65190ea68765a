#![forbid(unsafe_code)]

//! Pointer input as delivered by the host.

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
    /// The pointer left the listening element.
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub i32);

/// A pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub id: PointerId,
    pub position: Point,
}

impl PointerEvent {
    #[must_use]
    pub const fn new(kind: PointerEventKind, id: i32, x: f64, y: f64) -> Self {
        Self {
            kind,
            id: PointerId(id),
            position: Point::new(x, y),
        }
    }

    #[must_use]
    pub const fn down(id: i32, x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Down, id, x, y)
    }

    #[must_use]
    pub const fn moved(id: i32, x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Move, id, x, y)
    }

    #[must_use]
    pub const fn up(id: i32, x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up, id, x, y)
    }

    #[must_use]
    pub const fn cancel(id: i32) -> Self {
        Self::new(PointerEventKind::Cancel, id, 0.0, 0.0)
    }

    #[must_use]
    pub const fn leave(id: i32) -> Self {
        Self::new(PointerEventKind::Leave, id, 0.0, 0.0)
    }

    /// Whether this event ends a press gesture.
    #[must_use]
    pub const fn ends_gesture(&self) -> bool {
        matches!(self.kind, PointerEventKind::Up | PointerEventKind::Cancel)
    }
}
