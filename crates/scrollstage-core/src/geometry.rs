#![forbid(unsafe_code)]

//! Geometric primitives and the viewport geometry tracker.
//!
//! Coordinates are CSS pixels as `f64`. Boxes from the layout provider are
//! viewport-relative; document positions are obtained by adding the current
//! scroll offset.

use crate::element::ElementId;
use crate::host::LayoutProvider;

/// A point in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other` at `t` (unclamped).
    #[inline]
    #[must_use]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Extent along `axis`.
    #[inline]
    #[must_use]
    pub const fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// An element's untransformed layout box relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl BoxRect {
    #[inline]
    #[must_use]
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Whether `p` lies inside the box.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right() && p.y >= self.top && p.y < self.bottom()
    }

    /// Position of `p` normalized to `[-0.5, 0.5]` on both axes around the center.
    ///
    /// Degenerate boxes yield the origin.
    #[must_use]
    pub fn normalized(&self, p: Point) -> Point {
        let nx = if self.width > 0.0 {
            (p.x - self.left) / self.width - 0.5
        } else {
            0.0
        };
        let ny = if self.height > 0.0 {
            (p.y - self.top) / self.height - 0.5
        } else {
            0.0
        };
        Point::new(nx.clamp(-0.5, 0.5), ny.clamp(-0.5, 0.5))
    }

    /// The same box shifted vertically by `dy`.
    #[inline]
    #[must_use]
    pub fn offset_y(&self, dy: f64) -> BoxRect {
        BoxRect::new(self.top + dy, self.left, self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// Viewport geometry tracker
// ---------------------------------------------------------------------------

/// Scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

/// How much of the viewport is subtracted from the content extent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Reduction {
    /// Subtract `viewport × k`.
    Fraction(f64),
    /// Subtract `viewport − margin`.
    Margin(f64),
}

impl Default for Reduction {
    fn default() -> Self {
        Self::Fraction(1.0)
    }
}

/// `max(0, content − visible)` where `visible` is the reduced viewport extent.
///
/// Content smaller than the visible extent yields exactly `0.0`; non-finite
/// inputs also yield `0.0`.
#[must_use]
pub fn scrub_distance(content: f64, viewport: f64, reduction: Reduction) -> f64 {
    let visible = match reduction {
        Reduction::Fraction(k) => viewport * k,
        Reduction::Margin(margin) => viewport - margin,
    };
    let distance = content - visible;
    if distance.is_finite() && distance > 0.0 {
        distance
    } else {
        0.0
    }
}

/// Computes "how far must we scrub" for a content element on demand.
///
/// Holds no measurements: every call to [`distance`](Self::distance) reads
/// the layout provider again, so resizes, font loads and inserted content
/// can never leave a stale value behind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportGeometry {
    pub content: ElementId,
    pub axis: Axis,
    pub reduction: Reduction,
}

impl ViewportGeometry {
    /// Horizontal tracker subtracting the full viewport width.
    #[must_use]
    pub fn new(content: impl Into<ElementId>) -> Self {
        Self {
            content: content.into(),
            axis: Axis::Horizontal,
            reduction: Reduction::default(),
        }
    }

    #[must_use]
    pub fn axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub fn reduction(mut self, reduction: Reduction) -> Self {
        self.reduction = reduction;
        self
    }

    /// Current scrub distance. A missing content element yields `0.0`.
    #[must_use]
    pub fn distance(&self, layout: &dyn LayoutProvider) -> f64 {
        let Some(content) = layout.content_extent(&self.content, self.axis) else {
            crate::trace!(element = %self.content, "scrub content missing");
            return 0.0;
        };
        let viewport = layout.viewport_size().along(self.axis);
        scrub_distance(content, viewport, self.reduction)
    }
}
