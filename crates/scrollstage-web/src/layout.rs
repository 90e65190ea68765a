#![forbid(unsafe_code)]

//! Static in-memory page layout.

use std::collections::HashMap;

use scrollstage_core::element::ElementId;
use scrollstage_core::geometry::{Axis, BoxRect, Size};
use scrollstage_core::host::LayoutProvider;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Placement {
    /// Box in document coordinates; moves with scroll.
    Document(BoxRect),
    /// Box in viewport coordinates (`position: fixed`).
    Fixed(BoxRect),
}

/// Layout of a page whose boxes never reflow.
///
/// Transforms written by the engine do not feed back into layout boxes,
/// matching `getBoundingClientRect` on untransformed layout.
#[derive(Debug, Clone)]
pub struct StaticLayout {
    viewport: Size,
    scroll: f64,
    elements: HashMap<ElementId, Placement>,
    scroll_widths: HashMap<ElementId, f64>,
}

impl StaticLayout {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            viewport: Size::new(width, height),
            scroll: 0.0,
            elements: HashMap::new(),
            scroll_widths: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_element(mut self, id: impl Into<ElementId>, rect: BoxRect) -> Self {
        self.elements.insert(id.into(), Placement::Document(rect));
        self
    }

    #[must_use]
    pub fn with_fixed(mut self, id: impl Into<ElementId>, rect: BoxRect) -> Self {
        self.elements.insert(id.into(), Placement::Fixed(rect));
        self
    }

    /// Horizontal content extent wider than the element's own box.
    #[must_use]
    pub fn with_scroll_width(mut self, id: impl Into<ElementId>, width: f64) -> Self {
        self.scroll_widths.insert(id.into(), width);
        self
    }

    /// Take `id` out of the document.
    pub fn remove(&mut self, id: &str) -> bool {
        let id = ElementId::new(id);
        self.scroll_widths.remove(&id);
        self.elements.remove(&id).is_some()
    }

    /// Scroll to `y`, clamped to the scrollable range.
    pub fn set_scroll(&mut self, y: f64) {
        self.scroll = if y.is_finite() {
            y.clamp(0.0, self.max_scroll())
        } else {
            0.0
        };
    }

    /// Resize the viewport, re-clamping the scroll position.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width, height);
        self.set_scroll(self.scroll);
    }

    #[must_use]
    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    /// Bottom edge of the lowest document-flow element.
    #[must_use]
    pub fn document_height(&self) -> f64 {
        self.elements
            .values()
            .filter_map(|p| match p {
                Placement::Document(rect) => Some(rect.bottom()),
                Placement::Fixed(_) => None,
            })
            .fold(self.viewport.height, f64::max)
    }

    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        (self.document_height() - self.viewport.height).max(0.0)
    }
}

impl LayoutProvider for StaticLayout {
    fn bounding_box(&self, element: &ElementId) -> Option<BoxRect> {
        match self.elements.get(element)? {
            Placement::Document(rect) => Some(rect.offset_y(-self.scroll)),
            Placement::Fixed(rect) => Some(*rect),
        }
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn scroll_position(&self) -> f64 {
        self.scroll
    }

    fn content_extent(&self, element: &ElementId, axis: Axis) -> Option<f64> {
        let rect = match self.elements.get(element)? {
            Placement::Document(rect) | Placement::Fixed(rect) => rect,
        };
        Some(match axis {
            Axis::Horizontal => self.scroll_widths.get(element).copied().unwrap_or(rect.width),
            Axis::Vertical => rect.height,
        })
    }
}
