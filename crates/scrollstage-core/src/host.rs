#![forbid(unsafe_code)]

//! Host collaborators: the animation engine and the layout provider.
//!
//! The choreography never interpolates or measures by itself. Everything that
//! touches the page goes through these two traits, which an embedder
//! implements over the real DOM and tests implement in memory.

use crate::element::{ElementId, Prop, Props, Timing};
use crate::geometry::{Axis, BoxRect, Size};

/// Handle to a tween started with [`AnimationEngine::animate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationHandle(pub u64);

/// Tween/style engine.
///
/// `set` is immediate and does not interpolate. `clear` removes inline
/// overrides so the element falls back to its stylesheet layout.
pub trait AnimationEngine {
    /// Start a time-based tween towards `to`, optionally from explicit values.
    fn animate(
        &mut self,
        target: &ElementId,
        from: Option<&Props>,
        to: &Props,
        timing: &Timing,
    ) -> AnimationHandle;

    /// Apply values immediately.
    fn set(&mut self, target: &ElementId, props: &Props);

    /// Remove inline overrides for `props`.
    fn clear(&mut self, target: &ElementId, props: &[Prop]);

    /// Whether the tween behind `handle` is still running.
    fn is_active(&self, handle: AnimationHandle) -> bool;

    /// Whether any tween is currently running on `target`.
    fn is_target_active(&self, target: &ElementId) -> bool;

    /// Stop a tween where it is. Unknown handles are ignored.
    fn cancel(&mut self, handle: AnimationHandle);

    fn pause(&mut self, handle: AnimationHandle);

    fn resume(&mut self, handle: AnimationHandle);
}

/// Read-only layout queries.
pub trait LayoutProvider {
    /// Untransformed layout box relative to the viewport, or `None` when the
    /// element is not in the document.
    fn bounding_box(&self, element: &ElementId) -> Option<BoxRect>;

    fn viewport_size(&self) -> Size;

    /// Vertical document scroll offset.
    fn scroll_position(&self) -> f64;

    /// Scrollable content extent of `element` along `axis` (`scrollWidth`).
    fn content_extent(&self, element: &ElementId, axis: Axis) -> Option<f64>;

    /// Whether `element` exists.
    fn contains(&self, element: &ElementId) -> bool {
        self.bounding_box(element).is_some()
    }

    /// Layout box in document coordinates (scroll added back in).
    fn document_box(&self, element: &ElementId) -> Option<BoxRect> {
        let scroll = self.scroll_position();
        self.bounding_box(element).map(|b| b.offset_y(scroll))
    }
}
