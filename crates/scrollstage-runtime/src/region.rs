#![forbid(unsafe_code)]

//! Scroll-bound region engine.
//!
//! A [`ScrollRegion`] maps a window of document scroll positions to a
//! normalized progress in `[0, 1]`. Bindings attach an optional
//! [`ScrubTween`] driven by that progress, an optional pin, and crossing
//! detection. Bounds are resolved from the layout provider on every frame,
//! so resizes and content changes never leave stale numbers behind.
//!
//! # Invariants
//!
//! 1. Progress is `clamp((scroll − start) / (end − start), 0, 1)`.
//! 2. A zero-length region reports `0` before its start and `1` from it on.
//! 3. An end that resolves before its start is clamped to the start and
//!    logged once.
//! 4. Pin offset is `clamp(scroll − start, 0, end − start)`, so the pinned
//!    element is held while inside and released at the boundary.
//! 5. Removing a binding affects no other binding, even one sharing its
//!    trigger element.

use std::borrow::Cow;
use std::time::Duration;

use scrollstage_core::animation::{Lag, clamp_progress};
use scrollstage_core::crossing::{Crossing, CrossingDetector, Side};
use scrollstage_core::element::{ElementId, Prop, Props};
use scrollstage_core::error::{ChoreographyError, require};
use scrollstage_core::geometry::ViewportGeometry;
use scrollstage_core::host::{AnimationEngine, LayoutProvider};

use crate::stage::FrameCx;

// ---------------------------------------------------------------------------
// Region description
// ---------------------------------------------------------------------------

/// "Element edge meets viewport line": the document scroll position at which
/// the point `element_anchor` (fraction of the element's height) lines up
/// with `viewport_anchor` (fraction of the viewport height).
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub element: ElementId,
    pub element_anchor: f64,
    pub viewport_anchor: f64,
}

impl Anchor {
    #[must_use]
    pub fn new(element: impl Into<ElementId>, element_anchor: f64, viewport_anchor: f64) -> Self {
        Self {
            element: element.into(),
            element_anchor,
            viewport_anchor,
        }
    }

    /// `"top top"`.
    #[must_use]
    pub fn top_top(element: impl Into<ElementId>) -> Self {
        Self::new(element, 0.0, 0.0)
    }

    /// `"bottom top"`.
    #[must_use]
    pub fn bottom_top(element: impl Into<ElementId>) -> Self {
        Self::new(element, 1.0, 0.0)
    }

    /// `"bottom bottom"`.
    #[must_use]
    pub fn bottom_bottom(element: impl Into<ElementId>) -> Self {
        Self::new(element, 1.0, 1.0)
    }

    /// Document scroll position of this anchor, `None` if the element is gone.
    #[must_use]
    pub fn resolve(&self, layout: &dyn LayoutProvider) -> Option<f64> {
        let b = layout.document_box(&self.element)?;
        let viewport = layout.viewport_size().height;
        Some(b.top + b.height * self.element_anchor - viewport * self.viewport_anchor)
    }
}

/// Region length measured from its start.
#[derive(Debug, Clone, PartialEq)]
pub enum Extent {
    Pixels(f64),
    /// Multiples of the viewport height (`"+=300%"` is `ViewportHeights(3.0)`).
    ViewportHeights(f64),
    /// Whatever a geometry tracker reports at frame time.
    Distance(ViewportGeometry),
}

impl Extent {
    #[must_use]
    pub fn resolve(&self, layout: &dyn LayoutProvider) -> f64 {
        match self {
            Self::Pixels(px) => *px,
            Self::ViewportHeights(k) => layout.viewport_size().height * k,
            Self::Distance(geometry) => geometry.distance(layout),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegionEnd {
    Anchor(Anchor),
    Extent(Extent),
}

/// How a binding's tween follows progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scrub {
    /// Progress and crossings are reported; no tween is driven.
    None,
    /// Tween follows progress exactly.
    #[default]
    Instant,
    /// Tween follows a lagged copy of progress.
    Smoothed(Duration),
}

/// A scroll-bound region.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollRegion {
    pub start: Anchor,
    pub end: RegionEnd,
    /// Element held in place while the region is active.
    pub pin: Option<ElementId>,
    pub scrub: Scrub,
}

impl ScrollRegion {
    #[must_use]
    pub fn new(start: Anchor, end: RegionEnd) -> Self {
        Self {
            start,
            end,
            pin: None,
            scrub: Scrub::Instant,
        }
    }

    /// Region between two anchors.
    #[must_use]
    pub fn between(start: Anchor, end: Anchor) -> Self {
        Self::new(start, RegionEnd::Anchor(end))
    }

    /// Region of `extent` beyond `start`.
    #[must_use]
    pub fn spanning(start: Anchor, extent: Extent) -> Self {
        Self::new(start, RegionEnd::Extent(extent))
    }

    /// Pin the start anchor's element.
    #[must_use]
    pub fn pinned(mut self) -> Self {
        self.pin = Some(self.start.element.clone());
        self
    }

    #[must_use]
    pub fn scrub(mut self, scrub: Scrub) -> Self {
        self.scrub = scrub;
        self
    }

    /// Every element the region reads.
    pub fn elements(&self) -> impl Iterator<Item = &ElementId> {
        let end = match &self.end {
            RegionEnd::Anchor(anchor) => Some(&anchor.element),
            RegionEnd::Extent(Extent::Distance(geometry)) => Some(&geometry.content),
            RegionEnd::Extent(_) => None,
        };
        std::iter::once(&self.start.element)
            .chain(end)
            .chain(self.pin.as_ref())
    }

    /// Raw `(start, end)` document positions, unclamped.
    pub fn endpoints(&self, layout: &dyn LayoutProvider) -> Result<(f64, f64), ChoreographyError> {
        let start = self
            .start
            .resolve(layout)
            .ok_or_else(|| ChoreographyError::MissingElement(self.start.element.clone()))?;
        let end = match &self.end {
            RegionEnd::Anchor(anchor) => anchor
                .resolve(layout)
                .ok_or_else(|| ChoreographyError::MissingElement(anchor.element.clone()))?,
            RegionEnd::Extent(extent) => start + extent.resolve(layout),
        };
        Ok((start, end))
    }

    /// Resolved bounds with an inverted end clamped to the start.
    pub fn resolve(&self, layout: &dyn LayoutProvider) -> Result<RegionBounds, ChoreographyError> {
        let (start, end) = self.endpoints(layout)?;
        Ok(RegionBounds::new(start, end))
    }
}

/// Resolved document positions of a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBounds {
    pub start: f64,
    pub end: f64,
}

impl RegionBounds {
    /// Bounds with `end` clamped to at least `start`.
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Normalized progress of `scroll`.
    #[must_use]
    pub fn progress(&self, scroll: f64) -> f64 {
        let length = self.length();
        if length <= 0.0 {
            return if scroll >= self.start { 1.0 } else { 0.0 };
        }
        clamp_progress((scroll - self.start) / length)
    }

    #[must_use]
    pub fn side(&self, scroll: f64) -> Side {
        Side::of(scroll, self.start, self.end)
    }

    /// Translation holding a pinned element in place.
    #[must_use]
    pub fn pin_offset(&self, scroll: f64) -> f64 {
        (scroll - self.start).clamp(0.0, self.length())
    }
}

// ---------------------------------------------------------------------------
// Scrub tweens
// ---------------------------------------------------------------------------

/// End value of a scrubbed property.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackEnd {
    Fixed(f64),
    /// `scale × distance`, read from the layout at frame time.
    Distance { geometry: ViewportGeometry, scale: f64 },
}

impl TrackEnd {
    fn resolve(&self, layout: &dyn LayoutProvider) -> f64 {
        match self {
            Self::Fixed(v) => *v,
            Self::Distance { geometry, scale } => geometry.distance(layout) * scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropTrack {
    pub prop: Prop,
    pub from: f64,
    pub to: TrackEnd,
}

/// Linear from→to interpolation of numeric props, applied with `set`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrubTween {
    pub target: ElementId,
    pub tracks: Vec<PropTrack>,
}

impl ScrubTween {
    #[must_use]
    pub fn new(target: impl Into<ElementId>) -> Self {
        Self {
            target: target.into(),
            tracks: Vec::new(),
        }
    }

    #[must_use]
    pub fn fixed(mut self, prop: Prop, from: f64, to: f64) -> Self {
        self.tracks.push(PropTrack {
            prop,
            from,
            to: TrackEnd::Fixed(to),
        });
        self
    }

    /// Track ending at `scale × geometry.distance()`.
    #[must_use]
    pub fn distance(mut self, prop: Prop, from: f64, geometry: ViewportGeometry, scale: f64) -> Self {
        self.tracks.push(PropTrack {
            prop,
            from,
            to: TrackEnd::Distance { geometry, scale },
        });
        self
    }

    pub fn props(&self) -> impl Iterator<Item = Prop> + '_ {
        self.tracks.iter().map(|t| t.prop)
    }

    /// Values at `progress`.
    #[must_use]
    pub fn sample(&self, progress: f64, layout: &dyn LayoutProvider) -> Props {
        let p = clamp_progress(progress);
        self.tracks
            .iter()
            .map(|t| {
                let to = t.to.resolve(layout);
                (t.prop, (t.from + (to - t.from) * p).into())
            })
            .collect()
    }

    pub fn apply(&self, progress: f64, engine: &mut dyn AnimationEngine, layout: &dyn LayoutProvider) {
        let props = self.sample(progress, layout);
        engine.set(&self.target, &props);
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Identifies a binding inside a [`ScrollRegionEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl BindingId {
    #[cfg(test)]
    pub(crate) const fn for_tests(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinPhase {
    Before,
    Pinned,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinState {
    pub phase: PinPhase,
    pub offset: f64,
}

/// What a binding observed on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionUpdate {
    pub id: BindingId,
    /// Exact progress from the scroll position.
    pub raw: f64,
    /// Progress that drove the tween (lagged when smoothed).
    pub progress: f64,
    /// Crossings since the previous frame, in scroll order.
    pub crossings: Vec<Crossing>,
    pub pin: Option<PinState>,
    pub bounds: RegionBounds,
}

#[derive(Debug)]
struct Binding {
    id: BindingId,
    label: Cow<'static, str>,
    region: ScrollRegion,
    tween: Option<ScrubTween>,
    detector: CrossingDetector,
    lag: Option<Lag>,
    last_progress: Option<f64>,
    last_pin: Option<f64>,
    settling: bool,
    dirty: bool,
    fault: Option<ChoreographyError>,
}

impl Binding {
    fn note_fault(&mut self, fault: Option<ChoreographyError>) {
        if fault == self.fault {
            return;
        }
        match &fault {
            Some(err @ ChoreographyError::InvalidRegion { .. }) => {
                tracing::warn!(binding = %self.label, error = %err, "region end clamped to start");
            }
            Some(err) => {
                tracing::debug!(binding = %self.label, error = %err, "region skipped");
            }
            None => {}
        }
        self.fault = fault;
    }
}

/// Owns every scroll binding on the page.
#[derive(Debug, Default)]
pub struct ScrollRegionEngine {
    bindings: Vec<Binding>,
    next_id: u64,
}

impl ScrollRegionEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `region` without checking that its elements exist.
    pub fn bind(
        &mut self,
        label: impl Into<Cow<'static, str>>,
        region: ScrollRegion,
        tween: Option<ScrubTween>,
    ) -> BindingId {
        self.next_id += 1;
        let id = BindingId(self.next_id);
        let lag = match region.scrub {
            Scrub::Smoothed(lag) => Some(Lag::new(lag)),
            Scrub::None | Scrub::Instant => None,
        };
        let label = label.into();
        tracing::debug!(binding = %label, id = id.0, "region bound");
        self.bindings.push(Binding {
            id,
            label,
            region,
            tween,
            detector: CrossingDetector::new(),
            lag,
            last_progress: None,
            last_pin: None,
            settling: false,
            dirty: true,
            fault: None,
        });
        id
    }

    /// Bind `region` after checking every element it reads and the tween
    /// target exist.
    pub fn bind_checked(
        &mut self,
        label: impl Into<Cow<'static, str>>,
        region: ScrollRegion,
        tween: Option<ScrubTween>,
        layout: &dyn LayoutProvider,
    ) -> Result<BindingId, ChoreographyError> {
        for element in region.elements().chain(tween.as_ref().map(|t| &t.target)) {
            require(element, layout.contains(element))?;
        }
        Ok(self.bind(label, region, tween))
    }

    /// Remove one binding and clear the styles it wrote.
    pub fn remove(&mut self, id: BindingId, engine: &mut dyn AnimationEngine) -> bool {
        let Some(index) = self.bindings.iter().position(|b| b.id == id) else {
            return false;
        };
        let binding = self.bindings.remove(index);
        if let Some(pin) = &binding.region.pin {
            engine.clear(pin, &[Prop::Y]);
        }
        if let Some(tween) = &binding.tween {
            let props: Vec<Prop> = tween.props().collect();
            engine.clear(&tween.target, &props);
        }
        tracing::debug!(binding = %binding.label, id = id.0, "region removed");
        true
    }

    /// Remove every binding.
    pub fn clear(&mut self, engine: &mut dyn AnimationEngine) {
        let ids: Vec<BindingId> = self.bindings.iter().map(|b| b.id).collect();
        for id in ids {
            self.remove(id, engine);
        }
    }

    /// Force every binding to re-apply on the next frame.
    pub fn refresh(&mut self) {
        for binding in &mut self.bindings {
            binding.dirty = true;
        }
    }

    #[must_use]
    pub fn contains(&self, id: BindingId) -> bool {
        self.bindings.iter().any(|b| b.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Last progress that drove `id`.
    #[must_use]
    pub fn progress(&self, id: BindingId) -> Option<f64> {
        self.bindings
            .iter()
            .find(|b| b.id == id)
            .and_then(|b| b.last_progress)
    }

    /// Whether a smoothed binding is still converging or a refresh is pending.
    #[must_use]
    pub fn needs_frame(&self) -> bool {
        self.bindings.iter().any(|b| b.settling || b.dirty)
    }

    /// Evaluate every binding against the current scroll position.
    pub fn frame(&mut self, dt: Duration, cx: &mut FrameCx<'_>) -> Vec<RegionUpdate> {
        let scroll = cx.layout.scroll_position();
        let mut updates = Vec::new();

        for binding in &mut self.bindings {
            let (start, end) = match binding.region.endpoints(cx.layout) {
                Ok(endpoints) => endpoints,
                Err(err) => {
                    binding.note_fault(Some(err));
                    continue;
                }
            };
            binding.note_fault(
                (end < start).then_some(ChoreographyError::InvalidRegion { start, end }),
            );
            let bounds = RegionBounds::new(start, end);

            let raw = bounds.progress(scroll);
            binding.detector.observe(bounds.side(scroll));
            let crossings: Vec<Crossing> = binding.detector.drain().collect();

            let progress = match &mut binding.lag {
                Some(lag) => lag.tick(raw, dt),
                None => raw,
            };
            binding.settling = progress != raw;

            let forced = std::mem::take(&mut binding.dirty);
            let moved = binding.last_progress != Some(progress);
            if (moved || forced)
                && binding.region.scrub != Scrub::None
                && let Some(tween) = &binding.tween
            {
                tween.apply(progress, cx.engine, cx.layout);
            }

            let pin = binding.region.pin.as_ref().map(|element| {
                let offset = bounds.pin_offset(scroll);
                if forced || binding.last_pin != Some(offset) {
                    cx.engine.set(element, &Props::new().with(Prop::Y, offset));
                }
                let phase = match bounds.side(scroll) {
                    Side::Before => PinPhase::Before,
                    Side::Inside => PinPhase::Pinned,
                    Side::After => PinPhase::After,
                };
                PinState { phase, offset }
            });
            let pin_moved = pin.map(|p| p.offset) != binding.last_pin;
            binding.last_pin = pin.map(|p| p.offset);

            if moved || forced || pin_moved || !crossings.is_empty() {
                updates.push(RegionUpdate {
                    id: binding.id,
                    raw,
                    progress,
                    crossings,
                    pin,
                    bounds,
                });
            }
            binding.last_progress = Some(progress);
        }

        updates
    }
}
