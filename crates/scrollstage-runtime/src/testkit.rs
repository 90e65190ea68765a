//! In-memory collaborators for unit tests.

use std::collections::{BTreeMap, HashMap};

use scrollstage_core::element::{ElementId, Prop, PropValue, Props, Timing};
use scrollstage_core::geometry::{Axis, BoxRect, Size};
use scrollstage_core::host::{AnimationEngine, AnimationHandle, LayoutProvider};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Animate(ElementId, AnimationHandle),
    Set(ElementId, Props),
    Clear(ElementId, Vec<Prop>),
    Cancel(AnimationHandle),
    Pause(AnimationHandle),
    Resume(AnimationHandle),
}

/// Writes `to` immediately; tweens stay active until cancelled.
#[derive(Debug, Default)]
pub struct FakeEngine {
    pub styles: BTreeMap<ElementId, BTreeMap<Prop, PropValue>>,
    pub active: BTreeMap<AnimationHandle, ElementId>,
    pub paused: Vec<AnimationHandle>,
    pub calls: Vec<Call>,
    next: u64,
}

impl FakeEngine {
    pub fn num(&self, target: &str, prop: Prop) -> Option<f64> {
        self.styles
            .get(&ElementId::new(target))
            .and_then(|s| s.get(&prop))
            .and_then(PropValue::as_num)
    }

    pub fn keyword(&self, target: &str, prop: Prop) -> Option<String> {
        self.styles
            .get(&ElementId::new(target))
            .and_then(|s| s.get(&prop))
            .and_then(|v| v.as_keyword().map(str::to_owned))
    }

    pub fn inline(&self, target: &str) -> Vec<Prop> {
        self.styles
            .get(&ElementId::new(target))
            .map(|s| s.keys().copied().collect())
            .unwrap_or_default()
    }

    fn write(&mut self, target: &ElementId, props: &Props) {
        let style = self.styles.entry(target.clone()).or_default();
        for (prop, value) in props.iter() {
            style.insert(*prop, value.clone());
        }
    }
}

impl AnimationEngine for FakeEngine {
    fn animate(
        &mut self,
        target: &ElementId,
        from: Option<&Props>,
        to: &Props,
        _timing: &Timing,
    ) -> AnimationHandle {
        if let Some(from) = from {
            self.write(target, from);
        }
        self.write(target, to);
        self.next += 1;
        let handle = AnimationHandle(self.next);
        self.active.insert(handle, target.clone());
        self.calls.push(Call::Animate(target.clone(), handle));
        handle
    }

    fn set(&mut self, target: &ElementId, props: &Props) {
        self.write(target, props);
        self.calls.push(Call::Set(target.clone(), props.clone()));
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
        self.calls.push(Call::Clear(target.clone(), props.to_vec()));
    }

    fn is_active(&self, handle: AnimationHandle) -> bool {
        self.active.contains_key(&handle) && !self.paused.contains(&handle)
    }

    fn is_target_active(&self, target: &ElementId) -> bool {
        self.active
            .iter()
            .any(|(h, t)| t == target && !self.paused.contains(h))
    }

    fn cancel(&mut self, handle: AnimationHandle) {
        self.active.remove(&handle);
        self.calls.push(Call::Cancel(handle));
    }

    fn pause(&mut self, handle: AnimationHandle) {
        self.paused.push(handle);
        self.calls.push(Call::Pause(handle));
    }

    fn resume(&mut self, handle: AnimationHandle) {
        self.paused.retain(|h| *h != handle);
        self.calls.push(Call::Resume(handle));
    }
}

/// Document-coordinate boxes with a movable scroll position.
#[derive(Debug, Clone)]
pub struct FakeLayout {
    pub viewport: Size,
    pub scroll: f64,
    pub boxes: HashMap<ElementId, BoxRect>,
    pub extents: HashMap<ElementId, f64>,
}

impl FakeLayout {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            viewport: Size::new(width, height),
            scroll: 0.0,
            boxes: HashMap::new(),
            extents: HashMap::new(),
        }
    }

    pub fn with_box(mut self, id: &'static str, top: f64, left: f64, width: f64, height: f64) -> Self {
        self.boxes.insert(
            ElementId::from_static(id),
            BoxRect {
                top,
                left,
                width,
                height,
            },
        );
        self
    }

    pub fn with_extent(mut self, id: &'static str, extent: f64) -> Self {
        self.extents.insert(ElementId::from_static(id), extent);
        self
    }
}

impl LayoutProvider for FakeLayout {
    fn bounding_box(&self, element: &ElementId) -> Option<BoxRect> {
        self.boxes.get(element).map(|b| b.offset_y(-self.scroll))
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn scroll_position(&self) -> f64 {
        self.scroll
    }

    fn content_extent(&self, element: &ElementId, axis: Axis) -> Option<f64> {
        let b = self.boxes.get(element)?;
        match axis {
            Axis::Horizontal => Some(self.extents.get(element).copied().unwrap_or(b.width)),
            Axis::Vertical => Some(b.height),
        }
    }
}
