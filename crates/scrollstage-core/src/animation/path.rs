#![forbid(unsafe_code)]

//! Multi-segment offset paths parameterized by progress.
//!
//! A [`SegmentPath`] starts at an origin and visits each segment's end point
//! in order. Progress is divided between segments by weight; within a
//! segment the local progress is shaped by that segment's easing.
//!
//! # Invariants
//!
//! 1. `sample(p)` is a pure function of `p`: no state, no history.
//! 2. `sample(0) == origin` and `sample(1) == terminal()`.
//! 3. The path is continuous at segment joints.
//! 4. Inputs outside `[0, 1]` (and NaN) are clamped.
//!
//! # Failure Modes
//!
//! - No segments: every sample is the origin.
//! - Negative weights count as zero; if all weights are zero, segments share
//!   progress equally.

use super::{clamp_progress, ease_in, ease_in_out, ease_out, linear, smoothstep};
use crate::geometry::Point;

/// Easing applied within one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SegmentEasing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Smoothstep,
}

impl SegmentEasing {
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => linear(t),
            Self::EaseIn => ease_in(t),
            Self::EaseOut => ease_out(t),
            Self::EaseInOut => ease_in_out(t),
            Self::Smoothstep => smoothstep(t),
        }
    }
}

/// One leg of a [`SegmentPath`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub to: Point,
    pub weight: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub easing: SegmentEasing,
}

/// Deterministic piecewise path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentPath {
    origin: Point,
    segments: Vec<Segment>,
}

impl SegmentPath {
    #[must_use]
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            segments: Vec::new(),
        }
    }

    /// Path from `origin` through `segments`.
    #[must_use]
    pub fn from_segments(origin: Point, segments: impl IntoIterator<Item = Segment>) -> Self {
        Self {
            origin,
            segments: segments.into_iter().collect(),
        }
    }

    /// Append a segment (builder).
    #[must_use]
    pub fn segment(mut self, to: Point, weight: f64, easing: SegmentEasing) -> Self {
        self.segments.push(Segment { to, weight, easing });
        self
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// End point of the last segment (the origin for an empty path).
    #[must_use]
    pub fn terminal(&self) -> Point {
        self.segments.last().map_or(self.origin, |s| s.to)
    }

    fn effective_weights(&self) -> (Vec<f64>, f64) {
        let weights: Vec<f64> = self
            .segments
            .iter()
            .map(|s| if s.weight.is_finite() { s.weight.max(0.0) } else { 0.0 })
            .collect();
        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            (weights, total)
        } else {
            let n = self.segments.len();
            (vec![1.0; n], n as f64)
        }
    }

    /// Offset at progress `p`.
    #[must_use]
    pub fn sample(&self, p: f64) -> Point {
        let p = clamp_progress(p);
        if self.segments.is_empty() || p <= 0.0 {
            return self.origin;
        }
        if p >= 1.0 {
            return self.terminal();
        }

        let (weights, total) = self.effective_weights();
        let target = p * total;
        let mut start = self.origin;
        let mut acc = 0.0;
        let last = self.segments.len() - 1;
        for (i, (segment, weight)) in self.segments.iter().zip(weights).enumerate() {
            if target <= acc + weight || i == last {
                let local = if weight > 0.0 {
                    ((target - acc) / weight).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                return start.lerp(segment.to, segment.easing.apply(local));
            }
            acc += weight;
            start = segment.to;
        }
        start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_leg() -> SegmentPath {
        SegmentPath::new(Point::new(0.0, 0.0))
            .segment(Point::new(120.0, 0.0), 1.0, SegmentEasing::Linear)
            .segment(Point::new(120.0, 300.0), 2.0, SegmentEasing::Linear)
            .segment(Point::new(40.0, 420.0), 1.0, SegmentEasing::EaseOut)
    }

    #[test]
    fn endpoints() {
        let path = three_leg();
        assert_eq!(path.sample(0.0), Point::new(0.0, 0.0));
        assert_eq!(path.sample(1.0), Point::new(40.0, 420.0));
        assert_eq!(path.sample(7.0), path.terminal());
        assert_eq!(path.sample(f64::NAN), path.origin());
    }

    #[test]
    fn weights_split_progress() {
        let path = three_leg();
        // Total weight 4: first leg ends at 0.25, second at 0.75.
        let joint1 = path.sample(0.25);
        assert!((joint1.x - 120.0).abs() < 1e-9 && joint1.y.abs() < 1e-9);
        let mid = path.sample(0.5);
        assert!((mid.x - 120.0).abs() < 1e-9 && (mid.y - 150.0).abs() < 1e-9);
    }

    #[test]
    fn continuous_at_joints() {
        let path = three_leg();
        let before = path.sample(0.75 - 1e-9);
        let after = path.sample(0.75 + 1e-9);
        assert!((before.x - after.x).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-3);
    }

    #[test]
    fn empty_path_is_origin() {
        let path = SegmentPath::new(Point::new(3.0, 4.0));
        assert_eq!(path.sample(0.5), Point::new(3.0, 4.0));
        assert_eq!(path.terminal(), Point::new(3.0, 4.0));
    }

    #[test]
    fn zero_weights_share_equally() {
        let path = SegmentPath::new(Point::default())
            .segment(Point::new(10.0, 0.0), 0.0, SegmentEasing::Linear)
            .segment(Point::new(10.0, 10.0), -3.0, SegmentEasing::Linear);
        let q = path.sample(0.25);
        assert!((q.x - 5.0).abs() < 1e-9);
    }
}
