#![forbid(unsafe_code)]

//! Element identifiers and the style vocabulary written through the
//! animation engine.
//!
//! The runtime only ever writes the properties named by [`Prop`]. Keeping the
//! set closed is what lets the ticket machine clear *every* override it made
//! when it returns to the hidden state.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ElementId
// ---------------------------------------------------------------------------

/// Identifier of a page element (a selector such as `"#story-panels"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElementId(Cow<'static, str>);

impl ElementId {
    /// Identifier backed by a static string.
    #[must_use]
    pub const fn from_static(selector: &'static str) -> Self {
        Self(Cow::Borrowed(selector))
    }

    /// Identifier backed by an owned string.
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self(Cow::Owned(selector.into()))
    }

    /// The selector text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ElementId {
    fn from(selector: &'static str) -> Self {
        Self::from_static(selector)
    }
}

impl From<String> for ElementId {
    fn from(selector: String) -> Self {
        Self::new(selector)
    }
}

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

/// A style property the choreography may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Prop {
    /// Horizontal translation in px.
    X,
    /// Vertical translation in px.
    Y,
    /// `top` in px (meaningful with fixed positioning).
    Top,
    /// `left` in px (meaningful with fixed positioning).
    Left,
    Opacity,
    Scale,
    ScaleX,
    /// Rotation in degrees.
    Rotation,
    RotationX,
    RotationY,
    /// `position` keyword.
    Position,
    /// `visibility` keyword.
    Visibility,
    /// `pointer-events` keyword.
    PointerEvents,
    /// `cursor` keyword.
    Cursor,
    ZIndex,
}

impl Prop {
    /// CSS-facing name of the property.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Top => "top",
            Self::Left => "left",
            Self::Opacity => "opacity",
            Self::Scale => "scale",
            Self::ScaleX => "scaleX",
            Self::Rotation => "rotation",
            Self::RotationX => "rotationX",
            Self::RotationY => "rotationY",
            Self::Position => "position",
            Self::Visibility => "visibility",
            Self::PointerEvents => "pointer-events",
            Self::Cursor => "cursor",
            Self::ZIndex => "z-index",
        }
    }
}

/// Value of a [`Prop`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum PropValue {
    /// Numeric value (px, degrees, or unitless depending on the prop).
    Num(f64),
    /// Keyword value such as `fixed`, `hidden`, `none`.
    Keyword(Cow<'static, str>),
}

impl PropValue {
    /// Numeric payload, if any.
    #[must_use]
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num(v) => Some(*v),
            Self::Keyword(_) => None,
        }
    }

    /// Keyword payload, if any.
    #[must_use]
    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            Self::Num(_) => None,
            Self::Keyword(k) => Some(k),
        }
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Num(v)
    }
}

impl From<&'static str> for PropValue {
    fn from(k: &'static str) -> Self {
        Self::Keyword(Cow::Borrowed(k))
    }
}

/// An ordered set of property goals. Setting a prop twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Props(Vec<(Prop, PropValue)>);

impl Props {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add or replace a property (builder).
    #[must_use]
    pub fn with(mut self, prop: Prop, value: impl Into<PropValue>) -> Self {
        self.insert(prop, value);
        self
    }

    /// Add or replace a property.
    pub fn insert(&mut self, prop: Prop, value: impl Into<PropValue>) {
        let value = value.into();
        match self.0.iter_mut().find(|(p, _)| *p == prop) {
            Some(slot) => slot.1 = value,
            None => self.0.push((prop, value)),
        }
    }

    /// Value for `prop`, if present.
    #[must_use]
    pub fn get(&self, prop: Prop) -> Option<&PropValue> {
        self.0.iter().find(|(p, _)| *p == prop).map(|(_, v)| v)
    }

    /// Numeric value for `prop`, if present and numeric.
    #[must_use]
    pub fn num(&self, prop: Prop) -> Option<f64> {
        self.get(prop).and_then(PropValue::as_num)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(Prop, PropValue)> {
        self.0.iter()
    }

    /// Property names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = Prop> + '_ {
        self.0.iter().map(|(p, _)| *p)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Prop, PropValue)> for Props {
    fn from_iter<I: IntoIterator<Item = (Prop, PropValue)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (prop, value) in iter {
            props.insert(prop, value);
        }
        props
    }
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Timing parameters handed to the engine for time-based tweens.
///
/// The ease is an opaque name; the engine owns curve definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    pub duration: Duration,
    pub delay: Duration,
    pub ease: Cow<'static, str>,
    /// Extra repetitions; `-1` repeats forever.
    pub repeat: i32,
    pub yoyo: bool,
}

impl Timing {
    /// Tween of `duration` with the engine's default ease.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            delay: Duration::ZERO,
            ease: Cow::Borrowed("none"),
            repeat: 0,
            yoyo: false,
        }
    }

    /// Tween of `secs` seconds. Negative or non-finite input means zero.
    #[must_use]
    pub fn secs(secs: f64) -> Self {
        Self::new(Duration::try_from_secs_f64(secs).unwrap_or_default())
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn ease(mut self, ease: impl Into<Cow<'static, str>>) -> Self {
        self.ease = ease.into();
        self
    }

    #[must_use]
    pub fn repeat(mut self, repeat: i32, yoyo: bool) -> Self {
        self.repeat = repeat;
        self.yoyo = yoyo;
        self
    }

    /// Wall-clock length including repeats and delay. `None` when infinite.
    #[must_use]
    pub fn total(&self) -> Option<Duration> {
        if self.repeat < 0 {
            return None;
        }
        let passes = u32::try_from(self.repeat).ok()?.saturating_add(1);
        Some(self.delay + self.duration.saturating_mul(passes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn props_insert_replaces_existing() {
        let props = Props::new()
            .with(Prop::X, 10.0)
            .with(Prop::Opacity, 0.5)
            .with(Prop::X, -4.0);
        assert_eq!(props.len(), 2);
        assert_eq!(props.num(Prop::X), Some(-4.0));
        assert_eq!(props.keys().collect::<Vec<_>>(), vec![Prop::X, Prop::Opacity]);
    }

    #[test]
    fn keyword_values_are_not_numeric() {
        let props = Props::new().with(Prop::Position, "fixed");
        assert_eq!(props.num(Prop::Position), None);
        assert_eq!(
            props.get(Prop::Position).and_then(PropValue::as_keyword),
            Some("fixed")
        );
    }

    #[test]
    fn timing_total_counts_repeats() {
        let t = Timing::secs(0.08).repeat(5, true);
        let total = t.total().unwrap_or_default();
        assert!((total.as_secs_f64() - 0.48).abs() < 1e-9);
        assert_eq!(Timing::secs(1.0).repeat(-1, true).total(), None);
    }

    #[test]
    fn element_id_display() {
        let id = ElementId::from_static("#ticket");
        assert_eq!(id.to_string(), "#ticket");
        assert_eq!(id, ElementId::new("#ticket"));
    }
}
