#![forbid(unsafe_code)]

//! Viewport state and responsive conditions.
//!
//! A [`ViewportCondition`] is a conjunction of optional constraints evaluated
//! against a [`Viewport`]. The router only needs "is this true now"; the
//! [`parse`](ViewportCondition::parse) helper accepts the media-query subset
//! the page scripts use so conditions can live in configuration.
//!
//! `min-*`/`max-*` bounds are inclusive. A complementary breakpoint pair
//! needs one exclusive side, written in range syntax: `(width >= 1024px)`
//! and `(width < 1024px)` partition every width, fractional ones included.
//!
//! # Failure Modes
//!
//! | Input | Result |
//! |-------|--------|
//! | empty string | [`ConditionParseError::Empty`] |
//! | clause without parentheses, colon or comparison | [`ConditionParseError::Malformed`] |
//! | unsupported feature name | [`ConditionParseError::UnknownFeature`] |
//! | negative / non-numeric length, unknown keyword | [`ConditionParseError::InvalidValue`] |

use std::fmt;

bitflags::bitflags! {
    /// Input capabilities reported by the host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputCaps: u8 {
        /// Primary pointer is precise (mouse, trackpad, pen).
        const FINE_POINTER = 1 << 0;
        /// Primary pointer is imprecise (touch).
        const COARSE_POINTER = 1 << 1;
        /// Primary pointer can hover.
        const HOVER = 1 << 2;
    }
}

/// Current viewport dimensions and input capabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub caps: InputCaps,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64, caps: InputCaps) -> Self {
        Self {
            width,
            height,
            caps,
        }
    }

    /// Mouse-driven viewport (fine pointer with hover).
    #[must_use]
    pub const fn desktop(width: f64, height: f64) -> Self {
        Self::new(
            width,
            height,
            InputCaps::FINE_POINTER.union(InputCaps::HOVER),
        )
    }

    /// Touch viewport (coarse pointer, no hover).
    #[must_use]
    pub const fn touch(width: f64, height: f64) -> Self {
        Self::new(width, height, InputCaps::COARSE_POINTER)
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        if self.height >= self.width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

/// `pointer:` media feature value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Fine,
    Coarse,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Portrait,
    Landscape,
}

// ---------------------------------------------------------------------------
// ViewportCondition
// ---------------------------------------------------------------------------

/// Conjunction of viewport constraints. The empty condition always matches.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportCondition {
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    /// Exclusive lower width bound (`width > px`).
    pub above_width: Option<f64>,
    /// Exclusive upper width bound (`width < px`).
    pub below_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
    pub above_height: Option<f64>,
    pub below_height: Option<f64>,
    pub pointer: Option<PointerKind>,
    pub hover: Option<bool>,
    pub orientation: Option<Orientation>,
}

impl ViewportCondition {
    /// Condition that always holds.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn min_width(mut self, px: f64) -> Self {
        self.min_width = Some(px);
        self
    }

    #[must_use]
    pub fn max_width(mut self, px: f64) -> Self {
        self.max_width = Some(px);
        self
    }

    #[must_use]
    pub fn above_width(mut self, px: f64) -> Self {
        self.above_width = Some(px);
        self
    }

    #[must_use]
    pub fn below_width(mut self, px: f64) -> Self {
        self.below_width = Some(px);
        self
    }

    #[must_use]
    pub fn min_height(mut self, px: f64) -> Self {
        self.min_height = Some(px);
        self
    }

    #[must_use]
    pub fn max_height(mut self, px: f64) -> Self {
        self.max_height = Some(px);
        self
    }

    #[must_use]
    pub fn above_height(mut self, px: f64) -> Self {
        self.above_height = Some(px);
        self
    }

    #[must_use]
    pub fn below_height(mut self, px: f64) -> Self {
        self.below_height = Some(px);
        self
    }

    #[must_use]
    pub fn pointer(mut self, kind: PointerKind) -> Self {
        self.pointer = Some(kind);
        self
    }

    #[must_use]
    pub fn hover(mut self, hover: bool) -> Self {
        self.hover = Some(hover);
        self
    }

    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Whether every constraint holds for `viewport`.
    #[must_use]
    pub fn matches(&self, viewport: &Viewport) -> bool {
        let within = |value: f64, [min, max, above, below]: [Option<f64>; 4]| {
            min.is_none_or(|m| value >= m)
                && max.is_none_or(|m| value <= m)
                && above.is_none_or(|m| value > m)
                && below.is_none_or(|m| value < m)
        };
        let width = [self.min_width, self.max_width, self.above_width, self.below_width];
        if !within(viewport.width, width) {
            return false;
        }
        let height = [
            self.min_height,
            self.max_height,
            self.above_height,
            self.below_height,
        ];
        if !within(viewport.height, height) {
            return false;
        }
        let pointer_ok = match self.pointer {
            None => true,
            Some(PointerKind::Fine) => viewport.caps.contains(InputCaps::FINE_POINTER),
            Some(PointerKind::Coarse) => viewport.caps.contains(InputCaps::COARSE_POINTER),
            Some(PointerKind::None) => !viewport
                .caps
                .intersects(InputCaps::FINE_POINTER | InputCaps::COARSE_POINTER),
        };
        if !pointer_ok {
            return false;
        }
        if let Some(hover) = self.hover
            && viewport.caps.contains(InputCaps::HOVER) != hover
        {
            return false;
        }
        self.orientation
            .is_none_or(|o| o == viewport.orientation())
    }

    /// Parse a media-query subset such as `(min-width: 768px) and (pointer: fine)`.
    ///
    /// Supported features: `min-width`, `max-width`, `min-height`,
    /// `max-height`, `pointer`, `hover`, `orientation`, and the range forms
    /// `(width < px)`, `(width <= px)`, `(width > px)`, `(width >= px)` (same
    /// for `height`). The media types `all` and `screen` are accepted and
    /// ignored.
    pub fn parse(input: &str) -> Result<Self, ConditionParseError> {
        let lowered = input.trim().to_ascii_lowercase();
        if lowered.is_empty() {
            return Err(ConditionParseError::Empty);
        }

        let mut condition = Self::any();
        for clause in lowered.split(" and ") {
            let clause = clause.trim();
            if clause == "all" || clause == "screen" {
                continue;
            }
            let inner = clause
                .strip_prefix('(')
                .and_then(|c| c.strip_suffix(')'))
                .ok_or_else(|| ConditionParseError::Malformed(clause.to_string()))?;
            if !inner.contains(':') {
                condition.apply_range(inner)?;
                continue;
            }
            let (feature, value) = inner
                .split_once(':')
                .ok_or_else(|| ConditionParseError::Malformed(clause.to_string()))?;
            let feature = feature.trim();
            let value = value.trim();

            match feature {
                "min-width" => condition.min_width = Some(parse_px(feature, value)?),
                "max-width" => condition.max_width = Some(parse_px(feature, value)?),
                "min-height" => condition.min_height = Some(parse_px(feature, value)?),
                "max-height" => condition.max_height = Some(parse_px(feature, value)?),
                "pointer" => {
                    condition.pointer = Some(match value {
                        "fine" => PointerKind::Fine,
                        "coarse" => PointerKind::Coarse,
                        "none" => PointerKind::None,
                        _ => return Err(invalid(feature, value)),
                    });
                }
                "hover" => {
                    condition.hover = Some(match value {
                        "hover" => true,
                        "none" => false,
                        _ => return Err(invalid(feature, value)),
                    });
                }
                "orientation" => {
                    condition.orientation = Some(match value {
                        "portrait" => Orientation::Portrait,
                        "landscape" => Orientation::Landscape,
                        _ => return Err(invalid(feature, value)),
                    });
                }
                other => return Err(ConditionParseError::UnknownFeature(other.to_string())),
            }
        }
        Ok(condition)
    }

    fn apply_range(&mut self, inner: &str) -> Result<(), ConditionParseError> {
        let (op_at, op) = ["<=", ">=", "<", ">"]
            .iter()
            .find_map(|op| inner.find(*op).map(|at| (at, *op)))
            .ok_or_else(|| ConditionParseError::Malformed(format!("({inner})")))?;
        let feature = inner[..op_at].trim();
        let value = inner[op_at + op.len()..].trim();
        let px = parse_px(feature, value)?;
        let slot = match (feature, op) {
            ("width", "<") => &mut self.below_width,
            ("width", "<=") => &mut self.max_width,
            ("width", ">") => &mut self.above_width,
            ("width", ">=") => &mut self.min_width,
            ("height", "<") => &mut self.below_height,
            ("height", "<=") => &mut self.max_height,
            ("height", ">") => &mut self.above_height,
            ("height", ">=") => &mut self.min_height,
            (other, _) => return Err(ConditionParseError::UnknownFeature(other.to_string())),
        };
        *slot = Some(px);
        Ok(())
    }
}

fn parse_px(feature: &str, value: &str) -> Result<f64, ConditionParseError> {
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    match number.parse::<f64>() {
        Ok(px) if px.is_finite() && px >= 0.0 => Ok(px),
        _ => Err(invalid(feature, value)),
    }
}

fn invalid(feature: &str, value: &str) -> ConditionParseError {
    ConditionParseError::InvalidValue {
        feature: feature.to_string(),
        value: value.to_string(),
    }
}

/// Error from [`ViewportCondition::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionParseError {
    Empty,
    Malformed(String),
    UnknownFeature(String),
    InvalidValue { feature: String, value: String },
}

impl fmt::Display for ConditionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty viewport condition"),
            Self::Malformed(clause) => write!(f, "malformed clause: {clause}"),
            Self::UnknownFeature(feature) => write!(f, "unknown media feature: {feature}"),
            Self::InvalidValue { feature, value } => {
                write!(f, "invalid value for {feature}: {value}")
            }
        }
    }
}

impl std::error::Error for ConditionParseError {}
