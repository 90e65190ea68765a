#![forbid(unsafe_code)]

//! Page choreography configuration.
//!
//! [`ChoreographyConfig`] names every element the page choreography touches
//! and every tunable it uses. With the `policy-config` feature it can be
//! loaded from TOML or JSON:
//!
//! ```toml
//! [story]
//! scrub_lag_secs = 0.8
//! distance_fraction = 0.9
//!
//! [ticket]
//! trigger = "panels-entry"
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the constants of the shipped page script, so
//! `ChoreographyConfig::default()` reproduces it exactly.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

use scrollstage_core::animation::{SegmentEasing, SegmentPath, StaggerMode};
use scrollstage_core::animation::path::Segment;
use scrollstage_core::element::{ElementId, Prop, Props, Timing};
use scrollstage_core::geometry::Point;
use scrollstage_core::viewport::{ConditionParseError, ViewportCondition};

use crate::divider::{DividerConfig, Parallax};
use crate::drag::DragConfig;
use crate::entrance::EntranceStep;
use crate::flicker::FlickerConfig;
use crate::ticket::{AnchorRect, TicketConfig, TicketTrigger};

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct ChoreographyConfig {
    pub elements: ElementsConfig,
    pub glow: GlowConfig,
    pub story: StoryConfig,
    pub panels: PanelsConfig,
    pub divider: DividerSettings,
    pub ticket: TicketSettings,
    pub flicker: FlickerSettings,
    pub drag: DragSettings,
    pub entrance: EntranceSettings,
}

impl ChoreographyConfig {
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Every problem found, empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let unit = |v: f64| (0.0..=1.0).contains(&v);
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;

        if !unit(self.glow.target_opacity) {
            errors.push(format!(
                "glow.target_opacity must be in [0, 1], got {}",
                self.glow.target_opacity
            ));
        }
        if !(self.story.distance_fraction.is_finite() && self.story.distance_fraction > 0.0) {
            errors.push(format!(
                "story.distance_fraction must be > 0, got {}",
                self.story.distance_fraction
            ));
        }
        if !non_negative(self.story.scrub_lag_secs) {
            errors.push(format!(
                "story.scrub_lag_secs must be >= 0, got {}",
                self.story.scrub_lag_secs
            ));
        }
        if !(self.panels.pin_viewport_heights.is_finite() && self.panels.pin_viewport_heights > 0.0) {
            errors.push(format!(
                "panels.pin_viewport_heights must be > 0, got {}",
                self.panels.pin_viewport_heights
            ));
        }
        if !unit(self.panels.fade_start) || !unit(self.panels.fade_end) {
            errors.push("panels.fade_start and panels.fade_end must be in [0, 1]".into());
        }
        for (name, query) in [
            ("divider.desktop_query", &self.divider.desktop_query),
            ("divider.compact_query", &self.divider.compact_query),
        ] {
            if let Err(e) = ViewportCondition::parse(query) {
                errors.push(format!("{name}: {e}"));
            }
        }
        if !unit(self.flicker.opacity_min)
            || !unit(self.flicker.opacity_max)
            || self.flicker.opacity_min > self.flicker.opacity_max
        {
            errors.push(format!(
                "flicker opacity range [{}, {}] must be ordered within [0, 1]",
                self.flicker.opacity_min, self.flicker.opacity_max
            ));
        }
        if !non_negative(self.flicker.delay_min_secs)
            || !non_negative(self.flicker.delay_max_secs)
            || self.flicker.delay_min_secs > self.flicker.delay_max_secs
        {
            errors.push(format!(
                "flicker delay range [{}, {}] must be ordered and >= 0",
                self.flicker.delay_min_secs, self.flicker.delay_max_secs
            ));
        }
        if !(self.flicker.flash_secs.is_finite() && self.flicker.flash_secs > 0.0) {
            errors.push(format!("flicker.flash_secs must be > 0, got {}", self.flicker.flash_secs));
        }
        if self.flicker.flashes < 0 {
            errors.push("flicker.flashes must be >= 0 (infinite flashes never reschedule)".into());
        }
        if self.ticket.path.iter().any(|s| !non_negative(s.weight)) {
            errors.push("ticket.path weights must be finite and >= 0".into());
        }
        if !non_negative(self.ticket.fade_in_secs) {
            errors.push(format!(
                "ticket.fade_in_secs must be >= 0, got {}",
                self.ticket.fade_in_secs
            ));
        }
        if !(self.drag.lift_scale.is_finite() && self.drag.lift_scale > 0.0) {
            errors.push(format!("drag.lift_scale must be > 0, got {}", self.drag.lift_scale));
        }
        if !non_negative(self.entrance.stagger_secs) {
            errors.push("entrance.stagger_secs must be >= 0".into());
        }
        for (i, step) in self.entrance.steps.iter().enumerate() {
            if !non_negative(step.duration_secs) || !non_negative(step.at_secs) {
                errors.push(format!("entrance.steps[{i}] times must be >= 0"));
            }
        }

        errors
    }

    /// [`validate`](Self::validate) as a `Result`.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    pub fn divider_config(&self) -> Result<DividerConfig, ConfigError> {
        let mut config = DividerConfig::new(
            self.elements.divider.clone(),
            self.elements.hero.clone(),
        );
        config.desktop = ViewportCondition::parse(&self.divider.desktop_query)?;
        config.compact = ViewportCondition::parse(&self.divider.compact_query)?;
        config.parallax = Parallax {
            shift_x: self.divider.shift_x,
            shift_y: self.divider.shift_y,
            tilt_y: self.divider.tilt_y,
            tilt_x: self.divider.tilt_x,
            follow: secs(self.divider.follow_secs),
            reset: secs(self.divider.reset_secs),
        };
        Ok(config)
    }

    #[must_use]
    pub fn ticket_config(&self) -> TicketConfig {
        let path = SegmentPath::from_segments(Point::default(), self.ticket.path.iter().copied());
        let mut config = TicketConfig::new(self.elements.ticket.clone(), path).fallback(
            AnchorRect::fallback(self.ticket.fallback_top, self.ticket.fallback_left),
        );
        config.peek = self.elements.peek.clone();
        if self.ticket.fade_in_secs > 0.0 {
            config = config.fade_in(Timing::secs(self.ticket.fade_in_secs).ease("power2.out"));
        }
        config
    }

    #[must_use]
    pub fn flicker_config(&self) -> FlickerConfig {
        let mut config = FlickerConfig::new(self.elements.sign.clone());
        config.opacity_min = self.flicker.opacity_min;
        config.opacity_max = self.flicker.opacity_max;
        config.flash = secs(self.flicker.flash_secs);
        config.repeats = self.flicker.flashes;
        config.delay_min = secs(self.flicker.delay_min_secs);
        config.delay_max = secs(self.flicker.delay_max_secs);
        config.seed = self.flicker.seed;
        config
    }

    #[must_use]
    pub fn drag_config(&self) -> DragConfig {
        DragConfig {
            lift_scale: self.drag.lift_scale,
            z_index: self.drag.z_index,
        }
    }

    #[must_use]
    pub fn entrance_steps(&self) -> Vec<EntranceStep> {
        self.entrance
            .steps
            .iter()
            .map(|step| {
                EntranceStep::new(step.targets.iter().cloned(), step.from.clone(), step.to.clone())
                    .duration(secs(step.duration_secs))
                    .ease(step.ease.clone())
                    .at(secs(step.at_secs))
                    .stagger(
                        secs(step.stagger_secs.unwrap_or(self.entrance.stagger_secs)),
                        StaggerMode::Linear,
                    )
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// A pinned panel and the inner box its fade animates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
pub struct PanelIds {
    pub panel: ElementId,
    pub inner: ElementId,
}

impl PanelIds {
    fn numbered(n: u8) -> Self {
        Self {
            panel: ElementId::new(format!("#panel-{n}")),
            inner: ElementId::new(format!("#panel-{n} .panel-inner")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct ElementsConfig {
    pub hero: ElementId,
    pub glow: ElementId,
    pub sign: ElementId,
    pub story_panels: ElementId,
    pub story_track: ElementId,
    pub pinned: ElementId,
    pub panels: Vec<PanelIds>,
    pub divider: ElementId,
    pub about: ElementId,
    pub footer: ElementId,
    pub ticket: ElementId,
    pub peek: Option<ElementId>,
}

impl Default for ElementsConfig {
    fn default() -> Self {
        Self {
            hero: ElementId::from_static("#hero"),
            glow: ElementId::from_static(".neon-glow"),
            sign: ElementId::from_static(".vintage-sign"),
            story_panels: ElementId::from_static("#story-panels"),
            story_track: ElementId::from_static(".story-track"),
            pinned: ElementId::from_static("#pinned"),
            panels: (1..=3).map(PanelIds::numbered).collect(),
            divider: ElementId::from_static("#divider"),
            about: ElementId::from_static("#about"),
            footer: ElementId::from_static("#footer"),
            ticket: ElementId::from_static("#ticket"),
            peek: Some(ElementId::from_static("#peek")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct GlowConfig {
    pub target_opacity: f64,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            target_opacity: 0.55,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct StoryConfig {
    pub distance_fraction: f64,
    pub scrub_lag_secs: f64,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            distance_fraction: 0.9,
            scrub_lag_secs: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct PanelsConfig {
    pub pin_viewport_heights: f64,
    /// Viewport line where a panel's fade starts (its top meets it).
    pub fade_start: f64,
    /// Viewport line where the fade ends (the panel's bottom meets it).
    pub fade_end: f64,
    pub from_opacity: f64,
    pub from_y: f64,
    pub from_scale: f64,
}

impl Default for PanelsConfig {
    fn default() -> Self {
        Self {
            pin_viewport_heights: 3.0,
            fade_start: 0.8,
            fade_end: 0.4,
            from_opacity: 0.0,
            from_y: 40.0,
            from_scale: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct DividerSettings {
    pub desktop_query: String,
    pub compact_query: String,
    pub shift_x: f64,
    pub shift_y: f64,
    pub tilt_y: f64,
    pub tilt_x: f64,
    pub follow_secs: f64,
    pub reset_secs: f64,
}

impl Default for DividerSettings {
    fn default() -> Self {
        let parallax = Parallax::default();
        Self {
            desktop_query: "(pointer: fine) and (min-width: 1024px)".into(),
            compact_query: "(width < 1024px)".into(),
            shift_x: parallax.shift_x,
            shift_y: parallax.shift_y,
            tilt_y: parallax.tilt_y,
            tilt_x: parallax.tilt_x,
            follow_secs: parallax.follow.as_secs_f64(),
            reset_secs: parallax.reset.as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct TicketSettings {
    pub trigger: TicketTrigger,
    pub fallback_top: f64,
    pub fallback_left: f64,
    /// Offsets from the anchor, visited in order.
    pub path: Vec<Segment>,
    /// Zero disables the fade.
    pub fade_in_secs: f64,
}

impl Default for TicketSettings {
    fn default() -> Self {
        Self {
            trigger: TicketTrigger::AboutZone,
            fallback_top: 24.0,
            fallback_left: 24.0,
            path: vec![
                Segment {
                    to: Point::new(-120.0, 80.0),
                    weight: 1.0,
                    easing: SegmentEasing::EaseOut,
                },
                Segment {
                    to: Point::new(-360.0, 240.0),
                    weight: 2.0,
                    easing: SegmentEasing::EaseInOut,
                },
            ],
            fade_in_secs: 0.35,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct FlickerSettings {
    pub opacity_min: f64,
    pub opacity_max: f64,
    pub flash_secs: f64,
    pub flashes: i32,
    pub delay_min_secs: f64,
    pub delay_max_secs: f64,
    pub seed: u64,
}

impl Default for FlickerSettings {
    fn default() -> Self {
        Self {
            opacity_min: 0.72,
            opacity_max: 0.88,
            flash_secs: 0.08,
            flashes: 5,
            delay_min_secs: 8.0,
            delay_max_secs: 25.0,
            seed: 0x5eed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct DragSettings {
    pub lift_scale: f64,
    pub z_index: f64,
}

impl Default for DragSettings {
    fn default() -> Self {
        let drag = DragConfig::default();
        Self {
            lift_scale: drag.lift_scale,
            z_index: drag.z_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
pub struct EntranceStepSettings {
    pub targets: Vec<ElementId>,
    pub from: Props,
    pub to: Props,
    pub duration_secs: f64,
    pub ease: String,
    pub at_secs: f64,
    /// Overrides the section-wide stagger.
    #[cfg_attr(feature = "policy-config", serde(default))]
    pub stagger_secs: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct EntranceSettings {
    pub stagger_secs: f64,
    pub steps: Vec<EntranceStepSettings>,
}

impl Default for EntranceSettings {
    fn default() -> Self {
        fn ids(names: &[&'static str]) -> Vec<ElementId> {
            names.iter().map(|&n| ElementId::from_static(n)).collect()
        }
        Self {
            stagger_secs: 0.18,
            steps: vec![
                EntranceStepSettings {
                    targets: ids(&["#line-1", "#line-2", "#line-3"]),
                    from: Props::new()
                        .with(Prop::Y, 180.0)
                        .with(Prop::Rotation, 6.0)
                        .with(Prop::Opacity, 0.0),
                    to: Props::new()
                        .with(Prop::Y, 0.0)
                        .with(Prop::Rotation, 0.0)
                        .with(Prop::Opacity, 1.0),
                    duration_secs: 1.4,
                    ease: "power3.out".into(),
                    at_secs: 0.0,
                    stagger_secs: None,
                },
                EntranceStepSettings {
                    targets: ids(&[".hero-main-photo"]),
                    from: Props::new().with(Prop::Scale, 1.25),
                    to: Props::new().with(Prop::Scale, 1.0),
                    duration_secs: 2.6,
                    ease: "power2.out".into(),
                    at_secs: 0.76,
                    stagger_secs: None,
                },
                EntranceStepSettings {
                    targets: ids(&["#cta-primary", "#cta-secondary"]),
                    from: Props::new().with(Prop::Y, 60.0).with(Prop::Opacity, 0.0),
                    to: Props::new().with(Prop::Y, 0.0).with(Prop::Opacity, 1.0),
                    duration_secs: 0.9,
                    ease: "power3.out".into(),
                    at_secs: 2.26,
                    stagger_secs: Some(0.15),
                },
                EntranceStepSettings {
                    targets: ids(&[".hero-sign"]),
                    from: Props::new().with(Prop::Y, 40.0).with(Prop::Opacity, 0.0),
                    to: Props::new().with(Prop::Y, 0.0).with(Prop::Opacity, 1.0),
                    duration_secs: 1.2,
                    ease: "power3.out".into(),
                    at_secs: 2.31,
                    stagger_secs: None,
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    #[cfg(feature = "policy-config")]
    Toml(toml::de::Error),
    #[cfg(feature = "policy-config")]
    Json(serde_json::Error),
    /// A breakpoint query did not parse.
    Condition(ConditionParseError),
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Condition(e) => write!(f, "breakpoint query: {e}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => Some(e),
            Self::Condition(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

impl From<ConditionParseError> for ConfigError {
    fn from(e: ConditionParseError) -> Self {
        Self::Condition(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ChoreographyConfig::default().validate(), Vec::<String>::new());
    }

    #[test]
    fn validate_catches_bad_ranges() {
        let mut config = ChoreographyConfig::default();
        config.glow.target_opacity = 1.5;
        config.flicker.delay_min_secs = 30.0;
        config.divider.compact_query = "(max-width 1023px)".into();
        let errors = config.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors[0].contains("glow.target_opacity"));
    }

    #[test]
    fn validated_wraps_errors() {
        let mut config = ChoreographyConfig::default();
        config.story.distance_fraction = 0.0;
        assert!(matches!(config.validated(), Err(ConfigError::Validation(e)) if e.len() == 1));
    }

    #[test]
    fn divider_config_parses_queries() {
        use scrollstage_core::viewport::Viewport;

        let divider = ChoreographyConfig::default().divider_config().unwrap();
        assert!(divider.compact.matches(&Viewport::touch(800.0, 600.0)));
        assert!(divider.desktop.matches(&Viewport::desktop(1280.0, 800.0)));
        assert!(!divider.desktop.matches(&Viewport::touch(1280.0, 800.0)));

        // The default pair leaves no gap between breakpoints.
        let between = Viewport::desktop(1023.5, 800.0);
        assert!(divider.compact.matches(&between));
        assert!(!divider.desktop.matches(&between));
        assert!(divider.desktop.matches(&Viewport::desktop(1024.0, 800.0)));
        assert!(!divider.compact.matches(&Viewport::desktop(1024.0, 800.0)));
    }

    #[test]
    fn ticket_config_follows_settings() {
        let config = ChoreographyConfig::default().ticket_config();
        assert_eq!(config.path.terminal(), Point::new(-360.0, 240.0));
        assert_eq!(config.peek, Some(ElementId::from_static("#peek")));
        assert!(config.fade_in.is_some());
    }

    #[test]
    fn entrance_inherits_section_stagger() {
        let steps = ChoreographyConfig::default().entrance_steps();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].delays()[1], secs(0.18));
        assert_eq!(steps[2].delays()[1], secs(2.26) + secs(0.15));
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn toml_overrides_merge_with_defaults() {
        let config = ChoreographyConfig::from_toml_str(
            r#"
            [story]
            scrub_lag_secs = 0.5

            [ticket]
            trigger = "panels-entry"
            "#,
        )
        .unwrap();
        assert_eq!(config.story.scrub_lag_secs, 0.5);
        assert_eq!(config.story.distance_fraction, 0.9);
        assert_eq!(config.ticket.trigger, TicketTrigger::PanelsEntry);
        assert_eq!(config.elements, ElementsConfig::default());
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn json_rejects_garbage() {
        assert!(matches!(
            ChoreographyConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
