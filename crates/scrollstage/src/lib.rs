#![forbid(unsafe_code)]

//! scrollstage public facade crate.
//!
//! This crate provides the stable surface area for embedders. It re-exports
//! the common types from the internal crates and offers a small prelude for
//! wiring a page into a host event loop.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use scrollstage_core::element::{ElementId, Prop, PropValue, Props, Timing};
pub use scrollstage_core::error::ChoreographyError;
pub use scrollstage_core::geometry::{Axis, BoxRect, Point, Reduction, Size, ViewportGeometry};
pub use scrollstage_core::host::{AnimationEngine, AnimationHandle, LayoutProvider};
pub use scrollstage_core::pointer::{PointerEvent, PointerEventKind, PointerId};
pub use scrollstage_core::viewport::{
    ConditionParseError, InputCaps, Orientation, PointerKind, Viewport, ViewportCondition,
};

// --- Runtime re-exports ----------------------------------------------------

pub use scrollstage_runtime::{
    Anchor, AnchorRect, Choreographer, ChoreographyConfig, ConfigError, DragOutcome, FrameCx,
    RegionBounds, RegionUpdate, ResponsiveRouter, RouterPass, ScrollRegion, Stage,
    TicketSnapshot, TicketTrigger, TicketZoneState,
};

// --- Web re-exports ----------------------------------------------------------

#[cfg(feature = "web")]
pub use scrollstage_web::{HostEvent, RecordingEngine, StaticLayout, StepResult, WebHost};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for scrollstage embedders.
#[derive(Debug)]
pub enum Error {
    /// A piece of choreography could not be set up.
    Choreography(ChoreographyError),
    /// Configuration failed to load or validate.
    Config(ConfigError),
    /// A viewport condition string did not parse.
    Condition(ConditionParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Choreography(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Condition(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Choreography(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Condition(err) => Some(err),
        }
    }
}

impl From<ChoreographyError> for Error {
    fn from(err: ChoreographyError) -> Self {
        Self::Choreography(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<ConditionParseError> for Error {
    fn from(err: ConditionParseError) -> Self {
        Self::Condition(err)
    }
}

/// Standard result type for scrollstage APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AnimationEngine, BoxRect, Choreographer, ChoreographyConfig, ElementId, Error,
        LayoutProvider, PointerEvent, Prop, PropValue, Props, Result, Viewport,
    };

    #[cfg(feature = "web")]
    pub use crate::{StaticLayout, WebHost};

    pub use crate::{core, runtime};
}

pub use scrollstage_core as core;
pub use scrollstage_runtime as runtime;
#[cfg(feature = "web")]
pub use scrollstage_web as web;

#[cfg(test)]
mod tests {
    use super::*;

    fn takes_result(fail: bool) -> Result<u32> {
        if fail {
            Err(ViewportCondition::parse("").unwrap_err().into())
        } else {
            Ok(7)
        }
    }

    #[test]
    fn errors_convert_and_display() {
        let err: Error = ChoreographyError::MissingElement(ElementId::from_static("#pinned")).into();
        assert_eq!(err.to_string(), "missing element: #pinned");

        let err = takes_result(true).unwrap_err();
        assert!(matches!(err, Error::Condition(ConditionParseError::Empty)));
        assert_eq!(err.to_string(), "empty viewport condition");
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(takes_result(false).unwrap(), 7);
    }

    #[test]
    fn config_errors_convert() {
        let err: Error = ConfigError::Validation(vec!["glow.max_opacity out of range".into()]).into();
        assert!(matches!(err, Error::Config(_)));
    }

    #[cfg(feature = "web")]
    #[test]
    fn prelude_drives_the_demo_page() {
        use crate::prelude::*;

        let mut host = WebHost::demo().expect("default config is valid");
        host.load(scrollstage_web::demo_viewport());
        host.scroll_to(400.0);
        host.step(scrollstage_web::FRAME);
        assert_eq!(
            host.engine().num(".neon-glow", Prop::Opacity),
            Some(0.5 * 0.55)
        );
        assert!(host.choreographer().is_loaded());
    }
}
