#![forbid(unsafe_code)]

//! Choreography error taxonomy.
//!
//! None of these are fatal to the page. They are returned from registration
//! helpers and logged by the runtime, which then skips the dependent behavior.
//! A re-entrant state transition is deliberately absent: it is an idempotent
//! no-op, never an error.

use std::fmt;

use crate::element::ElementId;

/// Why a piece of choreography could not be set up.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoreographyError {
    /// A referenced element is not in the current document.
    MissingElement(ElementId),
    /// A measurement was used after the layout epoch it was taken in.
    StaleGeometry { captured: u64, current: u64 },
    /// Two variants of one exclusive group are active at once.
    VariantConflict { group: String, variants: Vec<String> },
    /// A region whose end resolves before its start.
    InvalidRegion { start: f64, end: f64 },
    /// A responsive variant's setup failed.
    Setup { variant: String, reason: String },
}

impl fmt::Display for ChoreographyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingElement(id) => write!(f, "missing element: {id}"),
            Self::StaleGeometry { captured, current } => write!(
                f,
                "stale geometry: captured in layout epoch {captured}, current epoch {current}"
            ),
            Self::VariantConflict { group, variants } => write!(
                f,
                "variants {} of exclusive group {group} are active together",
                variants.join(", ")
            ),
            Self::InvalidRegion { start, end } => {
                write!(f, "region end {end} resolves before start {start}")
            }
            Self::Setup { variant, reason } => {
                write!(f, "setup of variant {variant} failed: {reason}")
            }
        }
    }
}

impl std::error::Error for ChoreographyError {}

/// Fail with [`ChoreographyError::MissingElement`] unless `present`.
pub fn require(element: &ElementId, present: bool) -> Result<(), ChoreographyError> {
    if present {
        Ok(())
    } else {
        Err(ChoreographyError::MissingElement(element.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ChoreographyError::MissingElement(ElementId::from_static(".story-track"));
        assert_eq!(err.to_string(), "missing element: .story-track");

        let err = ChoreographyError::VariantConflict {
            group: "divider".into(),
            variants: vec!["desktop".into(), "compact".into()],
        };
        assert!(err.to_string().contains("desktop, compact"));
    }

    #[test]
    fn require_element() {
        let id = ElementId::from_static("#peek");
        assert!(require(&id, true).is_ok());
        assert_eq!(
            require(&id, false),
            Err(ChoreographyError::MissingElement(id))
        );
    }
}
