#![forbid(unsafe_code)]

//! Responsive condition router.
//!
//! Variants are registered as data: a name, an optional exclusive group, a
//! [`ViewportCondition`], and a setup closure that may return a teardown.
//! Every [`ResponsiveRouter::evaluate`] reconciles the active set against the
//! viewport:
//!
//! 1. All conditions are evaluated against the same viewport snapshot.
//! 2. Teardowns of variants whose condition became false run first.
//! 3. Setups of variants whose condition became true run afterwards.
//!
//! A variant whose condition stays true is left alone; setup never runs twice
//! without an intervening teardown. When a setup fails the failure is logged
//! and the variant is considered active with nothing to tear down, so it is
//! not retried until its condition goes false and true again.
//!
//! The context `C` is whatever the setups mutate (the stage in practice).

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use scrollstage_core::error::ChoreographyError;
use scrollstage_core::viewport::{Viewport, ViewportCondition};

/// Undo a variant's setup.
pub type Teardown<C> = Box<dyn FnOnce(&mut C)>;

/// Install a variant. `Ok(None)` means there is nothing to undo.
pub type Setup<C> = Box<dyn FnMut(&mut C) -> Result<Option<Teardown<C>>, ChoreographyError>>;

/// Box a teardown closure.
pub fn teardown<C>(f: impl FnOnce(&mut C) + 'static) -> Option<Teardown<C>> {
    Some(Box::new(f))
}

enum VariantState<C> {
    Inactive,
    Active(Option<Teardown<C>>),
}

struct Variant<C> {
    name: Cow<'static, str>,
    group: Option<Cow<'static, str>>,
    condition: ViewportCondition,
    setup: Setup<C>,
    state: VariantState<C>,
}

impl<C> Variant<C> {
    fn is_active(&self) -> bool {
        matches!(self.state, VariantState::Active(_))
    }
}

/// What one evaluation changed, in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouterPass {
    pub deactivated: Vec<String>,
    pub activated: Vec<String>,
    /// Variants whose setup returned an error during this pass.
    pub failed: Vec<String>,
    /// Exclusive groups left with more than one active variant.
    pub conflicts: Vec<ChoreographyError>,
}

impl RouterPass {
    /// Whether anything was torn down or set up.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.deactivated.is_empty() || !self.activated.is_empty()
    }
}

/// Table-driven media-condition router.
pub struct ResponsiveRouter<C> {
    variants: Vec<Variant<C>>,
    last_viewport: Option<Viewport>,
    passes: u64,
}

impl<C> Default for ResponsiveRouter<C> {
    fn default() -> Self {
        Self {
            variants: Vec::new(),
            last_viewport: None,
            passes: 0,
        }
    }
}

impl<C> fmt::Debug for ResponsiveRouter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponsiveRouter")
            .field("variants", &self.variants.iter().map(|v| &v.name).collect::<Vec<_>>())
            .field("active", &self.active_variants().collect::<Vec<_>>())
            .field("last_viewport", &self.last_viewport)
            .field("passes", &self.passes)
            .finish()
    }
}

impl<C> ResponsiveRouter<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variant. Registration order is execution order within
    /// each phase. Re-registering a name replaces the previous entry, which
    /// must not be active.
    pub fn register(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        group: Option<&'static str>,
        condition: ViewportCondition,
        setup: impl FnMut(&mut C) -> Result<Option<Teardown<C>>, ChoreographyError> + 'static,
    ) -> &mut Self {
        let name = name.into();
        let variant = Variant {
            name: name.clone(),
            group: group.map(Cow::Borrowed),
            condition,
            setup: Box::new(setup),
            state: VariantState::Inactive,
        };
        match self.variants.iter_mut().find(|v| v.name == name) {
            Some(slot) if !slot.is_active() => *slot = variant,
            Some(_) => {
                tracing::warn!(variant = %name, "refusing to replace an active variant");
            }
            None => self.variants.push(variant),
        }
        self
    }

    /// Reconcile active variants with `viewport`.
    pub fn evaluate(&mut self, viewport: &Viewport, cx: &mut C) -> RouterPass {
        self.passes += 1;
        self.last_viewport = Some(*viewport);

        let wanted: Vec<bool> = self
            .variants
            .iter()
            .map(|v| v.condition.matches(viewport))
            .collect();

        tracing::trace!(
            pass = self.passes,
            width = viewport.width,
            height = viewport.height,
            "responsive evaluate starting"
        );

        let mut pass = RouterPass::default();

        // Teardowns first so a later setup never observes a stale sibling.
        for (variant, &now) in self.variants.iter_mut().zip(&wanted) {
            if now || !variant.is_active() {
                continue;
            }
            let state = std::mem::replace(&mut variant.state, VariantState::Inactive);
            if let VariantState::Active(Some(undo)) = state {
                undo(cx);
            }
            tracing::debug!(variant = %variant.name, "variant torn down");
            pass.deactivated.push(variant.name.to_string());
        }

        for (variant, &now) in self.variants.iter_mut().zip(&wanted) {
            if !now || variant.is_active() {
                continue;
            }
            match (variant.setup)(cx) {
                Ok(undo) => {
                    tracing::debug!(variant = %variant.name, "variant set up");
                    variant.state = VariantState::Active(undo);
                }
                Err(err) => {
                    tracing::warn!(variant = %variant.name, error = %err, "variant setup failed");
                    variant.state = VariantState::Active(None);
                    pass.failed.push(variant.name.to_string());
                }
            }
            pass.activated.push(variant.name.to_string());
        }

        pass.conflicts = self.conflicts();
        for conflict in &pass.conflicts {
            tracing::warn!(error = %conflict, "exclusive variants overlap");
        }
        pass
    }

    /// Re-run [`evaluate`](Self::evaluate) with the last viewport, if any.
    pub fn reevaluate(&mut self, cx: &mut C) -> Option<RouterPass> {
        let viewport = self.last_viewport?;
        Some(self.evaluate(&viewport, cx))
    }

    /// Tear down every active variant in registration order.
    pub fn teardown_all(&mut self, cx: &mut C) -> Vec<String> {
        let mut torn = Vec::new();
        for variant in &mut self.variants {
            let state = std::mem::replace(&mut variant.state, VariantState::Inactive);
            if let VariantState::Active(undo) = state {
                if let Some(undo) = undo {
                    undo(cx);
                }
                torn.push(variant.name.to_string());
            }
        }
        self.last_viewport = None;
        torn
    }

    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.variants.iter().any(|v| v.name == name && v.is_active())
    }

    /// Names of active variants in registration order.
    pub fn active_variants(&self) -> impl Iterator<Item = &str> {
        self.variants
            .iter()
            .filter(|v| v.is_active())
            .map(|v| v.name.as_ref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Number of evaluations so far.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    fn conflicts(&self) -> Vec<ChoreographyError> {
        let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for variant in self.variants.iter().filter(|v| v.is_active()) {
            if let Some(group) = &variant.group {
                groups
                    .entry(group.as_ref())
                    .or_default()
                    .push(variant.name.to_string());
            }
        }
        groups
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(group, variants)| ChoreographyError::VariantConflict {
                group: group.to_owned(),
                variants,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Vec<String>;

    fn logging_variant(
        router: &mut ResponsiveRouter<Log>,
        name: &'static str,
        condition: ViewportCondition,
    ) {
        router.register(name, Some("divider"), condition, move |log: &mut Log| {
            log.push(format!("setup:{name}"));
            Ok(teardown(move |log: &mut Log| log.push(format!("teardown:{name}"))))
        });
    }

    fn divider_router() -> ResponsiveRouter<Log> {
        let mut router = ResponsiveRouter::new();
        logging_variant(&mut router, "desktop", ViewportCondition::any().min_width(1024.0));
        logging_variant(&mut router, "compact", ViewportCondition::any().below_width(1024.0));
        router
    }

    #[test]
    fn teardown_runs_before_setup() {
        let mut router = divider_router();
        let mut log = Log::new();

        router.evaluate(&Viewport::desktop(1280.0, 800.0), &mut log);
        assert_eq!(log, vec!["setup:desktop"]);

        let pass = router.evaluate(&Viewport::desktop(800.0, 800.0), &mut log);
        assert_eq!(log, vec!["setup:desktop", "teardown:desktop", "setup:compact"]);
        assert_eq!(pass.deactivated, vec!["desktop"]);
        assert_eq!(pass.activated, vec!["compact"]);
        assert!(pass.conflicts.is_empty());
    }

    #[test]
    fn unchanged_condition_does_not_rerun_setup() {
        let mut router = divider_router();
        let mut log = Log::new();
        router.evaluate(&Viewport::desktop(1280.0, 800.0), &mut log);
        let pass = router.evaluate(&Viewport::desktop(1440.0, 900.0), &mut log);
        assert!(!pass.changed());
        assert_eq!(log, vec!["setup:desktop"]);
    }

    #[test]
    fn failed_setup_stays_active_without_teardown() {
        let mut router: ResponsiveRouter<Log> = ResponsiveRouter::new();
        router.register("broken", None, ViewportCondition::any(), |_log: &mut Log| {
            Err(ChoreographyError::Setup {
                variant: "broken".into(),
                reason: "no hero".into(),
            })
        });
        let mut log = Log::new();
        let pass = router.evaluate(&Viewport::desktop(1280.0, 800.0), &mut log);
        assert_eq!(pass.failed, vec!["broken"]);
        assert!(router.is_active("broken"));

        // Not retried while the condition holds.
        let pass = router.evaluate(&Viewport::desktop(1280.0, 800.0), &mut log);
        assert!(pass.failed.is_empty());
        assert_eq!(router.teardown_all(&mut log), vec!["broken"]);
        assert!(log.is_empty());
    }

    #[test]
    fn failed_setup_does_not_block_later_variants() {
        let mut router: ResponsiveRouter<Log> = ResponsiveRouter::new();
        router.register("broken", None, ViewportCondition::any(), |_log: &mut Log| {
            Err(ChoreographyError::Setup {
                variant: "broken".into(),
                reason: "no hero".into(),
            })
        });
        router.register("healthy", None, ViewportCondition::any(), |log: &mut Log| {
            log.push("setup:healthy".to_string());
            Ok(teardown(|log: &mut Log| log.push("teardown:healthy".to_string())))
        });

        let mut log = Log::new();
        let pass = router.evaluate(&Viewport::desktop(1280.0, 800.0), &mut log);
        assert_eq!(pass.failed, vec!["broken"]);
        assert_eq!(pass.activated, vec!["broken", "healthy"]);
        assert_eq!(log, vec!["setup:healthy"]);
        assert!(router.is_active("healthy"));

        assert_eq!(router.teardown_all(&mut log), vec!["broken", "healthy"]);
        assert_eq!(log, vec!["setup:healthy", "teardown:healthy"]);
    }

    #[test]
    fn overlapping_group_is_reported() {
        let mut router = ResponsiveRouter::new();
        logging_variant(&mut router, "wide", ViewportCondition::any().min_width(800.0));
        logging_variant(&mut router, "any", ViewportCondition::any());
        let mut log = Log::new();
        let pass = router.evaluate(&Viewport::desktop(1280.0, 800.0), &mut log);
        assert_eq!(
            pass.conflicts,
            vec![ChoreographyError::VariantConflict {
                group: "divider".into(),
                variants: vec!["wide".into(), "any".into()],
            }]
        );
    }

    #[test]
    fn teardown_all_clears_and_forgets_viewport() {
        let mut router = divider_router();
        let mut log = Log::new();
        router.evaluate(&Viewport::desktop(800.0, 600.0), &mut log);
        assert_eq!(router.teardown_all(&mut log), vec!["compact"]);
        assert_eq!(router.active_variants().count(), 0);
        assert!(router.reevaluate(&mut log).is_none());
        assert_eq!(log, vec!["setup:compact", "teardown:compact"]);
    }

    #[test]
    fn reevaluate_uses_last_viewport() {
        let mut router = divider_router();
        let mut log = Log::new();
        router.evaluate(&Viewport::desktop(1280.0, 800.0), &mut log);
        let pass = router.reevaluate(&mut log);
        assert_eq!(pass.map(|p| p.changed()), Some(false));
        assert_eq!(router.passes(), 2);
    }
}
