#![forbid(unsafe_code)]

//! Responsive behaviors of the section divider.
//!
//! Two variants share the exclusive group [`DIVIDER_GROUP`]:
//!
//! - **desktop**: pointer parallax. Moving over the hero tilts and shifts
//!   the divider proportionally to the pointer's normalized position;
//!   leaving the hero animates it back to rest.
//! - **compact**: the divider's `ScaleX` is scrubbed from 0 to 1 as it
//!   scrolls into view.
//!
//! Each teardown removes exactly what its setup installed: listeners, tweens
//! owned by the variant, the scroll binding, and the inline styles written.

use std::time::Duration;

use scrollstage_core::element::{ElementId, Prop, Props, Timing};
use scrollstage_core::error::ChoreographyError;
use scrollstage_core::host::{AnimationEngine, LayoutProvider};
use scrollstage_core::pointer::{PointerEvent, PointerEventKind};
use scrollstage_core::viewport::ViewportCondition;

use crate::region::{Anchor, ScrollRegion, ScrubTween, Scrub};
use crate::router::{ResponsiveRouter, teardown};
use crate::stage::{FrameCx, Stage};

pub const DIVIDER_GROUP: &str = "divider";
pub const DESKTOP_VARIANT: &str = "divider-desktop";
pub const COMPACT_VARIANT: &str = "divider-compact";

const PARALLAX_PROPS: [Prop; 4] = [Prop::X, Prop::Y, Prop::RotationX, Prop::RotationY];

/// Pointer-parallax gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parallax {
    pub shift_x: f64,
    pub shift_y: f64,
    pub tilt_y: f64,
    pub tilt_x: f64,
    pub follow: Duration,
    pub reset: Duration,
}

impl Default for Parallax {
    fn default() -> Self {
        Self {
            shift_x: 26.0,
            shift_y: 18.0,
            tilt_y: 10.0,
            tilt_x: 8.0,
            follow: Duration::from_millis(500),
            reset: Duration::from_millis(700),
        }
    }
}

impl Parallax {
    /// Goal for a pointer at normalized position `(nx, ny)` in `[-0.5, 0.5]`.
    #[must_use]
    pub fn goal(&self, nx: f64, ny: f64) -> Props {
        Props::new()
            .with(Prop::X, nx * self.shift_x)
            .with(Prop::Y, ny * self.shift_y)
            .with(Prop::RotationY, nx * self.tilt_y)
            .with(Prop::RotationX, -ny * self.tilt_x)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DividerConfig {
    pub divider: ElementId,
    /// Area whose pointer movement drives the parallax.
    pub hero: ElementId,
    pub desktop: ViewportCondition,
    pub compact: ViewportCondition,
    pub parallax: Parallax,
    /// Compact scrub start and end.
    pub reveal_start: Anchor,
    pub reveal_end: Anchor,
}

impl DividerConfig {
    #[must_use]
    pub fn new(divider: impl Into<ElementId>, hero: impl Into<ElementId>) -> Self {
        let divider = divider.into();
        Self {
            reveal_start: Anchor::new(divider.clone(), 0.0, 0.9),
            reveal_end: Anchor::new(divider.clone(), 0.0, 0.4),
            divider,
            hero: hero.into(),
            desktop: ViewportCondition::any()
                .pointer(scrollstage_core::viewport::PointerKind::Fine)
                .min_width(1024.0),
            compact: ViewportCondition::any().below_width(1024.0),
            parallax: Parallax::default(),
        }
    }
}

/// Register both divider variants with `router`.
pub fn register_divider<E, L>(router: &mut ResponsiveRouter<Stage<E, L>>, config: DividerConfig)
where
    E: AnimationEngine + 'static,
    L: LayoutProvider + 'static,
{
    let desktop = config.clone();
    router.register(
        DESKTOP_VARIANT,
        Some(DIVIDER_GROUP),
        config.desktop.clone(),
        move |stage: &mut Stage<E, L>| setup_desktop(stage, &desktop),
    );
    let compact = config.clone();
    router.register(
        COMPACT_VARIANT,
        Some(DIVIDER_GROUP),
        config.compact,
        move |stage: &mut Stage<E, L>| setup_compact(stage, &compact),
    );
}

type DividerTeardown<E, L> = Option<Box<dyn FnOnce(&mut Stage<E, L>)>>;

fn setup_desktop<E, L>(
    stage: &mut Stage<E, L>,
    config: &DividerConfig,
) -> Result<DividerTeardown<E, L>, ChoreographyError>
where
    E: AnimationEngine + 'static,
    L: LayoutProvider + 'static,
{
    if !stage.contains(&config.divider) {
        tracing::debug!(element = %config.divider, "divider missing, parallax skipped");
        return Ok(None);
    }
    if !stage.contains(&config.hero) {
        tracing::debug!(element = %config.hero, "hero missing, parallax skipped");
        return Ok(None);
    }
    let divider = config.divider.clone();
    let hero = config.hero.clone();
    let parallax = config.parallax;
    stage.listen(
        DESKTOP_VARIANT,
        Some(hero.clone()),
        move |event: &PointerEvent, cx: &mut FrameCx<'_>| {
            let (goal, timing) = match event.kind {
                PointerEventKind::Move => {
                    let Some(area) = cx.layout.bounding_box(&hero) else {
                        return;
                    };
                    let n = area.normalized(event.position);
                    (
                        parallax.goal(n.x, n.y),
                        Timing::new(parallax.follow).ease("power2.out"),
                    )
                }
                PointerEventKind::Leave => (
                    parallax.goal(0.0, 0.0),
                    Timing::new(parallax.reset).ease("power2.out"),
                ),
                _ => return,
            };
            // Each goal overwrites the previous follow tween.
            cx.handles.cancel_owned(DESKTOP_VARIANT, &mut *cx.engine);
            let handle = cx.engine.animate(&divider, None, &goal, &timing);
            cx.handles.track(DESKTOP_VARIANT, handle);
        },
    )?;

    let divider = config.divider.clone();
    Ok(teardown(move |stage: &mut Stage<E, L>| {
        stage.release_owner(DESKTOP_VARIANT);
        stage.engine_mut().clear(&divider, &PARALLAX_PROPS);
    }))
}

fn setup_compact<E, L>(
    stage: &mut Stage<E, L>,
    config: &DividerConfig,
) -> Result<DividerTeardown<E, L>, ChoreographyError>
where
    E: AnimationEngine + 'static,
    L: LayoutProvider + 'static,
{
    if !stage.contains(&config.divider) {
        tracing::debug!(element = %config.divider, "divider missing, reveal skipped");
        return Ok(None);
    }
    let region = ScrollRegion::between(config.reveal_start.clone(), config.reveal_end.clone())
        .scrub(Scrub::Instant);
    let tween = ScrubTween::new(config.divider.clone()).fixed(Prop::ScaleX, 0.0, 1.0);
    let id = stage.bind_region(COMPACT_VARIANT, region, Some(tween))?;
    Ok(teardown(move |stage: &mut Stage<E, L>| {
        stage.remove_region(id);
    }))
}

#[cfg(test)]
mod tests {
    use scrollstage_core::viewport::Viewport;

    use super::*;
    use crate::testkit::{FakeEngine, FakeLayout};

    fn stage() -> Stage<FakeEngine, FakeLayout> {
        Stage::new(
            FakeEngine::default(),
            FakeLayout::new(1280.0, 800.0)
                .with_box("#hero", 0.0, 0.0, 1280.0, 800.0)
                .with_box("#divider", 1600.0, 0.0, 1280.0, 4.0),
        )
    }

    fn router() -> ResponsiveRouter<Stage<FakeEngine, FakeLayout>> {
        let mut router = ResponsiveRouter::new();
        register_divider(&mut router, DividerConfig::new("#divider", "#hero"));
        router
    }

    #[test]
    fn desktop_parallax_follows_pointer_and_resets() {
        let mut stage = stage();
        let mut router = router();
        router.evaluate(&Viewport::desktop(1280.0, 800.0), &mut stage);
        assert!(router.is_active(DESKTOP_VARIANT));

        stage.dispatch_pointer(&PointerEvent::moved(1, 1280.0 * 0.75, 200.0));
        assert_eq!(stage.engine().num("#divider", Prop::X), Some(0.25 * 26.0));
        assert_eq!(stage.engine().num("#divider", Prop::RotationX), Some(0.25 * 8.0));

        stage.dispatch_pointer(&PointerEvent::leave(1));
        assert_eq!(stage.engine().num("#divider", Prop::X), Some(0.0));
    }

    #[test]
    fn pointer_moves_keep_a_single_parallax_tween() {
        let mut stage = stage();
        let mut router = router();
        router.evaluate(&Viewport::desktop(1280.0, 800.0), &mut stage);

        for i in 0..1000 {
            let x = f64::from(i % 1280);
            stage.dispatch_pointer(&PointerEvent::moved(1, x, 200.0));
        }
        assert_eq!(stage.handles().len(), 1);
        assert_eq!(stage.engine().active.len(), 1);
        assert_eq!(
            stage.engine().num("#divider", Prop::X),
            Some((999.0 / 1280.0 - 0.5) * 26.0)
        );
    }

    #[test]
    fn switching_to_compact_detaches_parallax() {
        let mut stage = stage();
        let mut router = router();
        router.evaluate(&Viewport::desktop(1280.0, 800.0), &mut stage);
        stage.dispatch_pointer(&PointerEvent::moved(1, 100.0, 100.0));
        let handle = stage.handles().handles_of(DESKTOP_VARIANT).next();

        let pass = router.evaluate(&Viewport::desktop(800.0, 800.0), &mut stage);
        assert_eq!(pass.deactivated, vec![DESKTOP_VARIANT]);
        assert_eq!(pass.activated, vec![COMPACT_VARIANT]);
        assert_eq!(stage.listeners().owned_by(DESKTOP_VARIANT), 0);
        assert!(handle.is_some_and(|h| !stage.engine().is_active(h)));
        assert_eq!(stage.engine().num("#divider", Prop::X), None);

        // No listener fires after teardown.
        let calls = stage.engine().calls.len();
        stage.dispatch_pointer(&PointerEvent::moved(1, 200.0, 100.0));
        assert_eq!(stage.engine().calls.len(), calls);
    }

    #[test]
    fn compact_scrubs_scale_and_cleans_up() {
        let mut stage = stage();
        let mut router = router();
        router.evaluate(&Viewport::touch(600.0, 800.0), &mut stage);
        assert!(router.is_active(COMPACT_VARIANT));

        // start = 1600 − 720 = 880, end = 1600 − 320 = 1280.
        stage.layout_mut().scroll = 1080.0;
        stage.frame(Duration::from_millis(16));
        assert_eq!(stage.engine().num("#divider", Prop::ScaleX), Some(0.5));

        router.evaluate(&Viewport::desktop(1280.0, 800.0), &mut stage);
        assert!(stage.regions().is_empty());
        assert_eq!(stage.engine().num("#divider", Prop::ScaleX), None);
    }

    #[test]
    fn fractional_breakpoint_width_routes_to_compact() {
        let mut stage = stage();
        let mut router = router();
        for (width, variant) in [(1023.5, COMPACT_VARIANT), (1024.0, DESKTOP_VARIANT)] {
            router.evaluate(&Viewport::desktop(width, 800.0), &mut stage);
            let active: Vec<&str> = router.active_variants().collect();
            assert_eq!(active, vec![variant], "width {width}");
        }
    }

    #[test]
    fn missing_hero_skips_parallax_quietly() {
        let mut stage = Stage::new(
            FakeEngine::default(),
            FakeLayout::new(1280.0, 800.0).with_box("#divider", 1600.0, 0.0, 1280.0, 4.0),
        );
        let mut router = router();
        let pass = router.evaluate(&Viewport::desktop(1280.0, 800.0), &mut stage);
        assert!(pass.failed.is_empty());
        assert_eq!(pass.activated, vec![DESKTOP_VARIANT]);
        assert!(stage.listeners().is_empty());
    }

    #[test]
    fn missing_divider_registers_nothing() {
        let mut stage = Stage::new(FakeEngine::default(), FakeLayout::new(1280.0, 800.0));
        let mut router = router();
        let pass = router.evaluate(&Viewport::desktop(1280.0, 800.0), &mut stage);
        assert!(pass.failed.is_empty());
        assert!(stage.listeners().is_empty());
    }
}
