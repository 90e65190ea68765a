#![forbid(unsafe_code)]

//! Page composition.
//!
//! [`Choreographer`] wires every behavior of the page onto one [`Stage`]:
//! the hero glow, the horizontal story track, the pinned panels, the
//! responsive divider, the floating ticket, the sign flicker, the peek drag
//! and the entrance sequence. The host drives it through six entry points:
//!
//! | Entry point | Effect |
//! |-------------|--------|
//! | [`load`](Choreographer::load) | Bind regions, play the entrance, start timers, route variants |
//! | [`scroll`](Choreographer::scroll) | Mark the page dirty; evaluated on the next frame |
//! | [`resize`](Choreographer::resize) | Re-route variants, invalidate cached geometry |
//! | [`pointer`](Choreographer::pointer) | Drag first, then area listeners |
//! | [`frame`](Choreographer::frame) | Advance timers, evaluate regions at most once |
//! | [`teardown`](Choreographer::teardown) | Undo everything `load` installed |
//!
//! Missing elements never fail a load: the dependent behavior is skipped
//! with a `debug` event.

use std::time::Duration;

use scrollstage_core::crossing::Crossing;
use scrollstage_core::element::{ElementId, Prop};
use scrollstage_core::geometry::{Axis, Reduction, ViewportGeometry};
use scrollstage_core::host::{AnimationEngine, LayoutProvider};
use scrollstage_core::pointer::PointerEvent;
use scrollstage_core::viewport::Viewport;

use crate::cancellation::CancellationSource;
use crate::config::{ChoreographyConfig, ConfigError};
use crate::divider::register_divider;
use crate::drag::{DragOutcome, PointerDrag};
use crate::entrance::play_entrance;
use crate::flicker::FlickerLoop;
use crate::region::{Anchor, BindingId, Extent, RegionUpdate, ScrollRegion, Scrub, ScrubTween};
use crate::router::{ResponsiveRouter, RouterPass};
use crate::stage::Stage;
use crate::ticket::{TicketSnapshot, TicketStateMachine, TicketTrigger};

/// Region bindings created by [`Choreographer::load`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageBindings {
    pub glow: Option<BindingId>,
    pub story: Option<BindingId>,
    pub panels_pin: Option<BindingId>,
    pub panel_fades: Vec<BindingId>,
    pub ticket_zone: Option<BindingId>,
}

pub struct Choreographer<E, L> {
    config: ChoreographyConfig,
    stage: Stage<E, L>,
    router: ResponsiveRouter<Stage<E, L>>,
    ticket: TicketStateMachine,
    drag: Option<PointerDrag>,
    flicker: Option<FlickerLoop>,
    flicker_source: CancellationSource,
    bindings: PageBindings,
    viewport: Option<Viewport>,
    now: Duration,
    dirty: bool,
    loaded: bool,
}

impl<E, L> Choreographer<E, L>
where
    E: AnimationEngine + 'static,
    L: LayoutProvider + 'static,
{
    /// Validate `config` and register the responsive variants.
    pub fn new(config: ChoreographyConfig, engine: E, layout: L) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        let mut router = ResponsiveRouter::new();
        register_divider(&mut router, config.divider_config()?);
        let ticket = TicketStateMachine::new(config.ticket_config());
        let drag = config
            .elements
            .peek
            .clone()
            .map(|peek| PointerDrag::new(peek, config.drag_config()));

        Ok(Self {
            config,
            stage: Stage::new(engine, layout),
            router,
            ticket,
            drag,
            flicker: None,
            flicker_source: CancellationSource::new(),
            bindings: PageBindings::default(),
            viewport: None,
            now: Duration::ZERO,
            dirty: false,
            loaded: false,
        })
    }

    /// Install every page behavior for `viewport`.
    ///
    /// Loading twice without a [`teardown`](Self::teardown) in between only
    /// re-routes the variants.
    pub fn load(&mut self, viewport: Viewport) -> RouterPass {
        if self.loaded {
            tracing::debug!("already loaded, re-routing only");
            return self.resize(viewport);
        }
        self.loaded = true;

        self.bind_glow();
        self.bind_story();
        self.bind_panels();
        self.bind_ticket_zone();

        let started = play_entrance(&self.config.entrance_steps(), &mut self.stage.cx());
        tracing::debug!(tweens = started, "entrance started");

        if self.stage.contains(&self.config.elements.sign) {
            self.flicker_source = CancellationSource::new();
            self.flicker = Some(FlickerLoop::new(
                self.config.flicker_config(),
                self.flicker_source.token(),
            ));
        } else {
            tracing::debug!(element = %self.config.elements.sign, "sign missing, flicker skipped");
        }

        self.viewport = Some(viewport);
        self.dirty = true;
        self.router.evaluate(&viewport, &mut self.stage)
    }

    /// The page scrolled. Evaluated on the next frame.
    pub fn scroll(&mut self) {
        self.dirty = true;
    }

    /// The viewport changed size or input capabilities.
    pub fn resize(&mut self, viewport: Viewport) -> RouterPass {
        self.viewport = Some(viewport);
        let pass = self.router.evaluate(&viewport, &mut self.stage);
        self.stage.refresh();
        self.ticket.invalidate_geometry();
        self.dirty = true;
        pass
    }

    /// Route a pointer event: the peek drag gets first refusal.
    pub fn pointer(&mut self, event: &PointerEvent) -> DragOutcome {
        if let Some(drag) = &mut self.drag {
            let mut cx = self.stage.cx();
            let outcome = drag.handle(event, &mut *cx.engine, cx.layout);
            if outcome.consumed() {
                return outcome;
            }
        }
        self.stage.dispatch_pointer(event);
        DragOutcome::Ignored
    }

    /// Advance the host clock by `dt` and evaluate regions if anything
    /// changed. Returns the region updates of this frame.
    pub fn frame(&mut self, dt: Duration) -> Vec<RegionUpdate> {
        self.now += dt;
        if let Some(flicker) = &mut self.flicker {
            flicker.poll(self.now, self.stage.engine_mut());
        }

        if !self.dirty && !self.stage.needs_frame() {
            self.stage.prune_handles();
            return Vec::new();
        }
        self.dirty = false;

        let updates = self.stage.frame(dt);
        if let Some(zone) = self.bindings.ticket_zone
            && let Some(update) = updates.iter().find(|u| u.id == zone)
        {
            let mut cx = self.stage.cx();
            if let Some(drag) = &mut self.drag {
                let reveals = self.ticket.is_hidden()
                    && update
                        .crossings
                        .iter()
                        .any(|c| matches!(c, Crossing::Enter | Crossing::EnterBack));
                if reveals {
                    drag.set_enabled(false, &mut *cx.engine);
                }
                self.ticket.set_peek_translation(drag.offset());
            }
            self.ticket.apply(update, &mut *cx.engine, cx.layout);
            if let Some(drag) = &mut self.drag {
                drag.set_enabled(self.ticket.is_hidden(), &mut *cx.engine);
            }
        }
        updates
    }

    /// Undo everything [`load`](Self::load) installed.
    pub fn teardown(&mut self) {
        let torn = self.router.teardown_all(&mut self.stage);
        self.flicker_source.cancel();
        if let Some(mut flicker) = self.flicker.take() {
            flicker.poll(self.now, self.stage.engine_mut());
        }
        self.ticket.reset(self.stage.engine_mut());
        if let Some(drag) = &mut self.drag {
            drag.reset(self.stage.engine_mut());
            drag.set_enabled(true, self.stage.engine_mut());
        }
        self.stage.clear();
        self.bindings = PageBindings::default();
        self.loaded = false;
        self.dirty = false;
        tracing::debug!(variants = ?torn, "page torn down");
    }

    pub fn pause_ticket_animations(&mut self) {
        self.ticket.pause_animations(self.stage.engine_mut());
    }

    pub fn resume_ticket_animations(&mut self) {
        self.ticket.resume_animations(self.stage.engine_mut());
    }

    #[must_use]
    pub fn config(&self) -> &ChoreographyConfig {
        &self.config
    }

    #[must_use]
    pub fn stage(&self) -> &Stage<E, L> {
        &self.stage
    }

    /// Mutable stage access for hosts that model the page in memory.
    pub fn stage_mut(&mut self) -> &mut Stage<E, L> {
        &mut self.stage
    }

    #[must_use]
    pub fn router(&self) -> &ResponsiveRouter<Stage<E, L>> {
        &self.router
    }

    #[must_use]
    pub fn bindings(&self) -> &PageBindings {
        &self.bindings
    }

    #[must_use]
    pub fn ticket_snapshot(&self) -> TicketSnapshot {
        self.ticket.snapshot()
    }

    #[must_use]
    pub fn drag(&self) -> Option<&PointerDrag> {
        self.drag.as_ref()
    }

    #[must_use]
    pub fn is_variant_active(&self, name: &str) -> bool {
        self.router.is_active(name)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Host time accumulated from [`frame`](Self::frame).
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Whether the next frame has work to do.
    #[must_use]
    pub fn needs_frame(&self) -> bool {
        self.dirty || self.stage.needs_frame()
    }

    fn bind(
        &mut self,
        label: &'static str,
        region: ScrollRegion,
        tween: Option<ScrubTween>,
    ) -> Option<BindingId> {
        match self.stage.bind_region(label, region, tween) {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::debug!(binding = label, error = %err, "region skipped");
                None
            }
        }
    }

    fn bind_glow(&mut self) {
        let el = &self.config.elements;
        let region = ScrollRegion::between(
            Anchor::top_top(el.hero.clone()),
            Anchor::bottom_top(el.hero.clone()),
        )
        .scrub(Scrub::Instant);
        let tween = ScrubTween::new(el.glow.clone()).fixed(
            Prop::Opacity,
            0.0,
            self.config.glow.target_opacity,
        );
        self.bindings.glow = self.bind("glow", region, Some(tween));
    }

    fn bind_story(&mut self) {
        let el = &self.config.elements;
        let geometry = ViewportGeometry::new(el.story_track.clone())
            .axis(Axis::Horizontal)
            .reduction(Reduction::Fraction(self.config.story.distance_fraction));
        let lag = Duration::try_from_secs_f64(self.config.story.scrub_lag_secs).unwrap_or_default();
        let region = ScrollRegion::spanning(
            Anchor::top_top(el.story_panels.clone()),
            Extent::Distance(geometry.clone()),
        )
        .pinned()
        .scrub(Scrub::Smoothed(lag));
        let tween = ScrubTween::new(el.story_track.clone()).distance(Prop::X, 0.0, geometry, -1.0);
        self.bindings.story = self.bind("story", region, Some(tween));
    }

    fn bind_panels(&mut self) {
        let el = &self.config.elements;
        let panels = &self.config.panels;
        let pin = ScrollRegion::spanning(
            Anchor::top_top(el.pinned.clone()),
            Extent::ViewportHeights(panels.pin_viewport_heights),
        )
        .pinned()
        .scrub(Scrub::None);

        let fades: Vec<(ScrollRegion, ScrubTween)> = el
            .panels
            .iter()
            .map(|ids| {
                let region = ScrollRegion::between(
                    Anchor::new(ids.panel.clone(), 0.0, panels.fade_start),
                    Anchor::new(ids.panel.clone(), 1.0, panels.fade_end),
                );
                let tween = ScrubTween::new(ids.inner.clone())
                    .fixed(Prop::Opacity, panels.from_opacity, 1.0)
                    .fixed(Prop::Y, panels.from_y, 0.0)
                    .fixed(Prop::Scale, panels.from_scale, 1.0);
                (region, tween)
            })
            .collect();

        self.bindings.panels_pin = self.bind("panels-pin", pin, None);
        self.bindings.panel_fades = fades
            .into_iter()
            .filter_map(|(region, tween)| self.bind("panel-fade", region, Some(tween)))
            .collect();
    }

    fn bind_ticket_zone(&mut self) {
        let el = &self.config.elements;
        let start = match self.config.ticket.trigger {
            TicketTrigger::AboutZone => Anchor::new(el.about.clone(), 0.0, 0.5),
            TicketTrigger::PanelsEntry => Anchor::new(el.pinned.clone(), 0.0, 1.0),
        };
        let region = ScrollRegion::between(start, Anchor::bottom_bottom(el.footer.clone()));
        let ticket: &ElementId = &self.config.elements.ticket;
        if !self.stage.contains(ticket) {
            tracing::debug!(element = %ticket, "ticket missing, zone skipped");
            return;
        }
        self.bindings.ticket_zone = self.bind("ticket-zone", region, None);
    }
}

impl<E, L> std::fmt::Debug for Choreographer<E, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Choreographer")
            .field("loaded", &self.loaded)
            .field("now", &self.now)
            .field("dirty", &self.dirty)
            .field("bindings", &self.bindings)
            .field("ticket", &self.ticket.state())
            .field("variants", &self.router.active_variants().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use scrollstage_core::element::Prop;

    use super::*;
    use crate::divider::{COMPACT_VARIANT, DESKTOP_VARIANT};
    use crate::testkit::{FakeEngine, FakeLayout};
    use crate::ticket::TicketZoneState;

    const DT: Duration = Duration::from_millis(16);

    fn page() -> FakeLayout {
        FakeLayout::new(1280.0, 800.0)
            .with_box("#hero", 0.0, 0.0, 1280.0, 800.0)
            .with_box(".neon-glow", 100.0, 0.0, 600.0, 200.0)
            .with_box(".vintage-sign", 600.0, 0.0, 300.0, 80.0)
            .with_box("#story-panels", 800.0, 0.0, 1280.0, 800.0)
            .with_box(".story-track", 800.0, 0.0, 1280.0, 800.0)
            .with_extent(".story-track", 3000.0)
            .with_box("#divider", 1600.0, 0.0, 1280.0, 4.0)
            .with_box("#about", 2000.0, 0.0, 1280.0, 1200.0)
            .with_box("#footer", 3200.0, 0.0, 1280.0, 600.0)
            .with_box("#ticket", 3300.0, 0.0, 200.0, 100.0)
    }

    fn choreographer(layout: FakeLayout) -> Choreographer<FakeEngine, FakeLayout> {
        Choreographer::new(ChoreographyConfig::default(), FakeEngine::default(), layout).unwrap()
    }

    fn scroll_to(c: &mut Choreographer<FakeEngine, FakeLayout>, y: f64) {
        c.stage_mut().layout_mut().scroll = y;
        c.scroll();
        c.frame(DT);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ChoreographyConfig::default();
        config.glow.target_opacity = -1.0;
        let err = Choreographer::new(config, FakeEngine::default(), page()).err();
        assert!(matches!(err, Some(ConfigError::Validation(_))));
    }

    #[test]
    fn load_binds_present_elements_and_skips_missing() {
        let mut c = choreographer(page());
        let pass = c.load(Viewport::desktop(1280.0, 800.0));
        assert_eq!(pass.activated, vec![DESKTOP_VARIANT]);

        let bindings = c.bindings();
        assert!(bindings.glow.is_some());
        assert!(bindings.story.is_some());
        assert!(bindings.ticket_zone.is_some());
        // No pinned section or panels on this page.
        assert!(bindings.panels_pin.is_none());
        assert!(bindings.panel_fades.is_empty());
        assert!(c.needs_frame());
    }

    #[test]
    fn glow_follows_hero_scroll() {
        let mut c = choreographer(page());
        c.load(Viewport::desktop(1280.0, 800.0));
        scroll_to(&mut c, 400.0);
        assert_eq!(c.stage().engine().num(".neon-glow", Prop::Opacity), Some(0.5 * 0.55));
    }

    #[test]
    fn story_settles_at_full_distance() {
        let mut c = choreographer(page());
        c.load(Viewport::desktop(1280.0, 800.0));
        // Story spans [800, 800 + 1848].
        scroll_to(&mut c, 3000.0);
        for _ in 0..2000 {
            if !c.needs_frame() {
                break;
            }
            c.frame(DT);
        }
        assert_eq!(c.stage().engine().num(".story-track", Prop::X), Some(-1848.0));
    }

    #[test]
    fn ticket_zone_reveals_and_hides() {
        let mut c = choreographer(page());
        c.load(Viewport::desktop(1280.0, 800.0));
        c.frame(DT);
        assert_eq!(c.ticket_snapshot().state, TicketZoneState::Hidden);

        // Zone: about top at viewport middle (1600) to footer bottom at
        // viewport bottom (3000).
        scroll_to(&mut c, 2300.0);
        assert_eq!(c.ticket_snapshot().state, TicketZoneState::Transitioning(0.5));
        assert_eq!(c.stage().engine().keyword("#ticket", Prop::Position).as_deref(), Some("fixed"));

        scroll_to(&mut c, 0.0);
        assert_eq!(c.ticket_snapshot().state, TicketZoneState::Hidden);
        assert_eq!(c.stage().engine().keyword("#ticket", Prop::Position), None);
    }

    #[test]
    fn resize_switches_divider_variant() {
        let mut c = choreographer(page());
        c.load(Viewport::desktop(1280.0, 800.0));
        let pass = c.resize(Viewport::touch(800.0, 1000.0));
        assert_eq!(pass.deactivated, vec![DESKTOP_VARIANT]);
        assert_eq!(pass.activated, vec![COMPACT_VARIANT]);
        assert!(c.is_variant_active(COMPACT_VARIANT));
    }

    #[test]
    fn flicker_fires_on_first_frame() {
        let mut c = choreographer(page());
        c.load(Viewport::desktop(1280.0, 800.0));
        c.frame(DT);
        let opacity = c.stage().engine().num(".vintage-sign", Prop::Opacity);
        assert!(opacity.is_some_and(|o| (0.72..=0.88).contains(&o)));
    }

    #[test]
    fn teardown_removes_everything() {
        let mut c = choreographer(page());
        c.load(Viewport::desktop(1280.0, 800.0));
        scroll_to(&mut c, 2300.0);
        c.teardown();

        assert!(!c.is_loaded());
        assert!(c.stage().regions().is_empty());
        assert!(c.stage().listeners().is_empty());
        assert!(c.stage().engine().active.is_empty());
        assert!(c.router().active_variants().next().is_none());
        assert_eq!(c.ticket_snapshot().state, TicketZoneState::Hidden);

        // Timers stay stopped.
        let calls = c.stage().engine().calls.len();
        c.frame(Duration::from_secs(60));
        assert_eq!(c.stage().engine().calls.len(), calls);
    }
}
