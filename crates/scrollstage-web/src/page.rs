#![forbid(unsafe_code)]

//! The reference page used by scenario tests and demos.
//!
//! Element ids match [`ChoreographyConfig::default`]. Document positions
//! (1280×800 viewport):
//!
//! ```text
//!     0 ┌ #hero ─────────────── 800
//!   800 ├ #story-panels ─────── 800   (.story-track scrolls 3000 wide)
//!  1600 ├ #pinned ───────────── 800   (panels at 2400, 3000, 3600)
//!  4200 ├ #divider               4
//!  4400 ├ #about ────────────── 1200
//!  5600 └ #footer ───────────── 600   (document ends at 6200)
//! ```
//!
//! The peek badge is fixed at viewport `(700, 1100)`.
//!
//! [`ChoreographyConfig::default`]: scrollstage_runtime::config::ChoreographyConfig

use scrollstage_core::geometry::BoxRect;
use scrollstage_core::viewport::Viewport;

use crate::layout::StaticLayout;

pub const VIEWPORT_WIDTH: f64 = 1280.0;
pub const VIEWPORT_HEIGHT: f64 = 800.0;
pub const STORY_SCROLL_WIDTH: f64 = 3000.0;

/// Desktop viewport of the reference page.
#[must_use]
pub const fn demo_viewport() -> Viewport {
    Viewport::desktop(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
}

fn full(top: f64, height: f64) -> BoxRect {
    BoxRect::new(top, 0.0, VIEWPORT_WIDTH, height)
}

#[must_use]
pub fn demo_page() -> StaticLayout {
    let mut page = StaticLayout::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
        .with_element("#hero", full(0.0, 800.0))
        .with_element(".neon-glow", BoxRect::new(100.0, 200.0, 880.0, 300.0))
        .with_element(".vintage-sign", BoxRect::new(600.0, 900.0, 300.0, 80.0))
        .with_element("#line-1", BoxRect::new(180.0, 80.0, 900.0, 120.0))
        .with_element("#line-2", BoxRect::new(300.0, 80.0, 900.0, 120.0))
        .with_element("#line-3", BoxRect::new(420.0, 80.0, 900.0, 120.0))
        .with_element(".hero-main-photo", BoxRect::new(0.0, 640.0, 640.0, 800.0))
        .with_element("#cta-primary", BoxRect::new(600.0, 80.0, 200.0, 56.0))
        .with_element("#cta-secondary", BoxRect::new(600.0, 300.0, 200.0, 56.0))
        .with_element(".hero-sign", BoxRect::new(700.0, 900.0, 300.0, 60.0))
        .with_element("#story-panels", full(800.0, 800.0))
        .with_element(".story-track", full(800.0, 800.0))
        .with_scroll_width(".story-track", STORY_SCROLL_WIDTH)
        .with_element("#pinned", full(1600.0, 800.0))
        .with_element("#divider", full(4200.0, 4.0))
        .with_element("#about", full(4400.0, 1200.0))
        .with_element("#footer", full(5600.0, 600.0))
        .with_element("#ticket", BoxRect::new(5700.0, 500.0, 240.0, 120.0))
        .with_fixed("#peek", BoxRect::new(700.0, 1100.0, 120.0, 60.0));

    for (n, top) in [(1, 2400.0), (2, 3000.0), (3, 3600.0)] {
        page = page
            .with_element(format!("#panel-{n}"), full(top, 600.0))
            .with_element(
                format!("#panel-{n} .panel-inner"),
                BoxRect::new(top + 60.0, 160.0, 960.0, 480.0),
            );
    }
    page
}

#[cfg(test)]
mod tests {
    use scrollstage_core::element::ElementId;
    use scrollstage_core::host::LayoutProvider;
    use scrollstage_runtime::config::ChoreographyConfig;

    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn page_has_every_configured_element() {
        let page = demo_page();
        let config = ChoreographyConfig::default();
        let el = &config.elements;
        let mut ids: Vec<&ElementId> = vec![
            &el.hero,
            &el.glow,
            &el.sign,
            &el.story_panels,
            &el.story_track,
            &el.pinned,
            &el.divider,
            &el.about,
            &el.footer,
            &el.ticket,
        ];
        ids.extend(el.peek.iter());
        ids.extend(el.panels.iter().flat_map(|p| [&p.panel, &p.inner]));
        ids.extend(config.entrance.steps.iter().flat_map(|s| s.targets.iter()));
        let missing: Vec<&str> = ids
            .into_iter()
            .filter(|id| !page.contains(id))
            .map(ElementId::as_str)
            .collect();
        assert_eq!(missing, Vec::<&str>::new());
    }

    #[test]
    fn document_is_6200_tall() {
        assert_eq!(demo_page().max_scroll(), 5400.0);
    }
}
