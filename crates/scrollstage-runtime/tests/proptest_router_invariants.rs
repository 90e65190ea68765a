//! Property-based invariants for the responsive router.
//!
//! 1. At most one variant of an exclusive group is active after any pass.
//! 2. Within a pass every teardown runs before any setup.
//! 3. Setup and teardown alternate per variant; a variant is never set up
//!    twice without a teardown in between.
//! 4. The active set after a pass is exactly the set of matching conditions.
//! 5. Width-complementary variants cover every width: exactly one of them is
//!    active, fractional widths at the breakpoint included.

use proptest::prelude::*;
use scrollstage_core::viewport::{Viewport, ViewportCondition};
use scrollstage_runtime::router::{ResponsiveRouter, teardown};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Setup(&'static str),
    Teardown(&'static str),
}

type Log = Vec<Event>;

const VARIANTS: [(&str, Option<&str>); 3] = [
    ("desktop", Some("divider")),
    ("compact", Some("divider")),
    ("tall", None),
];

fn conditions() -> [ViewportCondition; 3] {
    [
        ViewportCondition::any().min_width(1024.0),
        ViewportCondition::any().below_width(1024.0),
        ViewportCondition::any().min_height(700.0),
    ]
}

fn router() -> ResponsiveRouter<Log> {
    let mut router = ResponsiveRouter::new();
    for ((name, group), condition) in VARIANTS.into_iter().zip(conditions()) {
        router.register(name, group, condition, move |log: &mut Log| {
            log.push(Event::Setup(name));
            Ok(teardown(move |log: &mut Log| log.push(Event::Teardown(name))))
        });
    }
    router
}

fn viewport_strategy() -> impl Strategy<Value = Viewport> {
    let width = prop_oneof![200.0f64..2000.0, 1022.0f64..1026.0];
    (width, 300.0f64..1200.0, any::<bool>()).prop_map(|(w, h, fine)| {
        if fine {
            Viewport::desktop(w, h)
        } else {
            Viewport::touch(w, h)
        }
    })
}

proptest! {
    #[test]
    fn exclusive_group_never_overlaps(viewports in prop::collection::vec(viewport_strategy(), 1..40)) {
        let mut router = router();
        let mut log = Log::new();
        for viewport in &viewports {
            let pass = router.evaluate(viewport, &mut log);
            prop_assert!(pass.conflicts.is_empty());
            let divider = ["desktop", "compact"].iter().filter(|n| router.is_active(n)).count();
            prop_assert!(divider <= 1);
        }
    }

    #[test]
    fn exactly_one_width_variant_is_active(viewports in prop::collection::vec(viewport_strategy(), 1..40)) {
        let mut router = router();
        let mut log = Log::new();
        for viewport in &viewports {
            router.evaluate(viewport, &mut log);
            let divider = ["desktop", "compact"].iter().filter(|n| router.is_active(n)).count();
            prop_assert_eq!(divider, 1, "width {}", viewport.width);
        }
    }

    #[test]
    fn teardowns_precede_setups_within_a_pass(viewports in prop::collection::vec(viewport_strategy(), 1..40)) {
        let mut router = router();
        let mut log = Log::new();
        for viewport in &viewports {
            let mark = log.len();
            router.evaluate(viewport, &mut log);
            let pass_events = &log[mark..];
            let first_setup = pass_events.iter().position(|e| matches!(e, Event::Setup(_)));
            let last_teardown = pass_events.iter().rposition(|e| matches!(e, Event::Teardown(_)));
            if let (Some(setup), Some(down)) = (first_setup, last_teardown) {
                prop_assert!(down < setup, "pass events {pass_events:?}");
            }
        }
    }

    #[test]
    fn setup_and_teardown_alternate(viewports in prop::collection::vec(viewport_strategy(), 1..40)) {
        let mut router = router();
        let mut log = Log::new();
        for viewport in &viewports {
            router.evaluate(viewport, &mut log);
        }
        router.teardown_all(&mut log);

        for (name, _) in VARIANTS {
            let mut active = false;
            for event in &log {
                match *event {
                    Event::Setup(n) if n == name => {
                        prop_assert!(!active, "{name} set up twice");
                        active = true;
                    }
                    Event::Teardown(n) if n == name => {
                        prop_assert!(active, "{name} torn down while inactive");
                        active = false;
                    }
                    _ => {}
                }
            }
            prop_assert!(!active, "{name} still active after teardown_all");
        }
    }

    #[test]
    fn active_set_matches_conditions(viewports in prop::collection::vec(viewport_strategy(), 1..20)) {
        let mut router = router();
        let mut log = Log::new();
        let conditions = conditions();
        for viewport in &viewports {
            router.evaluate(viewport, &mut log);
            for ((name, _), condition) in VARIANTS.iter().zip(&conditions) {
                prop_assert_eq!(router.is_active(name), condition.matches(viewport));
            }
        }
    }
}
