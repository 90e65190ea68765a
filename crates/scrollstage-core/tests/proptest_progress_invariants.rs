//! Property-based invariants for scroll progress primitives.
//!
//! 1. Scrub distance is never negative and never NaN.
//! 2. Scrub distance is exactly zero when content fits the reduced viewport.
//! 3. Path sampling is a pure function of progress.
//! 4. Sampling at p2 does not depend on having sampled p1 first.
//! 5. Crossing detection reports every boundary crossed, in scroll order.

use proptest::prelude::*;
use scrollstage_core::animation::{SegmentEasing, SegmentPath};
use scrollstage_core::crossing::{Crossing, CrossingDetector, Side};
use scrollstage_core::geometry::{Point, Reduction, scrub_distance};

fn easing_strategy() -> impl Strategy<Value = SegmentEasing> {
    prop_oneof![
        Just(SegmentEasing::Linear),
        Just(SegmentEasing::EaseIn),
        Just(SegmentEasing::EaseOut),
        Just(SegmentEasing::EaseInOut),
        Just(SegmentEasing::Smoothstep),
    ]
}

fn path_strategy() -> impl Strategy<Value = SegmentPath> {
    prop::collection::vec(
        (-800.0f64..800.0, -800.0f64..800.0, 0.0f64..5.0, easing_strategy()),
        0..6,
    )
    .prop_map(|legs| {
        legs.into_iter()
            .fold(SegmentPath::new(Point::default()), |path, (x, y, w, e)| {
                path.segment(Point::new(x, y), w, e)
            })
    })
}

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Before), Just(Side::Inside), Just(Side::After)]
}

// ═════════════════════════════════════════════════════════════════════════
// 1–2. Scrub distance
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn scrub_distance_non_negative(
        content in -1.0e6f64..1.0e6,
        viewport in 0.0f64..1.0e5,
        k in 0.0f64..2.0,
    ) {
        let d = scrub_distance(content, viewport, Reduction::Fraction(k));
        prop_assert!(d >= 0.0 && !d.is_nan(), "distance {d}");
    }

    #[test]
    fn scrub_distance_zero_when_content_fits(
        viewport in 1.0f64..5000.0,
        frac in 0.0f64..1.0,
    ) {
        let content = viewport * 0.9 * frac;
        prop_assert_eq!(scrub_distance(content, viewport, Reduction::Fraction(0.9)), 0.0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3–4. Path determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn path_sample_is_pure(path in path_strategy(), p in 0.0f64..=1.0) {
        prop_assert_eq!(path.sample(p), path.sample(p));
    }

    #[test]
    fn path_sample_independent_of_history(
        path in path_strategy(),
        p1 in 0.0f64..=1.0,
        p2 in 0.0f64..=1.0,
    ) {
        let direct = path.sample(p2);
        let _ = path.sample(p1);
        prop_assert_eq!(path.sample(p2), direct);
        prop_assert_eq!(path.clone().sample(p2), direct);
    }

    #[test]
    fn path_endpoints(path in path_strategy()) {
        prop_assert_eq!(path.sample(0.0), path.origin());
        prop_assert_eq!(path.sample(1.0), path.terminal());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Crossings
// ═════════════════════════════════════════════════════════════════════════

fn rank(side: Side) -> i32 {
    match side {
        Side::Before => 0,
        Side::Inside => 1,
        Side::After => 2,
    }
}

proptest! {
    #[test]
    fn crossings_track_net_movement(sides in prop::collection::vec(side_strategy(), 0..40)) {
        let mut detector = CrossingDetector::new();
        let mut position = 0;
        for side in sides {
            detector.observe(side);
            for event in detector.drain() {
                match event {
                    Crossing::Enter => { prop_assert_eq!(position, 0); position = 1; }
                    Crossing::Leave => { prop_assert_eq!(position, 1); position = 2; }
                    Crossing::EnterBack => { prop_assert_eq!(position, 2); position = 1; }
                    Crossing::LeaveBack => { prop_assert_eq!(position, 1); position = 0; }
                }
            }
            prop_assert_eq!(position, rank(side));
        }
    }
}
