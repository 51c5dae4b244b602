//! Property tests for the numeric invariants: projection bounds,
//! easing/envelope ranges, and dwell monotonicity.

use proptest::prelude::*;

use rift_core::projector::{ProjectorConfig, SimilarityProjector};
use rift_core::rupture::pulse_intensity;
use rift_core::{Easing, GazeDetector, GazeEvent, Item};

fn arb_item(index: usize) -> impl Strategy<Value = Item> {
    (
        -50_000i64..2_100,
        prop::sample::select(vec!["Europe", "Africa", "Asia", "Oceania"]),
        prop::option::of(prop::collection::vec(-1.0f64..1.0, 8)),
    )
        .prop_map(move |(era, region, features)| {
            let mut item = Item::new(&format!("item-{index}"));
            item.era = era;
            item.region = region.to_string();
            item.feature_vector = features;
            item
        })
}

fn arb_dataset() -> impl Strategy<Value = Vec<Item>> {
    (15usize..40).prop_flat_map(|n| {
        (0..n)
            .map(arb_item)
            .collect::<Vec<_>>()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every projected position is finite and inside the viewing cube.
    #[test]
    fn projection_stays_in_cube(items in arb_dataset(), seed in 0u64..1_000) {
        let projector = SimilarityProjector::new(ProjectorConfig {
            seed,
            iterations: 50,
            ..ProjectorConfig::default()
        });
        if let Some(positions) = projector.project(&items) {
            prop_assert_eq!(positions.len(), items.len());
            for p in &positions {
                prop_assert!(p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
                prop_assert!(p.x.abs() <= 20.0 + 1e-9);
                prop_assert!(p.y.abs() <= 20.0 + 1e-9);
                prop_assert!(p.z.abs() <= 20.0 + 1e-9);
            }
        }
    }

    /// Projection is a pure function of dataset and seed.
    #[test]
    fn projection_is_deterministic(seed in 0u64..1_000) {
        let items: Vec<Item> = (0..18)
            .map(|i| {
                let mut item = Item::new(&format!("d-{i}"));
                item.era = i as i64 * 1_000;
                item
            })
            .collect();
        let projector = SimilarityProjector::new(ProjectorConfig {
            seed,
            iterations: 50,
            ..ProjectorConfig::default()
        });
        prop_assert_eq!(projector.project(&items), projector.project(&items));
    }

    /// Non-overshooting easings stay inside [0, 1]; overshoot stays within
    /// its documented 10% margin.
    #[test]
    fn easing_output_bounded(t in 0.0f64..=1.0) {
        for easing in [Easing::Linear, Easing::FastStart, Easing::SlowEnd] {
            let v = easing.apply(t);
            prop_assert!((0.0..=1.0).contains(&v), "{easing:?}({t}) = {v}");
        }
        let v = Easing::Overshoot.apply(t);
        prop_assert!((0.0..=1.1).contains(&v), "overshoot({t}) = {v}");
    }

    /// The distortion envelope is a valid intensity at every instant.
    #[test]
    fn pulse_envelope_bounded(elapsed in 0u64..5_000, duration in 1u64..2_000) {
        let v = pulse_intensity(elapsed, duration);
        prop_assert!((0.0..=1.0).contains(&v));
        prop_assert!(pulse_intensity(duration, duration) == 0.0);
    }

    /// Reported dwell durations never decrease while gaze is held.
    #[test]
    fn dwell_reports_monotonic(steps in prop::collection::vec(1u64..2_000, 1..40)) {
        let mut det = GazeDetector::new();
        let mut now = 0u64;
        det.observe(now, Some("item"));
        let mut last = 0u64;
        for step in steps {
            now += step;
            for event in det.observe(now, Some("item")) {
                if let GazeEvent::Dwell { duration_ms, .. } = event {
                    prop_assert!(duration_ms >= last);
                    last = duration_ms;
                }
            }
        }
    }

    /// Color overlap is symmetric and normalized.
    #[test]
    fn color_overlap_bounded(
        a in prop::collection::vec(prop::sample::select(vec!["red", "black", "ochre", "white"]), 0..5),
        b in prop::collection::vec(prop::sample::select(vec!["red", "black", "ochre", "white"]), 0..5),
    ) {
        let mut x = Item::new("x");
        x.colors = a.iter().map(|s| s.to_string()).collect();
        let mut y = Item::new("y");
        y.colors = b.iter().map(|s| s.to_string()).collect();
        let xy = x.color_overlap(&y);
        prop_assert!((0.0..=1.0).contains(&xy));
    }
}
