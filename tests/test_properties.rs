//! Property-based tests using proptest

use proptest::prelude::*;
use instruction_oxide::pairing::min_cost_assignment;
use instruction_oxide::rules::Scale;
use instruction_oxide::{Block, ClassificationEngine, ClassifierConfig, PageInput, Rect};

fn arb_rect() -> impl Strategy<Value = Rect> {
    (0.0f64..400.0, 0.0f64..300.0, 0.5f64..200.0, 0.5f64..150.0)
        .prop_map(|(x, y, w, h)| Rect::from_size(x, y, w, h))
}

fn arb_block(id: u32) -> impl Strategy<Value = Block> {
    (arb_rect(), 0u8..4, 1u32..40).prop_map(move |(rect, kind, n)| match kind {
        0 => Block::text(id, rect, n.to_string()),
        1 => Block::text(id, rect, format!("{}x", n)),
        2 => Block::image(id, rect, format!("img-{}", id)),
        _ => Block::path(id, rect, Some(instruction_oxide::blocks::Color::black()), None),
    })
}

fn arb_page() -> impl Strategy<Value = PageInput> {
    (1usize..12)
        .prop_flat_map(|n| (0..n as u32).map(arb_block).collect::<Vec<_>>())
        .prop_map(|blocks| PageInput::new(0, Rect::new(0.0, 0.0, 400.0, 300.0), blocks))
}

/// Cheapest complete assignment by trying every permutation of columns.
fn brute_force_cost(costs: &[Vec<f64>]) -> f64 {
    fn go(costs: &[Vec<f64>], row: usize, used: &mut Vec<bool>) -> f64 {
        if row == costs.len() {
            return 0.0;
        }
        let mut best = f64::INFINITY;
        for col in 0..used.len() {
            if !used[col] {
                used[col] = true;
                best = best.min(costs[row][col] + go(costs, row + 1, used));
                used[col] = false;
            }
        }
        best
    }
    let m = costs.first().map_or(0, Vec::len);
    go(costs, 0, &mut vec![false; m])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_union_contains_both(a in arb_rect(), b in arb_rect()) {
        let u = a.union(&b);
        prop_assert!(u.contains(&a));
        prop_assert!(u.contains(&b));
    }

    #[test]
    fn test_iou_symmetric_and_bounded(a in arb_rect(), b in arb_rect()) {
        let ab = a.iou(&b);
        prop_assert!((ab - b.iou(&a)).abs() < 1e-12);
        prop_assert!((0.0..=1.0 + 1e-12).contains(&ab));
        prop_assert!((a.iou(&a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersection_within_both(a in arb_rect(), b in arb_rect()) {
        match a.intersection(&b) {
            Some(i) => {
                prop_assert!(a.contains(&i));
                prop_assert!(b.contains(&i));
                prop_assert!(a.intersects(&b));
            }
            None => prop_assert_eq!(a.intersection_area(&b), 0.0),
        }
    }

    #[test]
    fn test_distance_zero_iff_touching(a in arb_rect(), b in arb_rect()) {
        let d = a.distance_to(&b);
        prop_assert!(d >= 0.0);
        prop_assert!((d - b.distance_to(&a)).abs() < 1e-9);
        if a.intersects(&b) {
            prop_assert_eq!(d, 0.0);
        }
    }

    #[test]
    fn test_linear_scale_stays_in_unit_range(
        ys in prop::collection::vec(0.0f64..=1.0, 2..6),
        x in -100.0f64..200.0,
    ) {
        let points: Vec<(f64, f64)> = ys.iter().enumerate().map(|(i, &y)| (i as f64 * 20.0, y)).collect();
        let scale = Scale::linear(points).unwrap();
        let s = scale.score(x);
        prop_assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn test_assignment_is_optimal(
        costs in (1usize..4, 0usize..3).prop_flat_map(|(n, extra)| {
            prop::collection::vec(prop::collection::vec(0.0f64..10.0, n + extra), n)
        })
    ) {
        let pairs = min_cost_assignment(&costs);
        prop_assert_eq!(pairs.len(), costs.len());
        let mut cols: Vec<usize> = pairs.iter().map(|&(_, c)| c).collect();
        cols.sort();
        cols.dedup();
        prop_assert_eq!(cols.len(), pairs.len());
        let total: f64 = pairs.iter().map(|&(r, c)| costs[r][c]).sum();
        prop_assert!((total - brute_force_cost(&costs)).abs() < 1e-9);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_random_pages_keep_block_ownership(page in arb_page()) {
        let engine = ClassificationEngine::new(ClassifierConfig::default()).unwrap();
        let outcome = engine.classify_page(&page);
        let result = outcome.result().unwrap();
        let mut seen = std::collections::BTreeSet::new();
        for candidate in result.all_candidates().iter().filter(|c| c.is_built()) {
            for &block in &candidate.source_blocks {
                prop_assert!(seen.insert(block), "block {} built twice", block);
            }
        }
        let tree = outcome.page().unwrap();
        prop_assert!(tree.rect.contains(&Rect::new(0.0, 0.0, 400.0, 300.0)));
    }
}
