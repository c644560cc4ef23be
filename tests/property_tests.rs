use boardscore::scorer::{
    Bucket, GradeCriteria, Points, ScoreAggregator, ScoringGroupConfig, ScoringItem,
    TotalDisplayConfig,
};
use proptest::prelude::*;
use std::collections::HashMap;
use strum::IntoEnumIterator;

// --- STRATEGIES ---

prop_compose! {
    fn arb_item(idx: usize)(
        delta_millis in -20_000i64..20_000,
        max_count in 0u32..20,
        affects in prop::bool::weighted(0.8),
        negative in any::<bool>()
    ) -> ScoringItem {
        ScoringItem::new(format!("item_{}", idx), Points::from_millis(delta_millis), max_count)
            .with_affects_score(affects)
            .with_negative(negative)
    }
}

fn arb_group(key: &'static str) -> impl Strategy<Value = ScoringGroupConfig> {
    (
        -50i64..150,
        (0..6usize).prop_flat_map(|n| (0..n).map(arb_item).collect::<Vec<_>>()),
    )
        .prop_map(move |(base, items)| {
            items.into_iter().fold(
                ScoringGroupConfig::new(key).with_base_score(Points::from_whole(base)),
                |g, item| g.with_item(item),
            )
        })
}

fn arb_count_text() -> impl Strategy<Value = String> {
    prop_oneof![
        (-100i64..100).prop_map(|n| n.to_string()),
        "[a-z ]{0,4}",
        (0u32..50, "[a-z.]{0,3}").prop_map(|(n, tail)| format!("{}{}", n, tail)),
    ]
}

fn fresh(groups: Vec<ScoringGroupConfig>) -> ScoreAggregator {
    let mut agg = ScoreAggregator::default();
    agg.initialize(groups, HashMap::new());
    agg
}

proptest! {
    #[test]
    fn prop_counts_always_within_bounds(
        group in arb_group("g"),
        edits in prop::collection::vec((0usize..6, arb_count_text()), 0..20)
    ) {
        let mut agg = fresh(vec![group.clone()]);
        for (idx, raw) in &edits {
            let Some(item) = group.items.get(*idx) else { continue };
            if let Some(r) = agg.set_item_count("g", &item.id, raw.as_str()) {
                if let Some(c) = r.count {
                    prop_assert!(c <= item.max_count);
                }
            }
        }
        let state = agg.state("g").unwrap();
        for item in &group.items {
            prop_assert!(state.count(&item.id) <= item.max_count);
        }
    }

    #[test]
    fn prop_total_is_base_plus_affecting_points(
        group in arb_group("g"),
        counts in prop::collection::vec(0i64..30, 6)
    ) {
        let mut agg = fresh(vec![group.clone()]);
        let mut expected = group.base_score;
        for (item, &n) in group.items.iter().zip(&counts) {
            agg.set_item_count("g", &item.id, n);
            if item.affects_score {
                expected += item.points_for(item.clamp(n));
            }
        }
        prop_assert_eq!(agg.group_total("g").unwrap().total, expected);
    }

    #[test]
    fn prop_bucket_counts_match_classified_items(
        group in arb_group("g"),
        counts in prop::collection::vec(0i64..30, 6)
    ) {
        let mut agg = fresh(vec![group.clone()]);
        let mut expected: HashMap<Bucket, u64> = HashMap::new();
        for (item, &n) in group.items.iter().zip(&counts) {
            agg.set_item_count("g", &item.id, n);
            let c = item.clamp(n);
            if c > 0 {
                if let Some(b) = group.grade_criteria.classify(item.points_for(c)) {
                    *expected.entry(b).or_default() += c as u64;
                }
            }
        }
        let total = agg.group_total("g").unwrap();
        for bucket in Bucket::iter() {
            prop_assert_eq!(total.count(bucket), expected.get(&bucket).copied().unwrap_or(0));
        }
    }

    #[test]
    fn prop_default_buckets_are_disjoint(millis in -1_100_000i64..1_100_000) {
        let criteria = GradeCriteria::default();
        let p = Points::from_millis(millis);
        let hits = Bucket::iter().filter(|b| criteria.range(*b).contains(p)).count();
        prop_assert!(hits <= 1);
    }

    #[test]
    fn prop_filtered_total_isolated_from_other_groups(
        a in arb_group("A"),
        b in arb_group("B"),
        counts in prop::collection::vec(0i64..30, 6)
    ) {
        let mut agg = fresh(vec![a, b.clone()]);
        agg.register_display(TotalDisplayConfig::filtered("t", ["A"], None));
        let before = agg.display_summary("t").unwrap();
        for (item, &n) in b.items.iter().zip(&counts) {
            agg.set_item_count("B", &item.id, n);
        }
        prop_assert_eq!(agg.display_summary("t").unwrap(), before);
    }

    #[test]
    fn prop_recompute_all_idempotent(
        a in arb_group("A"),
        b in arb_group("B"),
        counts in prop::collection::vec(0i64..30, 6)
    ) {
        let mut agg = fresh(vec![a.clone(), b]);
        agg.register_display(TotalDisplayConfig::filtered("t", ["A", "B"], None));
        agg.register_display(TotalDisplayConfig::pooled("p", None));
        for (item, &n) in a.items.iter().zip(&counts) {
            agg.set_item_count("A", &item.id, n);
        }
        let snapshot = |agg: &ScoreAggregator| {
            (agg.group_total("A"), agg.group_total("B"), agg.display_summary("t"), agg.display_summary("p"))
        };
        let first = snapshot(&agg);
        agg.recompute_all();
        prop_assert_eq!(snapshot(&agg), first);
        agg.recompute_all();
        prop_assert_eq!(snapshot(&agg), first);
    }
}
