use super::points::Points;
use super::types::{
    ItemView, ScoreSummary, ScoringGroupConfig, ScoringItem, ScoringState, Sign,
};

/// Points one item contributes at its current count.
pub fn item_points(item: &ScoringItem, state: &ScoringState) -> Points {
    item.points_for(state.count(&item.id))
}

/// Adds one group's items into `summary`.
///
/// Only affecting items move the total; every item with a count is bucketed
/// by its own points, never by the running total.
pub fn tally_group(config: &ScoringGroupConfig, state: &ScoringState, summary: &mut ScoreSummary) {
    for item in &config.items {
        let count = state.count(&item.id);
        let points = item.points_for(count);

        if item.affects_score {
            summary.total += points;
        }

        if count == 0 {
            continue;
        }
        if let Some(bucket) = config.grade_criteria.classify(points) {
            summary.add_count(bucket, count as u64);
        }
    }
}

pub fn group_total(config: &ScoringGroupConfig, state: &ScoringState) -> ScoreSummary {
    let mut summary = ScoreSummary::with_base(config.base_score);
    tally_group(config, state, &mut summary);
    summary
}

/// Pools several groups under one base. Groups are tallied in the order given.
pub fn pooled_total<'a, I>(base: Points, groups: I) -> ScoreSummary
where
    I: IntoIterator<Item = (&'a ScoringGroupConfig, &'a ScoringState)>,
{
    let mut summary = ScoreSummary::with_base(base);
    for (config, state) in groups {
        tally_group(config, state, &mut summary);
    }
    summary
}

pub fn item_views(config: &ScoringGroupConfig, state: &ScoringState) -> Vec<ItemView> {
    config
        .items
        .iter()
        .map(|item| {
            let points = item_points(item, state);
            let count = state.get(&item.id);
            ItemView {
                id: item.id.clone(),
                label: item.label.clone(),
                count,
                max_count: item.max_count,
                points,
                sign: Sign::of(points),
                bucket: count
                    .filter(|c| *c > 0)
                    .and_then(|_| config.grade_criteria.classify(points)),
                affects_score: item.affects_score,
            }
        })
        .collect()
}
