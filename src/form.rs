use crate::scorer::loader::parse_count_text;
use crate::scorer::{Bucket, Points, ScoringGroupConfig};
use serde::Serialize;
use std::collections::HashMap;

/// Board-wide result for a submitted form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FormSummary {
    pub base_score: Points,
    pub total_delta: Points,
    pub total_score: Points,
    pub critical_count: u64,
    pub major_count: u64,
    pub minor_count: u64,
    pub bonus_points: Points,
}

/// Scores flat form inputs keyed `"<groupKey>_<itemId>"` against every group.
///
/// Missing or unreadable inputs count as 0; counts are clamped per item.
pub fn summarize_inputs<'a, I>(
    groups: I,
    inputs: &HashMap<String, String>,
    base_score: Points,
) -> FormSummary
where
    I: IntoIterator<Item = &'a ScoringGroupConfig>,
{
    let mut summary = FormSummary {
        base_score,
        ..Default::default()
    };

    for group in groups {
        for item in &group.items {
            let key = format!("{}_{}", group.group_key, item.id);
            let count = inputs
                .get(&key)
                .and_then(|raw| parse_count_text(raw))
                .map(|n| item.clamp(n))
                .unwrap_or(0);
            if count == 0 {
                continue;
            }

            let points = item.points_for(count);
            if item.affects_score {
                summary.total_delta += points;
                if points.is_positive() {
                    summary.bonus_points += points;
                }
            }
            match group.grade_criteria.classify(points) {
                Some(Bucket::Critical) => summary.critical_count += count as u64,
                Some(Bucket::Major) => summary.major_count += count as u64,
                Some(Bucket::Minor) => summary.minor_count += count as u64,
                Some(Bucket::Bonus) | None => {}
            }
        }
    }

    summary.total_score = base_score + summary.total_delta;
    summary
}
