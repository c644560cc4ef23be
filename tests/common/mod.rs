#![allow(dead_code)]

use boardscore::scorer::{Points, ScoreAggregator, ScoringGroupConfig, ScoringItem};
use std::collections::HashMap;

pub fn pts(n: i64) -> Points {
    Points::from_whole(n)
}

/// Safety inspection group modelled on a typical admin config.
pub fn safety_group(key: &str) -> ScoringGroupConfig {
    ScoringGroupConfig::new(key)
        .with_item(ScoringItem::new("item_1", pts(-5), 10).with_label("No hard hat"))
        .with_item(ScoringItem::new("item_2", pts(-3), 10).with_label("No safety shoes"))
        .with_item(ScoringItem::new("item_3", pts(-2), 5).with_label("Untidy workplace"))
        .with_item(ScoringItem::new("item_4", pts(5), 3).with_label("Best practice"))
}

pub fn aggregator_with(groups: Vec<ScoringGroupConfig>) -> ScoreAggregator {
    let mut agg = ScoreAggregator::default();
    agg.initialize(groups, HashMap::new());
    agg
}

pub const SAFETY_CONFIG_JSON: &str = r#"{"type":"scoring","base_score":100,"items":[{"id":"item_1","label":"No hard hat","per_unit_delta":-5,"max_count":10},{"id":"item_2","label":"No safety shoes","per_unit_delta":-3,"max_count":10},{"id":"item_3","label":"Untidy workplace","per_unit_delta":-2,"max_count":5},{"id":"item_4","label":"Best practice","per_unit_delta":5,"max_count":3}],"grade_criteria":{"critical":{"min":-999,"max":-10},"major":{"min":-9,"max":-5},"minor":{"min":-4,"max":-1},"bonus":{"min":0.1,"max":999}}}"#;

pub fn entity_encode(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
