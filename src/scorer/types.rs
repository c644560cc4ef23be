use super::points::Points;
use crate::config::Settings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub const DEFAULT_POOL_KEY: &str = "default";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, AsRefStr, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Critical,
    Major,
    Minor,
    Bonus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Grade {
    pub fn for_total(total: Points, settings: &Settings) -> Self {
        let t = total.to_f64();
        if t >= settings.grade_excellent {
            Grade::Excellent
        } else if t >= settings.grade_good {
            Grade::Good
        } else if t >= settings.grade_fair {
            Grade::Fair
        } else {
            Grade::Poor
        }
    }
}

/// Inclusive point range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRange {
    pub min: Points,
    pub max: Points,
}

impl PointRange {
    pub fn new(min: Points, max: Points) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, points: Points) -> bool {
        points <= self.max && points >= self.min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCriteria {
    pub critical: PointRange,
    pub major: PointRange,
    pub minor: PointRange,
    pub bonus: PointRange,
}

impl Default for GradeCriteria {
    fn default() -> Self {
        Self {
            critical: PointRange::new(Points::from_whole(-999), Points::from_whole(-10)),
            major: PointRange::new(Points::from_whole(-9), Points::from_whole(-5)),
            minor: PointRange::new(Points::from_whole(-4), Points::from_whole(-1)),
            bonus: PointRange::new(Points::from_millis(100), Points::from_whole(999)),
        }
    }
}

impl GradeCriteria {
    pub fn range(&self, bucket: Bucket) -> &PointRange {
        match bucket {
            Bucket::Critical => &self.critical,
            Bucket::Major => &self.major,
            Bucket::Minor => &self.minor,
            Bucket::Bonus => &self.bonus,
        }
    }

    pub fn range_mut(&mut self, bucket: Bucket) -> &mut PointRange {
        match bucket {
            Bucket::Critical => &mut self.critical,
            Bucket::Major => &mut self.major,
            Bucket::Minor => &mut self.minor,
            Bucket::Bonus => &mut self.bonus,
        }
    }

    /// First matching bucket in critical, major, minor, bonus order.
    /// Overlapping ranges are allowed; earlier buckets win.
    pub fn classify(&self, points: Points) -> Option<Bucket> {
        Bucket::iter().find(|b| self.range(*b).contains(points))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoringItem {
    pub id: String,
    pub label: String,
    pub per_unit_delta: Points,
    pub max_count: u32,
    pub affects_score: bool,
    /// Deduction entered as an unsigned magnitude.
    pub negative: bool,
}

impl ScoringItem {
    pub fn new(id: impl Into<String>, per_unit_delta: Points, max_count: u32) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            per_unit_delta,
            max_count,
            affects_score: true,
            negative: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_negative(mut self, negative: bool) -> Self {
        self.negative = negative;
        self
    }

    pub fn with_affects_score(mut self, affects_score: bool) -> Self {
        self.affects_score = affects_score;
        self
    }

    pub fn effective_delta(&self) -> Points {
        if self.negative {
            -self.per_unit_delta.abs()
        } else {
            self.per_unit_delta
        }
    }

    pub fn points_for(&self, count: u32) -> Points {
        self.effective_delta().times(count)
    }

    pub fn clamp(&self, raw: i64) -> u32 {
        raw.clamp(0, self.max_count as i64) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoringGroupConfig {
    pub group_key: String,
    pub base_score: Points,
    pub items: Vec<ScoringItem>,
    pub grade_criteria: GradeCriteria,
    pub total_key: Option<String>,
    pub include_keys: Vec<String>,
}

impl ScoringGroupConfig {
    pub fn new(group_key: impl Into<String>) -> Self {
        Self {
            group_key: group_key.into(),
            base_score: Points::from_whole(100),
            items: Vec::new(),
            grade_criteria: GradeCriteria::default(),
            total_key: None,
            include_keys: Vec::new(),
        }
    }

    pub fn with_base_score(mut self, base: Points) -> Self {
        self.base_score = base;
        self
    }

    pub fn with_item(mut self, item: ScoringItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_criteria(mut self, criteria: GradeCriteria) -> Self {
        self.grade_criteria = criteria;
        self
    }

    pub fn with_total_key(mut self, key: impl Into<String>) -> Self {
        self.total_key = Some(key.into());
        self
    }

    pub fn with_include_keys<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.include_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn item(&self, id: &str) -> Option<&ScoringItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// `total_key` (or its legacy `group` alias), else `"default"`. Groups
    /// without one all land in the board-wide default pool.
    pub fn pool_key(&self) -> &str {
        match self.total_key.as_deref() {
            Some(k) if !k.is_empty() => k,
            _ => DEFAULT_POOL_KEY,
        }
    }
}

/// Current counts of one group. `None` is an explicit "unset", distinct from 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringState(BTreeMap<String, Option<u32>>);

impl ScoringState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value; `None` for both unset and absent.
    pub fn get(&self, item_id: &str) -> Option<u32> {
        self.0.get(item_id).copied().flatten()
    }

    pub fn is_unset(&self, item_id: &str) -> bool {
        matches!(self.0.get(item_id), Some(None))
    }

    /// Count used for arithmetic: unset and absent both read as 0.
    pub fn count(&self, item_id: &str) -> u32 {
        self.get(item_id).unwrap_or(0)
    }

    pub fn set(&mut self, item_id: impl Into<String>, count: Option<u32>) {
        self.0.insert(item_id.into(), count);
    }

    pub fn retain_known(&mut self, config: &ScoringGroupConfig) -> usize {
        let before = self.0.len();
        self.0.retain(|id, _| config.item(id).is_some());
        before - self.0.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<u32>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, Option<u32>)> for ScoringState {
    fn from_iter<T: IntoIterator<Item = (K, Option<u32>)>>(iter: T) -> Self {
        ScoringState(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Total plus per-bucket unit counts. Doubles as the persisted
/// `{ total, critical, major, minor, bonus }` summary of a total display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub total: Points,
    pub critical: u64,
    pub major: u64,
    pub minor: u64,
    pub bonus: u64,
}

pub type GroupTotal = ScoreSummary;
pub type TotalSummary = ScoreSummary;

impl ScoreSummary {
    pub fn with_base(base: Points) -> Self {
        Self {
            total: base,
            ..Default::default()
        }
    }

    pub fn count(&self, bucket: Bucket) -> u64 {
        match bucket {
            Bucket::Critical => self.critical,
            Bucket::Major => self.major,
            Bucket::Minor => self.minor,
            Bucket::Bonus => self.bonus,
        }
    }

    pub fn add_count(&mut self, bucket: Bucket, n: u64) {
        let slot = match bucket {
            Bucket::Critical => &mut self.critical,
            Bucket::Major => &mut self.major,
            Bucket::Minor => &mut self.minor,
            Bucket::Bonus => &mut self.bonus,
        };
        *slot = slot.saturating_add(n);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    pub count: Option<u32>,
    pub points: Points,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalDisplayConfig {
    pub key: String,
    pub include_keys: Vec<String>,
    pub base_score: Option<Points>,
    pub total_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode<'a> {
    /// Sums only the named groups.
    Filtered(&'a [String]),
    /// Shows the pooled total of every group sharing this key.
    Pooled(&'a str),
}

impl TotalDisplayConfig {
    pub fn pooled(key: impl Into<String>, total_key: Option<String>) -> Self {
        Self {
            key: key.into(),
            include_keys: Vec::new(),
            base_score: None,
            total_key,
        }
    }

    pub fn filtered<S: Into<String>>(
        key: impl Into<String>,
        include_keys: impl IntoIterator<Item = S>,
        base_score: Option<Points>,
    ) -> Self {
        Self {
            key: key.into(),
            include_keys: include_keys.into_iter().map(Into::into).collect(),
            base_score,
            total_key: None,
        }
    }

    pub fn mode(&self) -> DisplayMode<'_> {
        if !self.include_keys.is_empty() {
            return DisplayMode::Filtered(&self.include_keys);
        }
        match self.total_key.as_deref() {
            Some(k) if !k.is_empty() => DisplayMode::Pooled(k),
            _ => DisplayMode::Pooled(DEFAULT_POOL_KEY),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Sign {
    Negative,
    Positive,
    Neutral,
}

impl Sign {
    pub fn of(points: Points) -> Self {
        if points.is_negative() {
            Sign::Negative
        } else if points.is_positive() {
            Sign::Positive
        } else {
            Sign::Neutral
        }
    }
}

/// One rendered row of a group's item grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: String,
    pub label: String,
    pub count: Option<u32>,
    pub max_count: u32,
    pub points: Points,
    pub sign: Sign,
    pub bucket: Option<Bucket>,
    pub affects_score: bool,
}
