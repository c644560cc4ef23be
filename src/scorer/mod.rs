pub mod engine;
pub mod loader;
pub mod points;
pub mod types;

pub use self::loader::DecodedGroup;
pub use self::points::Points;
pub use self::types::{
    Bucket, DisplayMode, Grade, GradeCriteria, GroupTotal, ItemView, PointRange, ScoreSummary,
    ScoringGroupConfig, ScoringItem, ScoringState, Sign, TotalDisplayConfig, TotalSummary,
    UpdateResult,
};

use crate::config::Settings;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Raw count as typed by a user or sent by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountInput<'a> {
    Text(&'a str),
    Number(i64),
}

impl<'a> From<&'a str> for CountInput<'a> {
    fn from(s: &'a str) -> Self {
        CountInput::Text(s)
    }
}

impl<'a> From<&'a String> for CountInput<'a> {
    fn from(s: &'a String) -> Self {
        CountInput::Text(s.as_str())
    }
}

impl From<i64> for CountInput<'_> {
    fn from(n: i64) -> Self {
        CountInput::Number(n)
    }
}

impl From<i32> for CountInput<'_> {
    fn from(n: i32) -> Self {
        CountInput::Number(n as i64)
    }
}

impl From<u32> for CountInput<'_> {
    fn from(n: u32) -> Self {
        CountInput::Number(n as i64)
    }
}

impl CountInput<'_> {
    /// `None` is an explicit unset (blank or non-numeric text).
    fn normalize(self, item: &ScoringItem) -> Option<u32> {
        match self {
            CountInput::Number(n) => Some(item.clamp(n)),
            CountInput::Text(s) => loader::parse_count_text(s).map(|n| item.clamp(n)),
        }
    }
}

struct GroupEntry {
    config: ScoringGroupConfig,
    state: ScoringState,
    placeholder: Option<String>,
    summary: ScoreSummary,
}

struct DisplayEntry {
    config: TotalDisplayConfig,
    summary: ScoreSummary,
}

/// Owns every scoring group and total display of one board page.
///
/// Mutations go through [`ScoreAggregator::set_item_count`], which refreshes
/// the edited group and every display depending on it before returning.
pub struct ScoreAggregator {
    pub settings: Settings,
    groups: Vec<GroupEntry>,
    group_index: HashMap<String, usize>,
    displays: Vec<DisplayEntry>,
    display_index: HashMap<String, usize>,
    // group key -> displays reading it
    dependents: HashMap<String, Vec<usize>>,
}

impl Default for ScoreAggregator {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl ScoreAggregator {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            groups: Vec::new(),
            group_index: HashMap::new(),
            displays: Vec::new(),
            display_index: HashMap::new(),
            dependents: HashMap::new(),
        }
    }

    /// Replaces all registered groups and displays. States are sanitized against their
    /// configs; groups carrying `include_keys` also get a filtered display
    /// under their own key.
    pub fn initialize(
        &mut self,
        groups: Vec<ScoringGroupConfig>,
        mut initial_states: HashMap<String, ScoringState>,
    ) {
        self.groups.clear();
        self.group_index.clear();
        self.displays.clear();
        self.display_index.clear();

        for config in groups {
            let state = initial_states.remove(&config.group_key).unwrap_or_default();
            self.insert_group(config, state, None);
        }
        for stale in initial_states.keys() {
            debug!("State for unknown group '{}' dropped", stale);
        }

        self.register_include_displays();
        self.rebuild_dependents();
        self.recompute_all();
        info!(
            "Scoring initialized: {} groups, {} displays",
            self.groups.len(),
            self.displays.len()
        );
    }

    /// Registers a group straight from the decode boundary.
    pub fn register_decoded(&mut self, decoded: DecodedGroup) {
        let placeholder = decoded.problem.map(|reason| {
            format!("{} ({})", self.settings.placeholder, reason)
        });
        let key = decoded.config.group_key.clone();
        if self.insert_group(decoded.config, decoded.state, placeholder) {
            let idx = self.group_index[&key];
            self.ensure_include_display(idx);
            self.rebuild_dependents();
            self.refresh_group(idx);
            self.refresh_dependents(&key);
        }
    }

    pub fn register_display(&mut self, config: TotalDisplayConfig) {
        if self.display_index.contains_key(&config.key) {
            warn!("Duplicate total display '{}' ignored", config.key);
            return;
        }
        let idx = self.displays.len();
        self.display_index.insert(config.key.clone(), idx);
        self.displays.push(DisplayEntry {
            config,
            summary: ScoreSummary::default(),
        });
        self.rebuild_dependents();
        self.refresh_display(idx);
    }

    /// Parses, clamps and stores one count, then refreshes every total that
    /// reads the group. Unknown groups or items are a silent no-op (`None`).
    pub fn set_item_count<'a>(
        &mut self,
        group_key: &str,
        item_id: &str,
        raw: impl Into<CountInput<'a>>,
    ) -> Option<UpdateResult> {
        let Some(&idx) = self.group_index.get(group_key) else {
            debug!("Update for unknown group '{}' ignored", group_key);
            return None;
        };
        let entry = &mut self.groups[idx];
        let Some(item) = entry.config.item(item_id) else {
            debug!("Update for unknown item '{}.{}' ignored", group_key, item_id);
            return None;
        };

        let count = raw.into().normalize(item);
        let points = item.points_for(count.unwrap_or(0));
        entry.state.set(item_id, count);

        self.refresh_group(idx);
        self.refresh_dependents(group_key);

        Some(UpdateResult { count, points })
    }

    /// Recomputes every group and display from current state. Idempotent.
    pub fn recompute_all(&mut self) {
        for idx in 0..self.groups.len() {
            self.refresh_group(idx);
        }
        for idx in 0..self.displays.len() {
            self.refresh_display(idx);
        }
    }

    pub fn group_total(&self, group_key: &str) -> Option<GroupTotal> {
        self.group_index
            .get(group_key)
            .map(|&idx| self.groups[idx].summary)
    }

    /// `base` plus the affecting points of the named groups only.
    pub fn filtered_total<S: AsRef<str>>(&self, include_keys: &[S], base: Points) -> Points {
        self.filtered_summary(include_keys, base).total
    }

    pub fn filtered_summary<S: AsRef<str>>(&self, include_keys: &[S], base: Points) -> ScoreSummary {
        let mut summary = ScoreSummary::with_base(base);
        let mut seen: Vec<usize> = Vec::with_capacity(include_keys.len());
        for key in include_keys {
            let Some(&idx) = self.group_index.get(key.as_ref()) else {
                continue;
            };
            // Naming a group twice does not count it twice.
            if seen.contains(&idx) {
                continue;
            }
            seen.push(idx);
            let g = &self.groups[idx];
            engine::tally_group(&g.config, &g.state, &mut summary);
        }
        summary
    }

    /// Pooled summary of every group whose pool key matches. The base is the
    /// first member's base score; an empty pool reports the default base.
    pub fn pool_total(&self, pool_key: &str) -> ScoreSummary {
        let mut members = self
            .groups
            .iter()
            .filter(|g| g.config.pool_key() == pool_key)
            .peekable();
        let base = match members.peek() {
            Some(first) => first.config.base_score,
            None => self.default_base(),
        };
        engine::pooled_total(base, members.map(|g| (&g.config, &g.state)))
    }

    pub fn display_summary(&self, key: &str) -> Option<TotalSummary> {
        self.display_index
            .get(key)
            .map(|&idx| self.displays[idx].summary)
    }

    pub fn display_config(&self, key: &str) -> Option<&TotalDisplayConfig> {
        self.display_index
            .get(key)
            .map(|&idx| &self.displays[idx].config)
    }

    pub fn displays(&self) -> impl Iterator<Item = (&TotalDisplayConfig, &TotalSummary)> {
        self.displays.iter().map(|d| (&d.config, &d.summary))
    }

    pub fn configs(&self) -> impl Iterator<Item = &ScoringGroupConfig> {
        self.groups.iter().map(|g| &g.config)
    }

    pub fn group_config(&self, group_key: &str) -> Option<&ScoringGroupConfig> {
        self.group_index
            .get(group_key)
            .map(|&idx| &self.groups[idx].config)
    }

    pub fn state(&self, group_key: &str) -> Option<&ScoringState> {
        self.group_index
            .get(group_key)
            .map(|&idx| &self.groups[idx].state)
    }

    /// Text shown instead of an item grid, if the group has nothing to grade.
    pub fn placeholder(&self, group_key: &str) -> Option<&str> {
        let g = &self.groups[*self.group_index.get(group_key)?];
        match &g.placeholder {
            Some(p) => Some(p.as_str()),
            None if g.config.items.is_empty() => Some(self.settings.placeholder.as_str()),
            None => None,
        }
    }

    pub fn item_views(&self, group_key: &str) -> Option<Vec<ItemView>> {
        let g = &self.groups[*self.group_index.get(group_key)?];
        Some(engine::item_views(&g.config, &g.state))
    }

    /// Display keys that recompute when `group_key` changes.
    pub fn dependents_of(&self, group_key: &str) -> Vec<&str> {
        self.dependents
            .get(group_key)
            .map(|idxs| {
                idxs.iter()
                    .map(|&i| self.displays[i].config.key.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn grade(&self, total: Points) -> Grade {
        Grade::for_total(total, &self.settings)
    }

    pub fn default_base(&self) -> Points {
        Points::from_f64(self.settings.default_base_score).unwrap_or(Points::from_whole(100))
    }

    // --- internals ---

    fn insert_group(
        &mut self,
        config: ScoringGroupConfig,
        mut state: ScoringState,
        placeholder: Option<String>,
    ) -> bool {
        if self.group_index.contains_key(&config.group_key) {
            warn!("Duplicate scoring group '{}' ignored", config.group_key);
            return false;
        }
        let dropped = state.retain_known(&config);
        if dropped > 0 {
            debug!(
                "Scoring group '{}': {} stale state entries dropped",
                config.group_key, dropped
            );
        }
        let clamped: Vec<(String, Option<u32>)> = state
            .iter()
            .map(|(id, count)| {
                let max = config.item(id).map(|i| i.max_count).unwrap_or(0);
                (id.to_string(), count.map(|c| c.min(max)))
            })
            .collect();
        let state: ScoringState = clamped.into_iter().collect();

        let idx = self.groups.len();
        self.group_index.insert(config.group_key.clone(), idx);
        self.groups.push(GroupEntry {
            summary: ScoreSummary::with_base(config.base_score),
            config,
            state,
            placeholder,
        });
        true
    }

    fn register_include_displays(&mut self) {
        for idx in 0..self.groups.len() {
            self.ensure_include_display(idx);
        }
    }

    fn ensure_include_display(&mut self, group_idx: usize) {
        let config = &self.groups[group_idx].config;
        if config.include_keys.is_empty() || self.display_index.contains_key(&config.group_key) {
            return;
        }
        let display = TotalDisplayConfig::filtered(
            config.group_key.clone(),
            config.include_keys.clone(),
            Some(config.base_score),
        );
        let idx = self.displays.len();
        self.display_index.insert(display.key.clone(), idx);
        self.displays.push(DisplayEntry {
            config: display,
            summary: ScoreSummary::default(),
        });
    }

    fn rebuild_dependents(&mut self) {
        self.dependents.clear();
        for (d_idx, display) in self.displays.iter().enumerate() {
            match display.config.mode() {
                DisplayMode::Filtered(keys) => {
                    for key in keys {
                        let list = self.dependents.entry(key.clone()).or_default();
                        if !list.contains(&d_idx) {
                            list.push(d_idx);
                        }
                    }
                }
                DisplayMode::Pooled(pool) => {
                    for g in self.groups.iter().filter(|g| g.config.pool_key() == pool) {
                        self.dependents
                            .entry(g.config.group_key.clone())
                            .or_default()
                            .push(d_idx);
                    }
                }
            }
        }
    }

    fn refresh_group(&mut self, idx: usize) {
        let g = &mut self.groups[idx];
        g.summary = engine::group_total(&g.config, &g.state);
    }

    fn refresh_dependents(&mut self, group_key: &str) {
        let idxs = self.dependents.get(group_key).cloned().unwrap_or_default();
        for d_idx in idxs {
            self.refresh_display(d_idx);
        }
    }

    fn refresh_display(&mut self, idx: usize) {
        let config = &self.displays[idx].config;
        let summary = match config.mode() {
            DisplayMode::Filtered(keys) => {
                let base = config.base_score.unwrap_or_else(|| self.default_base());
                self.filtered_summary(keys, base)
            }
            DisplayMode::Pooled(pool) => {
                let mut s = self.pool_total(pool);
                if let Some(base) = config.base_score {
                    s.total = s.total - self.pool_base(pool) + base;
                }
                s
            }
        };
        self.displays[idx].summary = summary;
    }

    fn pool_base(&self, pool_key: &str) -> Points {
        self.groups
            .iter()
            .find(|g| g.config.pool_key() == pool_key)
            .map(|g| g.config.base_score)
            .unwrap_or_else(|| self.default_base())
    }
}
