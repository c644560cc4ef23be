//! Host-page model: the persisted fields of one board form.
//!
//! Each group and total display is a field with a raw `config` attribute and a
//! persisted `value`. A [`Board`] decodes them into a [`ScoreAggregator`] and
//! writes the normalized values back after every edit, so the form round-trips
//! on submit.

use crate::config::Settings;
use crate::error::{BoardScoreError, BsResult};
use crate::scorer::loader::{decode_display_config, decode_group};
use crate::scorer::{CountInput, ScoreAggregator, UpdateResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupField {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub config: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalField {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub config: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDocument {
    #[serde(default)]
    pub groups: Vec<GroupField>,
    #[serde(default)]
    pub totals: Vec<TotalField>,
}

impl BoardDocument {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> BsResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BoardScoreError::Config(format!(
                "Could not open board document '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> BsResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> BsResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// One `group.item=value` edit as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub group: String,
    pub item: String,
    pub value: String,
}

impl FromStr for Edit {
    type Err = BoardScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, value) = s.split_once('=').ok_or_else(|| {
            BoardScoreError::Validation(format!("Edit '{}' must look like group.item=value", s))
        })?;
        // Group keys may contain dots; item ids are taken from the last segment.
        let (group, item) = target.trim().rsplit_once('.').ok_or_else(|| {
            BoardScoreError::Validation(format!("Edit target '{}' is missing '.item'", target))
        })?;
        if group.is_empty() || item.is_empty() {
            return Err(BoardScoreError::Validation(format!(
                "Edit target '{}' has an empty group or item",
                target
            )));
        }
        Ok(Edit {
            group: group.to_string(),
            item: item.to_string(),
            value: value.to_string(),
        })
    }
}

pub struct Board {
    document: BoardDocument,
    aggregator: ScoreAggregator,
}

impl Board {
    pub fn open(document: BoardDocument, settings: Settings) -> Self {
        let mut aggregator = ScoreAggregator::new(settings);

        for field in &document.groups {
            if aggregator.group_config(&field.key).is_some() {
                warn!(
                    "Group field '{}' appears more than once; later copies mirror the first",
                    field.key
                );
                continue;
            }
            let decoded = decode_group(&field.key, &field.config, &field.value, &aggregator.settings);
            aggregator.register_decoded(decoded);
        }
        for field in &document.totals {
            if aggregator.display_config(&field.key).is_some() {
                warn!(
                    "Total field '{}' appears more than once; later copies mirror the first",
                    field.key
                );
                continue;
            }
            aggregator.register_display(decode_display_config(&field.key, &field.config));
        }
        aggregator.recompute_all();
        info!(
            "Board opened: {} groups, {} total displays",
            document.groups.len(),
            document.totals.len()
        );

        let mut board = Self {
            document,
            aggregator,
        };
        // Normalize persisted values once, as the page does on load.
        board.sync_all_fields();
        board
    }

    pub fn set<'a>(
        &mut self,
        group: &str,
        item: &str,
        raw: impl Into<CountInput<'a>>,
    ) -> Option<UpdateResult> {
        let result = self.aggregator.set_item_count(group, item, raw)?;
        self.sync_group_field(group);
        let dependents: Vec<String> = self
            .aggregator
            .dependents_of(group)
            .into_iter()
            .map(str::to_string)
            .collect();
        for key in dependents {
            self.sync_total_field(&key);
        }
        Some(result)
    }

    pub fn apply(&mut self, edit: &Edit) -> Option<UpdateResult> {
        let result = self.set(&edit.group, &edit.item, edit.value.as_str());
        if result.is_none() {
            warn!("Edit {}.{} matched no scoring item", edit.group, edit.item);
        }
        result
    }

    pub fn aggregator(&self) -> &ScoreAggregator {
        &self.aggregator
    }

    pub fn document(&self) -> &BoardDocument {
        &self.document
    }

    pub fn into_document(self) -> BoardDocument {
        self.document
    }

    fn sync_all_fields(&mut self) {
        let group_keys: Vec<String> = self.document.groups.iter().map(|g| g.key.clone()).collect();
        for key in group_keys {
            self.sync_group_field(&key);
        }
        let total_keys: Vec<String> = self.document.totals.iter().map(|t| t.key.clone()).collect();
        for key in total_keys {
            self.sync_total_field(&key);
        }
    }

    fn sync_group_field(&mut self, key: &str) {
        let Some(state) = self.aggregator.state(key) else {
            return;
        };
        let Ok(json) = serde_json::to_string(state) else {
            return;
        };
        for field in self.document.groups.iter_mut().filter(|g| g.key == key) {
            field.value.clone_from(&json);
        }
    }

    fn sync_total_field(&mut self, key: &str) {
        let Some(summary) = self.aggregator.display_summary(key) else {
            return;
        };
        let Ok(json) = serde_json::to_string(&summary) else {
            return;
        };
        for field in self.document.totals.iter_mut().filter(|t| t.key == key) {
            field.value.clone_from(&json);
        }
    }
}
