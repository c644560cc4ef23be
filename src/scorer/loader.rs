//! Decode boundary between host-page attribute strings and typed configs.
//!
//! Nothing here returns an error to the caller. Malformed input is logged and
//! degrades to a safe default (empty items, empty state, pooled display).

use super::points::Points;
use super::types::{
    Bucket, GradeCriteria, PointRange, ScoringGroupConfig, ScoringItem, ScoringState,
    TotalDisplayConfig,
};
use crate::config::Settings;
use serde_json::{Map, Value};
use strum::IntoEnumIterator;
use tracing::{debug, warn};

/// A group decoded from its raw attribute strings.
#[derive(Debug, Clone)]
pub struct DecodedGroup {
    pub config: ScoringGroupConfig,
    pub state: ScoringState,
    /// Set when the config could not be used; the group renders a placeholder.
    pub problem: Option<String>,
}

pub fn decode_html_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Entity-decodes then parses; a JSON string result is parsed once more.
/// `Ok(None)` means the input was blank.
pub fn parse_json_deep(text: &str) -> Result<Option<Value>, serde_json::Error> {
    let decoded = decode_html_entities(text);
    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(trimmed)? {
        Value::String(inner) => serde_json::from_str::<Value>(&inner).map(Some),
        v => Ok(Some(v)),
    }
}

/// Reads an optional sign and leading digits; the rest is ignored.
/// Returns `None` when there are no leading digits.
pub fn parse_count_text(text: &str) -> Option<i64> {
    let t = text.trim();
    let (negative, rest) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }
    // Overlong digit runs saturate; clamping happens later anyway.
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn value_to_points(v: &Value) -> Option<Points> {
    match v {
        Value::Number(n) => n.as_f64().and_then(Points::from_f64),
        Value::String(s) => Points::parse(s),
        _ => None,
    }
}

fn value_to_count(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_count_text(s),
        _ => None,
    }
}

fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(xs)) => xs
            .iter()
            .filter_map(|x| match x {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn decode_item(v: &Value, settings: &Settings) -> Option<ScoringItem> {
    let obj = v.as_object()?;
    let id = match obj.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return None,
    };
    let label = non_empty_str(obj, "label").unwrap_or_else(|| id.clone());
    let per_unit_delta = obj
        .get("per_unit_delta")
        .and_then(value_to_points)
        .unwrap_or(Points::ZERO);
    let max_count = obj
        .get("max_count")
        .and_then(value_to_count)
        .map(|m| m.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(settings.default_max_count);

    Some(ScoringItem {
        id,
        label,
        per_unit_delta,
        max_count,
        // Only an explicit `false` excludes an item.
        affects_score: !matches!(obj.get("affects_score"), Some(Value::Bool(false))),
        negative: matches!(obj.get("negative"), Some(Value::Bool(true))),
    })
}

fn decode_criteria(v: Option<&Value>) -> GradeCriteria {
    let mut criteria = GradeCriteria::default();
    let Some(obj) = v.and_then(Value::as_object) else {
        return criteria;
    };
    for bucket in Bucket::iter() {
        let name: &str = bucket.as_ref();
        let Some(range) = obj.get(name).and_then(Value::as_object) else {
            continue;
        };
        let current = *criteria.range(bucket);
        let min = range.get("min").and_then(value_to_points).unwrap_or(current.min);
        let max = range.get("max").and_then(value_to_points).unwrap_or(current.max);
        *criteria.range_mut(bucket) = PointRange::new(min, max);
    }
    criteria
}

/// Decodes a group's config attribute. On failure the group keeps its key
/// but has no items, and the reason is returned alongside.
pub fn decode_group_config(
    group_key: &str,
    raw: &str,
    settings: &Settings,
) -> (ScoringGroupConfig, Option<String>) {
    let mut config = ScoringGroupConfig::new(group_key);
    config.base_score = Points::from_f64(settings.default_base_score).unwrap_or(config.base_score);

    let obj = match parse_json_deep(raw) {
        Ok(Some(Value::Object(obj))) => obj,
        Ok(None) => return (config, None),
        Ok(Some(other)) => {
            let reason = format!("config is not a JSON object (found {})", json_kind(&other));
            warn!("Scoring group '{}': {}", group_key, reason);
            return (config, Some(reason));
        }
        Err(e) => {
            let reason = format!("malformed config JSON: {}", e);
            warn!("Scoring group '{}': {}", group_key, reason);
            return (config, Some(reason));
        }
    };

    if let Some(base) = obj.get("base_score").and_then(value_to_points) {
        config.base_score = base;
    }
    config.grade_criteria = decode_criteria(obj.get("grade_criteria"));
    config.total_key = non_empty_str(&obj, "total_key").or_else(|| non_empty_str(&obj, "group"));
    config.include_keys = string_list(obj.get("include_keys"));

    if let Some(items) = obj.get("items") {
        let Some(items) = items.as_array() else {
            let reason = "`items` is not an array".to_string();
            warn!("Scoring group '{}': {}", group_key, reason);
            return (config, Some(reason));
        };
        for raw_item in items {
            match decode_item(raw_item, settings) {
                Some(item) if config.item(&item.id).is_some() => {
                    debug!("Scoring group '{}': duplicate item '{}' ignored", group_key, item.id);
                }
                Some(item) => config.items.push(item),
                None => debug!("Scoring group '{}': item without id dropped", group_key),
            }
        }
    }

    (config, None)
}

/// Decodes a persisted state field against its group's items. Unknown ids
/// and unreadable values are dropped; counts are clamped to `[0, max_count]`.
pub fn decode_state(raw: &str, config: &ScoringGroupConfig) -> ScoringState {
    let obj = match parse_json_deep(raw) {
        Ok(Some(Value::Object(obj))) => obj,
        Ok(None) => return ScoringState::new(),
        Ok(Some(other)) => {
            warn!(
                "Scoring group '{}': state is not a JSON object (found {}), starting empty",
                config.group_key,
                json_kind(&other)
            );
            return ScoringState::new();
        }
        Err(e) => {
            warn!(
                "Scoring group '{}': malformed state JSON ({}), starting empty",
                config.group_key, e
            );
            return ScoringState::new();
        }
    };

    let mut state = ScoringState::new();
    for (id, value) in &obj {
        let Some(item) = config.item(id) else {
            debug!("Scoring group '{}': stale item '{}' dropped", config.group_key, id);
            continue;
        };
        match value {
            Value::Null => state.set(id.clone(), None),
            v => match value_to_count(v) {
                Some(n) => state.set(id.clone(), Some(item.clamp(n))),
                None => debug!(
                    "Scoring group '{}': unreadable count for '{}' dropped",
                    config.group_key, id
                ),
            },
        }
    }
    state
}

pub fn decode_group(
    group_key: &str,
    raw_config: &str,
    raw_state: &str,
    settings: &Settings,
) -> DecodedGroup {
    let (config, problem) = decode_group_config(group_key, raw_config, settings);
    let state = decode_state(raw_state, &config);
    DecodedGroup {
        config,
        state,
        problem,
    }
}

/// Decodes a total display's config. Malformed input yields a pooled display
/// on the `"default"` pool.
pub fn decode_display_config(key: &str, raw: &str) -> TotalDisplayConfig {
    let mut display = TotalDisplayConfig::pooled(key, None);
    let obj = match parse_json_deep(raw) {
        Ok(Some(Value::Object(obj))) => obj,
        Ok(None) => return display,
        Ok(Some(other)) => {
            warn!(
                "Total display '{}': config is not a JSON object (found {})",
                key,
                json_kind(&other)
            );
            return display;
        }
        Err(e) => {
            warn!("Total display '{}': malformed config JSON: {}", key, e);
            return display;
        }
    };

    display.include_keys = string_list(obj.get("include_keys"));
    display.base_score = obj.get("base_score").and_then(value_to_points);
    display.total_key = non_empty_str(&obj, "total_key").or_else(|| non_empty_str(&obj, "group"));
    display
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
