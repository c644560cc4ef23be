use crate::error::{BoardScoreError, BsResult};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_PLACEHOLDER: &str =
    "No scoring items are configured. Set them up on the admin page.";

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base score used when neither a group nor a total display names one.
    #[arg(long, default_value_t = 100.0)]
    pub default_base_score: f64,

    /// Upper count bound for items whose config omits `max_count`.
    #[arg(long, default_value_t = 1)]
    pub default_max_count: u32,

    // === GRADE BANDS ===
    #[arg(long, default_value_t = 90.0)]
    pub grade_excellent: f64,
    #[arg(long, default_value_t = 70.0)]
    pub grade_good: f64,
    #[arg(long, default_value_t = 50.0)]
    pub grade_fair: f64,

    #[arg(long, default_value = DEFAULT_PLACEHOLDER)]
    pub placeholder: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_base_score: 100.0,
            default_max_count: 1,
            grade_excellent: 90.0,
            grade_good: 70.0,
            grade_fair: 50.0,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl Settings {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> BsResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BoardScoreError::Config(format!(
                "Could not read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> BsResult<()> {
        if !(self.grade_excellent >= self.grade_good && self.grade_good >= self.grade_fair) {
            return Err(BoardScoreError::Config(format!(
                "Grade bands must be descending: excellent {} >= good {} >= fair {}",
                self.grade_excellent, self.grade_good, self.grade_fair
            )));
        }
        if !self.default_base_score.is_finite() {
            return Err(BoardScoreError::Config(
                "default_base_score must be a finite number".to_string(),
            ));
        }
        Ok(())
    }

    /// Overlays only the flags the user actually typed, so a settings file
    /// is not clobbered by clap defaults.
    pub fn merge_from_cli(&mut self, cli_settings: &Settings, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli_settings.$field.clone();
                }
            };
        }

        update_if_present!(default_base_score, "default_base_score");
        update_if_present!(default_max_count, "default_max_count");

        update_if_present!(grade_excellent, "grade_excellent");
        update_if_present!(grade_good, "grade_good");
        update_if_present!(grade_fair, "grade_fair");

        update_if_present!(placeholder, "placeholder");
    }
}
