use crate::reports;
use boardscore::board::Board;
use boardscore::config::Settings;
use boardscore::error::{BoardScoreError, BsResult};
use boardscore::form::summarize_inputs;
use clap::Args;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct SummarizeArgs {
    /// Board document (JSON).
    pub document: PathBuf,

    #[command(flatten)]
    pub settings: Settings,

    /// Submitted form inputs: `{ "<group>_<item>": count, ... }`.
    #[arg(short, long)]
    pub inputs: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

fn load_inputs(path: &Path) -> BsResult<HashMap<String, String>> {
    let content = fs::read_to_string(path)?;
    let raw: HashMap<String, Value> = serde_json::from_str(&content)?;
    raw.into_iter()
        .map(|(k, v)| match v {
            Value::String(s) => Ok((k, s)),
            Value::Number(n) => Ok((k, n.to_string())),
            Value::Null => Ok((k, String::new())),
            other => Err(BoardScoreError::Validation(format!(
                "Input '{}' must be a number or string, found {}",
                k, other
            ))),
        })
        .collect()
}

pub fn run(args: SummarizeArgs, board: &Board) -> BsResult<()> {
    let inputs = load_inputs(&args.inputs)?;
    let agg = board.aggregator();

    // The first total display that names a base wins, as on the server.
    let base = agg
        .displays()
        .find_map(|(cfg, _)| cfg.base_score)
        .unwrap_or_else(|| agg.default_base());

    let summary = summarize_inputs(agg.configs(), &inputs, base);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        reports::print_form_summary(&summary, agg.grade(summary.total_score));
    }
    Ok(())
}
