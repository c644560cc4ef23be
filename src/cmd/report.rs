use crate::reports;
use boardscore::board::Board;
use boardscore::config::Settings;
use boardscore::error::BsResult;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Board document (JSON).
    pub document: PathBuf,

    #[command(flatten)]
    pub settings: Settings,

    /// Only show groups whose key contains this text.
    #[arg(short, long)]
    pub group: Option<String>,
}

pub fn run(args: ReportArgs, board: &Board) -> BsResult<()> {
    let agg = board.aggregator();

    for field in &board.document().groups {
        if let Some(ref filter) = args.group {
            if !field.key.to_lowercase().contains(&filter.to_lowercase()) {
                continue;
            }
        }
        reports::print_group(agg, &field.key, &field.label);
    }

    reports::print_totals(agg, &board.document().totals);
    Ok(())
}
