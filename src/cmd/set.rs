use crate::reports;
use boardscore::board::{Board, Edit};
use boardscore::config::Settings;
use boardscore::error::{BoardScoreError, BsResult};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SetArgs {
    /// Board document (JSON).
    pub document: PathBuf,

    #[command(flatten)]
    pub settings: Settings,

    /// `group.item=value`; an empty value unsets the count.
    #[arg(short, long = "edit", required = true, value_parser = parse_edit)]
    pub edits: Vec<Edit>,

    /// Write the updated document here instead of overwriting the input.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

fn parse_edit(s: &str) -> Result<Edit, String> {
    s.parse::<Edit>().map_err(|e: BoardScoreError| e.to_string())
}

pub fn run(args: SetArgs, mut board: Board) -> BsResult<()> {
    let mut updates = Vec::with_capacity(args.edits.len());
    for edit in &args.edits {
        updates.push((edit.clone(), board.apply(edit)));
    }
    reports::print_updates(&updates);
    reports::print_totals(board.aggregator(), &board.document().totals);

    let target = args.out.unwrap_or(args.document);
    board.document().save_to_file(&target)?;
    info!("Board written to {}", target.display());
    Ok(())
}
