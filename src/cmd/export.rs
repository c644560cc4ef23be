use boardscore::board::Board;
use boardscore::config::Settings;
use boardscore::error::BsResult;
use boardscore::scorer::DisplayMode;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Board document (JSON).
    pub document: PathBuf,

    #[command(flatten)]
    pub settings: Settings,

    /// Destination CSV (one row per group and per total display).
    #[arg(long)]
    pub csv: PathBuf,
}

pub fn run(args: ExportArgs, board: &Board) -> BsResult<()> {
    let agg = board.aggregator();
    let mut wtr = csv::Writer::from_path(&args.csv)?;
    wtr.write_record([
        "kind", "key", "source", "total", "grade", "critical", "major", "minor", "bonus",
    ])?;

    let mut rows = 0;
    for cfg in agg.configs() {
        let Some(s) = agg.group_total(&cfg.group_key) else {
            continue;
        };
        wtr.write_record([
            "group".to_string(),
            cfg.group_key.clone(),
            cfg.pool_key().to_string(),
            s.total.to_string(),
            agg.grade(s.total).to_string(),
            s.critical.to_string(),
            s.major.to_string(),
            s.minor.to_string(),
            s.bonus.to_string(),
        ])?;
        rows += 1;
    }

    for (cfg, s) in agg.displays() {
        let source = match cfg.mode() {
            DisplayMode::Filtered(keys) => keys.join("+"),
            DisplayMode::Pooled(pool) => pool.to_string(),
        };
        wtr.write_record([
            "total".to_string(),
            cfg.key.clone(),
            source,
            s.total.to_string(),
            agg.grade(s.total).to_string(),
            s.critical.to_string(),
            s.major.to_string(),
            s.minor.to_string(),
            s.bonus.to_string(),
        ])?;
        rows += 1;
    }

    wtr.flush()?;
    info!("Exported {} rows to {}", rows, args.csv.display());
    Ok(())
}
