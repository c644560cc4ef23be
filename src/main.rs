use boardscore::board::{Board, BoardDocument};
use boardscore::config::Settings;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::Path;
use std::process;
use tracing::{error, info, warn, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON settings file; explicit flags still win over it.
    #[arg(global = true, long)]
    settings: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Report(cmd::report::ReportArgs),
    Set(cmd::set::SetArgs),
    Summarize(cmd::summarize::SummarizeArgs),
    Export(cmd::export::ExportArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let (name, cli_settings, document_path) = match &cli.command {
        Commands::Report(a) => ("report", &a.settings, &a.document),
        Commands::Set(a) => ("set", &a.settings, &a.document),
        Commands::Summarize(a) => ("summarize", &a.settings, &a.document),
        Commands::Export(a) => ("export", &a.settings, &a.document),
    };
    let Some(sub_matches) = matches.subcommand_matches(name) else {
        error!("Subcommand '{}' was not parsed", name);
        process::exit(2);
    };

    let settings = match &cli.settings {
        Some(path) if Path::new(path).exists() => {
            info!("Loading settings from: {}", path);
            let mut file_settings = Settings::load_from_file(path).unwrap_or_else(|e| {
                error!("{}", e);
                process::exit(1);
            });
            file_settings.merge_from_cli(cli_settings, sub_matches);
            file_settings
        }
        Some(path) => {
            warn!("Settings file '{}' not found. Using flags and defaults.", path);
            cli_settings.clone()
        }
        None => cli_settings.clone(),
    };
    if let Err(e) = settings.validate() {
        error!("{}", e);
        process::exit(1);
    }

    info!("Loading board: {}", document_path.display());
    let document = BoardDocument::load_from_file(document_path).unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(1);
    });
    let board = Board::open(document, settings);

    let result = match cli.command {
        Commands::Report(args) => cmd::report::run(args, &board),
        Commands::Set(args) => cmd::set::run(args, board),
        Commands::Summarize(args) => cmd::summarize::run(args, &board),
        Commands::Export(args) => cmd::export::run(args, &board),
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}
