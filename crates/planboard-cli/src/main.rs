use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "planboard-cli", version, about = "Planboard CLI")]
struct Cli {
    /// Task file to operate on (defaults to ~/.config/planboard/tasks.json)
    #[arg(long, global = true)]
    tasks: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Show tasks grouped into day or week buckets
    Board {
        #[command(subcommand)]
        action: commands::board::BoardAction,
    },
    /// Move a task to another day or week
    Move {
        #[command(subcommand)]
        action: commands::move_cmd::MoveAction,
    },
    /// Overdue reminders for the coming weeks
    Rollover(commands::rollover::RolloverArgs),
    /// Replay a recorded drag script against the board
    Replay(commands::replay::ReplayArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("PLANBOARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let ctx = commands::Context::new(cli.tasks);
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action, &ctx),
        Commands::Board { action } => commands::board::run(action, &ctx),
        Commands::Move { action } => commands::move_cmd::run(action, &ctx),
        Commands::Rollover(args) => commands::rollover::run(args, &ctx),
        Commands::Replay(args) => commands::replay::run(args, &ctx),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
