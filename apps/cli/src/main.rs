use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod db;

#[derive(Parser)]
#[command(name = "bunpo", version, about = "Spaced-repetition trainer for Japanese grammar")]
struct Cli {
    /// Path to the grammar database (defaults to the platform data dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a grammar item
    Add(commands::item::AddArgs),
    /// List items due for review
    Due,
    /// Run an interactive review session over all due items
    Review,
    /// Show lesson status, or start new lessons
    Lessons {
        #[command(subcommand)]
        action: Option<commands::lessons::LessonAction>,
    },
    /// Show review statistics
    Stats,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let repo = db::open(cli.db)?;
    let now = Utc::now();

    match cli.command {
        Commands::Add(args) => commands::item::add(&repo, args),
        Commands::Due => commands::item::list_due(&repo, now),
        Commands::Review => commands::review::run(&repo),
        Commands::Lessons { action } => commands::lessons::run(&repo, action, now),
        Commands::Stats => commands::stats::run(&repo, now),
        Commands::Config { action } => commands::config::run(&repo, action),
    }
}
