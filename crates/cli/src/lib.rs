pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "emporium",
    about = "Emporium storefront operator CLI",
    long_about = "Inspect configuration, load catalog seeds, and exercise the in-memory storefront core.",
    after_help = "Examples:\n  emporium config\n  emporium seed --file catalog.toml\n  emporium smoke\n  emporium recommend --category electronics --category books"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Validate a catalog seed and load it into a fresh in-memory store")]
    Seed {
        #[arg(long, help = "TOML seed file (defaults to the built-in demo catalog)")]
        file: Option<PathBuf>,
    },
    #[command(about = "Run a scripted storefront session with per-check timing details")]
    Smoke,
    #[command(about = "Record browsed categories for a seeded user and print recommendations")]
    Recommend {
        #[arg(long = "category", required = true, help = "Browsed category, repeatable")]
        categories: Vec<String>,
        #[arg(long, help = "Seeded user to browse as (defaults to the first seeded user)")]
        user: Option<i32>,
        #[arg(long, help = "TOML seed file (defaults to the built-in demo catalog)")]
        file: Option<PathBuf>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Seed { file } => commands::seed::run(file.as_deref()),
        Command::Smoke => commands::smoke::run(),
        Command::Recommend { categories, user, file } => {
            commands::recommend::run(&categories, user, file.as_deref())
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
