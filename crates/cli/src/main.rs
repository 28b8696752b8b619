use anyhow::Result;
use clap::{Parser, Subcommand};

use llfeat::commands::{extract_command, runs_command, show_command, ExtractArgs, RunsArgs, ShowArgs};

/// Structural feature extraction from textual LLVM IR.
///
/// This CLI is a thin wrapper around `llfeat-core`. All substantive logic
/// lives in the library so it can be tested thoroughly and reused from
/// other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "llfeat",
    version,
    about = "Structural feature extraction from textual LLVM IR",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Featurize every `.ll` file under a directory and write a dataset.
    Extract(ExtractArgs),

    /// Featurize a single `.ll` file and print its per-function features.
    Show(ShowArgs),

    /// List extraction runs recorded in the run database.
    Runs(RunsArgs),
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Extract(args) => extract_command(args),
        Command::Show(args) => show_command(args),
        Command::Runs(args) => runs_command(args),
    }
}
