use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;

use llfeat_core::db::RunDb;

#[derive(Args, Debug)]
pub struct RunsArgs {
    /// Path to the run database.
    #[arg(long, default_value = "llfeat-runs.db")]
    pub db: PathBuf,

    /// Emit JSON instead of human-readable text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// List extraction runs recorded in the run database.
pub fn runs_command(args: RunsArgs) -> Result<()> {
    if !args.db.is_file() {
        return Err(anyhow!("Run database not found at {}", args.db.display()));
    }

    let db = RunDb::open(&args.db)
        .with_context(|| format!("Failed to open run database at {}", args.db.display()))?;
    let runs = db.list_runs().context("Failed to list runs")?;

    if args.json {
        let serialized =
            serde_json::to_string_pretty(&runs).context("Failed to serialize runs to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Runs ({}):", runs.len());
    if runs.is_empty() {
        println!("  (none)");
        return Ok(());
    }

    for run in runs {
        println!(
            "  - [{}] {} -> {} ({} mode, files {}/{}, {} rows, started {})",
            run.status.as_str(),
            run.input_dir,
            run.dataset_path,
            run.mode,
            run.files_succeeded,
            run.files_attempted,
            run.rows_written,
            run.started_at
        );
    }

    Ok(())
}
