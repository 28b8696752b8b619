use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use llfeat_core::extract::features;
use llfeat_core::services::extraction::read_module;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Path to one `.ll` file.
    pub file: PathBuf,

    /// Emit JSON instead of human-readable text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Featurize a single IR file and print its per-function features.
pub fn show_command(args: ShowArgs) -> Result<()> {
    let module = read_module(&args.file)
        .with_context(|| format!("Failed to featurize {}", args.file.display()))?;

    let source_file = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());

    let rows = features::function_rows(&module, &source_file);

    if args.json {
        let serialized =
            serde_json::to_string_pretty(&rows).context("Failed to serialize feature rows")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("{}: {} function(s)", source_file, rows.len());
    for row in &rows {
        let f = &row.features;
        println!("  - {}", row.function_name.as_deref().unwrap_or("unknown"));
        println!(
            "      blocks: instr/block={:.2} succ/block={:.2}",
            f.instruction_per_block, f.successor_per_block
        );
        println!(
            "      loops: max_depth={} avg_level={:.2} callsites={}",
            f.max_loop_depth, f.avg_nested_loop_level, f.num_callsite_in_loop
        );
        println!(
            "      calls: usage={} recursive={} caller_height={}",
            f.call_usage, f.is_recursive, f.caller_height
        );
        println!(
            "      memory: load={} store={} alloca={}",
            f.load_count, f.store_count, f.alloca_count
        );
        println!(
            "      branches: cond={} uncond={}",
            f.conditional_branch_count, f.unconditional_branch_count
        );
    }

    Ok(())
}
