use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use llfeat_core::db::RunDb;
use llfeat_core::services::extraction::{
    ExtractMode, ExtractRequest, ExtractionRunner, RunMetadata,
};

use crate::{sha256_bytes, write_csv, write_json};

/// Dataset file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// Row granularity for the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RowMode {
    /// One row per function.
    Function,
    /// One mean-reduced row per file.
    File,
}

impl From<RowMode> for ExtractMode {
    fn from(mode: RowMode) -> Self {
        match mode {
            RowMode::Function => ExtractMode::Function,
            RowMode::File => ExtractMode::File,
        }
    }
}

/// Declarative description of an extraction job, loadable from YAML or
/// JSON. CLI flags override spec values.
#[derive(Debug, Deserialize, Serialize)]
pub struct ExtractSpec {
    pub name: String,
    pub input_dir: PathBuf,
    pub output: PathBuf,
    /// "csv" or "json".
    #[serde(default)]
    pub format: Option<String>,
    /// "function" or "file".
    #[serde(default)]
    pub mode: Option<String>,
    /// Number of parallel workers (0 = auto).
    #[serde(default)]
    pub workers: Option<usize>,
}

impl ExtractSpec {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(anyhow!("Extract spec 'name' is required"));
        }
        if self.input_dir.as_os_str().is_empty() {
            return Err(anyhow!("Extract spec 'input_dir' is required"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(anyhow!("Extract spec 'output' is required"));
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Directory containing `.ll` files (searched recursively).
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output dataset path.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Dataset format. Defaults to csv.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Row granularity. Defaults to function.
    #[arg(long, value_enum)]
    pub mode: Option<RowMode>,

    /// Number of parallel workers (0 = auto).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Job spec file (YAML or JSON); explicit flags override spec values.
    #[arg(long)]
    pub spec: Option<PathBuf>,

    /// Path to the run database. Defaults to `llfeat-runs.db` next to the
    /// output dataset.
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Skip run bookkeeping entirely.
    #[arg(long, default_value_t = false)]
    pub no_db: bool,
}

/// Run an extraction over a directory and write the dataset.
pub fn extract_command(args: ExtractArgs) -> Result<()> {
    // Load the job spec when given (YAML or JSON based on extension).
    let (spec, spec_hash) = match &args.spec {
        Some(spec_path) => {
            let bytes = fs::read(spec_path)
                .with_context(|| format!("Failed to read extract spec at {}", spec_path.display()))?;
            let hash = sha256_bytes(&bytes);
            let spec: ExtractSpec =
                if spec_path.extension().and_then(|e| e.to_str()) == Some("json") {
                    serde_json::from_slice(&bytes).context("Failed to parse extract spec JSON")?
                } else {
                    serde_yaml::from_slice(&bytes).context("Failed to parse extract spec YAML")?
                };
            spec.validate()?;
            (Some(spec), Some(hash))
        }
        None => (None, None),
    };

    let input_dir = args
        .input_dir
        .or_else(|| spec.as_ref().map(|s| s.input_dir.clone()))
        .ok_or_else(|| anyhow!("--input-dir is required (directly or via --spec)"))?;
    let output = args
        .output
        .or_else(|| spec.as_ref().map(|s| s.output.clone()))
        .ok_or_else(|| anyhow!("--output is required (directly or via --spec)"))?;

    let format = match args.format {
        Some(format) => format,
        None => match spec.as_ref().and_then(|s| s.format.as_deref()) {
            Some("csv") | None => OutputFormat::Csv,
            Some("json") => OutputFormat::Json,
            Some(other) => return Err(anyhow!("Unknown format '{other}' in extract spec")),
        },
    };
    let mode = match args.mode {
        Some(mode) => mode,
        None => match spec.as_ref().and_then(|s| s.mode.as_deref()) {
            Some("function") | None => RowMode::Function,
            Some("file") => RowMode::File,
            Some(other) => return Err(anyhow!("Unknown mode '{other}' in extract spec")),
        },
    };
    let workers = args.workers.or_else(|| spec.as_ref().and_then(|s| s.workers)).unwrap_or(0);

    if workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .context("Failed to configure worker pool")?;
    }

    // Open the run database unless bookkeeping was disabled.
    let db = if args.no_db {
        None
    } else {
        let db_path = args.db.clone().unwrap_or_else(|| default_db_path(&output));
        let db = RunDb::open(&db_path)
            .with_context(|| format!("Failed to open run database at {}", db_path.display()))?;
        Some(db)
    };

    let request = ExtractRequest { input_dir: input_dir.clone(), mode: mode.into() };
    let meta = RunMetadata {
        dataset_path: output.display().to_string(),
        spec_hash,
    };

    let runner = ExtractionRunner { db: db.as_ref() };
    let outcome = runner.run(&request, &meta)?;

    log::info!("Writing dataset to {}", output.display());
    match format {
        OutputFormat::Csv => write_csv(&output, &outcome.rows, mode == RowMode::Function)?,
        OutputFormat::Json => write_json(&output, &outcome.rows)?,
    }

    println!("Extraction complete:");
    println!("  Input dir: {}", input_dir.display());
    println!("  Files attempted: {}", outcome.summary.files_attempted);
    println!("  Files featurized: {}", outcome.summary.files_succeeded);
    println!("  Rows written: {}", outcome.rows.len());
    println!("  Dataset: {}", output.display());

    if !outcome.summary.failures.is_empty() {
        println!("Failures:");
        for failure in &outcome.summary.failures {
            println!("  - {}: {}", failure.file, failure.reason);
        }
    }

    Ok(())
}

/// Run database path next to the output dataset.
fn default_db_path(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join("llfeat-runs.db"),
        _ => PathBuf::from("llfeat-runs.db"),
    }
}
