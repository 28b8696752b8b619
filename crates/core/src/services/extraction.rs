//! Batch extraction over a directory of `.ll` files.
//!
//! Each file is one independent analysis pass with no shared mutable
//! state, so the batch fans out one rayon worker per file. Results are
//! collected back in sorted-path order, keeping the row set deterministic
//! for a given input directory regardless of scheduling.
//!
//! A file that cannot be read or decoded is recorded as a per-file failure
//! and the run continues; the only fatal error is an input directory that
//! does not exist, raised before any file is touched.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use walkdir::WalkDir;

use crate::db::{ExtractionRunRecord, RunDb, RunStatus};
use crate::extract::features;
use crate::model::{FeatureRow, Module};

/// Row granularity for the output dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMode {
    /// One row per function.
    Function,
    /// One mean-reduced row per file.
    File,
}

impl ExtractMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractMode::Function => "function",
            ExtractMode::File => "file",
        }
    }
}

/// Request to featurize every `.ll` file under a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub input_dir: PathBuf,
    pub mode: ExtractMode,
}

/// Why one file was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub file: String,
    pub reason: String,
}

/// Files attempted vs. featurized, with per-file failure reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractSummary {
    pub files_attempted: usize,
    pub files_succeeded: usize,
    pub failures: Vec<FileFailure>,
}

impl ExtractSummary {
    /// Overall status for run bookkeeping.
    pub fn status(&self) -> RunStatus {
        if self.failures.is_empty() {
            RunStatus::Succeeded
        } else if self.files_succeeded > 0 {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        }
    }
}

/// The deterministic row set plus the run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOutcome {
    pub rows: Vec<FeatureRow>,
    pub summary: ExtractSummary,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Input directory not found: {}", .0.display())]
    MissingInputDir(PathBuf),
    #[error("Failed to read {}: {source}", .path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read and split one IR file.
pub fn read_module(path: &Path) -> Result<Module, ExtractError> {
    let text = fs::read_to_string(path)
        .map_err(|source| ExtractError::UnreadableFile { path: path.to_path_buf(), source })?;
    Ok(Module::parse(&text))
}

/// Collect `.ll` files under `dir`, sorted for deterministic processing.
pub fn collect_ir_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().and_then(|ext| ext.to_str()) == Some("ll"))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Featurize every `.ll` file under the request's input directory.
pub fn run_extraction(request: &ExtractRequest) -> Result<ExtractOutcome, ExtractError> {
    if !request.input_dir.is_dir() {
        return Err(ExtractError::MissingInputDir(request.input_dir.clone()));
    }

    let files = collect_ir_files(&request.input_dir);
    log::info!("Found {} .ll files under {}", files.len(), request.input_dir.display());

    let results: Vec<Result<Vec<FeatureRow>, FileFailure>> =
        files.par_iter().map(|path| extract_file(path, request.mode)).collect();

    let mut rows = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(mut file_rows) => rows.append(&mut file_rows),
            Err(failure) => {
                log::warn!("Skipping {}: {}", failure.file, failure.reason);
                failures.push(failure);
            }
        }
    }

    let summary = ExtractSummary {
        files_attempted: files.len(),
        files_succeeded: files.len() - failures.len(),
        failures,
    };
    log::info!(
        "Featurized {}/{} files into {} rows",
        summary.files_succeeded,
        summary.files_attempted,
        rows.len()
    );

    Ok(ExtractOutcome { rows, summary })
}

fn extract_file(path: &Path, mode: ExtractMode) -> Result<Vec<FeatureRow>, FileFailure> {
    let source_file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let module = read_module(path)
        .map_err(|err| FileFailure { file: path.display().to_string(), reason: err.to_string() })?;

    Ok(match mode {
        ExtractMode::Function => features::function_rows(&module, &source_file),
        ExtractMode::File => vec![features::file_row(&module, &source_file)],
    })
}

/// Metadata persisted alongside an extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Where the frontend intends to write the dataset.
    pub dataset_path: String,
    /// Hash of the job spec that drove the run, when one was used.
    pub spec_hash: Option<String>,
}

/// Coordinator that runs an extraction and records it in the run database.
pub struct ExtractionRunner<'a> {
    pub db: Option<&'a RunDb>,
}

impl ExtractionRunner<'_> {
    /// Run the extraction, then persist a run record best-effort: a
    /// bookkeeping failure never fails the run itself.
    pub fn run(
        &self,
        request: &ExtractRequest,
        meta: &RunMetadata,
    ) -> Result<ExtractOutcome, ExtractError> {
        let started_at = Utc::now().to_rfc3339();
        let outcome = run_extraction(request)?;
        let finished_at = Utc::now().to_rfc3339();

        if let Some(db) = self.db {
            let record = ExtractionRunRecord {
                input_dir: request.input_dir.display().to_string(),
                dataset_path: meta.dataset_path.clone(),
                mode: request.mode.as_str().to_string(),
                spec_hash: meta.spec_hash.clone(),
                files_attempted: outcome.summary.files_attempted,
                files_succeeded: outcome.summary.files_succeeded,
                rows_written: outcome.rows.len(),
                status: outcome.summary.status(),
                started_at,
                finished_at,
            };
            if let Ok(run_id) = db.insert_run(&record) {
                for failure in &outcome.summary.failures {
                    let _ = db.insert_failure(run_id, failure);
                }
            }
        }

        Ok(outcome)
    }
}
