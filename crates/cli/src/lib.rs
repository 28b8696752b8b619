//! Shared helpers for the llfeat CLI.
//!
//! The CLI is a thin wrapper around `llfeat-core` (exposed in code as
//! `llfeat_core`). All substantive analysis lives in the library; this
//! crate owns argument parsing, job-spec loading, and dataset persistence.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use llfeat_core::model::{FeatureRow, FeatureVector};

pub mod commands;

/// Compute the SHA-256 hash of a byte slice as a hex string.
///
/// Used for job-spec provenance in run records.
pub fn sha256_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Write feature rows as a CSV dataset.
///
/// The header is the fixed feature column set prefixed by the identifying
/// columns; `function_name` is included only for per-function datasets.
pub fn write_csv(path: &Path, rows: &[FeatureRow], include_function_name: bool) -> Result<()> {
    let mut out = String::new();

    let mut columns: Vec<&str> = Vec::new();
    if include_function_name {
        columns.push("function_name");
    }
    columns.push("source_file");
    columns.extend(FeatureVector::COLUMNS);
    out.push_str(&columns.join(","));
    out.push('\n');

    for row in rows {
        let mut fields: Vec<String> = Vec::new();
        if include_function_name {
            fields.push(csv_escape(row.function_name.as_deref().unwrap_or("")));
        }
        fields.push(csv_escape(&row.source_file));
        for value in row.features.values() {
            fields.push(value.to_string());
        }
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    fs::write(path, out).with_context(|| format!("Failed to write dataset to {}", path.display()))
}

/// Write feature rows as a pretty-printed JSON dataset.
pub fn write_json(path: &Path, rows: &[FeatureRow]) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create dataset at {}", path.display()))?;
    serde_json::to_writer_pretty(file, rows)
        .with_context(|| format!("Failed to write dataset to {}", path.display()))
}

/// Quote a CSV field when it contains a delimiter, quote, or line break.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
