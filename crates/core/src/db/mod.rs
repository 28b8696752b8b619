//! Run-bookkeeping database.
//!
//! This module wraps a SQLite database storing:
//! - One record per extraction run (input, dataset destination, counts,
//!   status, timestamps)
//! - One record per file that failed during a run
//!
//! The schema is versioned through `PRAGMA user_version`; a database
//! written by a newer crate is rejected explicitly so callers can surface
//! a clear message instead of silently misreading data.

use std::path::Path;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::extraction::FileFailure;

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Error type for run database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// Overall outcome of one extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every attempted file was featurized.
    Succeeded,
    /// Some files failed but rows were still produced.
    Partial,
    /// No file could be featurized.
    Failed,
}

impl RunStatus {
    /// Encode as text for storage in SQLite.
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Succeeded => "succeeded",
            RunStatus::Partial => "partial",
            RunStatus::Failed => "failed",
        }
    }

    /// Decode from text stored in SQLite; unrecognized values read as
    /// failed rather than erroring.
    pub fn from_str(value: &str) -> Self {
        match value {
            "succeeded" => RunStatus::Succeeded,
            "partial" => RunStatus::Partial,
            _ => RunStatus::Failed,
        }
    }
}

/// Record describing one extraction run for bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRunRecord {
    pub input_dir: String,
    pub dataset_path: String,
    /// Row granularity ("function" or "file").
    pub mode: String,
    /// Hash of the job spec that drove the run, when one was used.
    pub spec_hash: Option<String>,
    pub files_attempted: usize,
    pub files_succeeded: usize,
    pub rows_written: usize,
    pub status: RunStatus,
    pub started_at: String,
    pub finished_at: String,
}

/// SQLite-backed run database.
///
/// A thin wrapper around `rusqlite::Connection` responsible for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Providing small, testable helpers for inserting and listing records.
#[derive(Debug)]
pub struct RunDb {
    conn: Connection,
}

impl RunDb {
    /// Open (or create) a run database at the given path and ensure the
    /// schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Insert a run record and return its row id.
    pub fn insert_run(&self, record: &ExtractionRunRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO runs (
                input_dir, dataset_path, mode, spec_hash,
                files_attempted, files_succeeded, rows_written,
                status, started_at, finished_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                record.input_dir,
                record.dataset_path,
                record.mode,
                record.spec_hash,
                record.files_attempted as i64,
                record.files_succeeded as i64,
                record.rows_written as i64,
                record.status.as_str(),
                record.started_at,
                record.finished_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List all runs (ordered by id).
    pub fn list_runs(&self) -> DbResult<Vec<ExtractionRunRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT input_dir, dataset_path, mode, spec_hash,
                   files_attempted, files_succeeded, rows_written,
                   status, started_at, finished_at
            FROM runs
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(7)?;
            Ok(ExtractionRunRecord {
                input_dir: row.get(0)?,
                dataset_path: row.get(1)?,
                mode: row.get(2)?,
                spec_hash: row.get(3)?,
                files_attempted: row.get::<_, i64>(4)? as usize,
                files_succeeded: row.get::<_, i64>(5)? as usize,
                rows_written: row.get::<_, i64>(6)? as usize,
                status: RunStatus::from_str(&status),
                started_at: row.get(8)?,
                finished_at: row.get(9)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Insert a per-file failure for a run.
    pub fn insert_failure(&self, run_id: i64, failure: &FileFailure) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO run_failures (run_id, file, reason)
            VALUES (?1, ?2, ?3)
            "#,
            params![run_id, failure.file, failure.reason],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List the failures recorded for one run (ordered by id).
    pub fn list_failures(&self, run_id: i64) -> DbResult<Vec<FileFailure>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT file, reason
            FROM run_failures
            WHERE run_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok(FileFailure { file: row.get(0)?, reason: row.get(1)? })
            })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: initial schema (runs, run_failures)
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS runs (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                input_dir       TEXT NOT NULL,
                dataset_path    TEXT NOT NULL,
                mode            TEXT NOT NULL,
                spec_hash       TEXT,
                files_attempted INTEGER NOT NULL,
                files_succeeded INTEGER NOT NULL,
                rows_written    INTEGER NOT NULL,
                status          TEXT NOT NULL,
                started_at      TEXT NOT NULL,
                finished_at     TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS run_failures (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id  INTEGER NOT NULL,
                file    TEXT NOT NULL,
                reason  TEXT NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
