//! Run records for processed tabs.
//!
//! Each processed tab appends one JSON object per line (NDJSON) to a record
//! file chosen with `subtab run --record <FILE>`.
//!
//! # Record Format
//!
//! - `ts`: RFC3339 timestamp
//! - `tab`: tab name
//! - `actor`: `user@HOST` that ran the report
//! - `outcome`: `success` or `failure`
//! - `kind`: failure kind (`launch`, `exit`, `timeout`), failures only
//! - `exit_code`: process exit code, when it exited normally
//! - `duration_ms`: wall time spent on the tab
//! - `command`: the argument vector that was run

use crate::error::{Result, TabError};
use crate::subprocess::{ExecutionResult, FailureKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Whether a tab's command produced usable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

/// One line of the run record.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub ts: DateTime<Utc>,
    pub tab: String,
    pub actor: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
    pub command: Vec<String>,
}

impl RunRecord {
    /// Build a record for a completed tab.
    pub fn new(
        tab: &str,
        command: Vec<String>,
        result: &ExecutionResult,
        duration: Duration,
    ) -> Self {
        let (outcome, kind, exit_code) = match result {
            ExecutionResult::Success { .. } => (Outcome::Success, None, Some(0)),
            ExecutionResult::Failure(failure) => {
                (Outcome::Failure, Some(failure.kind), failure.exit_code)
            }
        };

        Self {
            ts: Utc::now(),
            tab: tab.to_string(),
            actor: get_actor_string(),
            outcome,
            kind,
            exit_code,
            duration_ms: duration.as_millis() as u64,
            command,
        }
    }

    /// Serialize the record to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| TabError::UserError(format!("failed to serialize run record: {}", e)))
    }
}

/// Get the actor string for record metadata.
fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append records to an NDJSON file, creating it and its parent directory
/// if needed. The file is synced once after all lines are written.
pub fn append_records(path: &Path, records: &[RunRecord]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            TabError::UserError(format!(
                "failed to create record directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            TabError::UserError(format!(
                "failed to open record file '{}': {}",
                path.display(),
                e
            ))
        })?;

    for record in records {
        let line = record.to_ndjson_line()?;
        writeln!(file, "{}", line).map_err(|e| {
            TabError::UserError(format!(
                "failed to write record to '{}': {}",
                path.display(),
                e
            ))
        })?;
    }

    file.sync_all().map_err(|e| {
        TabError::UserError(format!(
            "failed to sync record file '{}': {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}
