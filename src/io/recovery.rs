use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryCategory {
    /// Entries dropped or repaired while loading state.json
    Load,
    /// A state write that did not reach disk
    Write,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecoveryCategory::Load => "load",
            RecoveryCategory::Write => "write",
        })
    }
}

/// One line of the recovery log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    /// The data that was dropped or not written, verbatim
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

impl RecoveryEntry {
    pub fn new(category: RecoveryCategory, description: impl Into<String>, body: String) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            body,
        }
    }
}

/// Append-only JSON Lines file keeping whatever could not be loaded or
/// saved normally
pub fn recovery_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".recovery.log")
}

/// Replace `path` with `content` via a sibling temp file and a rename, so
/// readers never see a half-written file.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Append an entry to the recovery log. Failures are logged, never raised.
pub fn log_recovery(data_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = append_entry(data_dir, &entry) {
        tracing::warn!(error = %e, "could not write to recovery log");
    }
}

fn append_entry(data_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let mut line = serde_json::to_string(entry)?;
    line.push('\n');
    std::fs::create_dir_all(data_dir)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(recovery_log_path(data_dir))?;
    file.write_all(line.as_bytes())
}

/// Read entries back, most recent first. Lines that do not parse (e.g. a
/// torn append) are skipped.
pub fn read_recovery_entries(data_dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let Ok(content) = std::fs::read_to_string(recovery_log_path(data_dir)) else {
        return Vec::new();
    };
    let mut entries: Vec<RecoveryEntry> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| match serde_json::from_str(l) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable recovery entry");
                None
            }
        })
        .collect();
    entries.reverse();
    if let Some(n) = limit {
        entries.truncate(n);
    }
    entries
}
