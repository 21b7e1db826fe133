use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::io::lock::{DEFAULT_LOCK_TIMEOUT, LockError, StateLock};
use crate::io::normalize::{LoadReport, parse_state};
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::state::TrackerState;

/// Error type for state persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable home for the engine state.
///
/// `load` returns `Ok(None)` when nothing has been stored yet. Stored but
/// malformed data is repaired, never reported as an error.
pub trait StateStore {
    fn load(&self) -> Result<Option<TrackerState>, StoreError>;
    fn save(&mut self, state: &TrackerState) -> Result<(), StoreError>;
}

/// `state.json` inside a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("state.json")
    }

    /// Load with the full repair report
    pub fn load_report(&self) -> Result<Option<LoadReport>, StoreError> {
        let path = self.state_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        let report = parse_state(&text);
        if !report.is_clean() {
            for repair in &report.repairs {
                tracing::warn!(path = %path.display(), "{}", repair);
            }
            // Keep the original text when nothing usable survived, otherwise
            // just the entries that were thrown away.
            let body = if report.state.lists.is_empty() {
                text
            } else {
                report
                    .dropped
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            recovery::log_recovery(
                &self.data_dir,
                RecoveryEntry::new(
                    RecoveryCategory::Load,
                    format!("{} repair(s) while loading state.json", report.repairs.len()),
                    body,
                ),
            );
        }
        Ok(Some(report))
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<TrackerState>, StoreError> {
        Ok(self.load_report()?.map(|r| r.state))
    }

    fn save(&mut self, state: &TrackerState) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(state)?;
        let path = self.state_path();
        let result = fs::create_dir_all(&self.data_dir)
            .map_err(|source| StoreError::Write {
                path: self.data_dir.clone(),
                source,
            })
            .and_then(|()| {
                let _lock = StateLock::acquire(&self.data_dir, DEFAULT_LOCK_TIMEOUT)?;
                recovery::atomic_write(&path, content.as_bytes()).map_err(|source| {
                    StoreError::Write {
                        path: path.clone(),
                        source,
                    }
                })
            });

        if let Err(e) = &result {
            recovery::log_recovery(
                &self.data_dir,
                RecoveryEntry::new(
                    RecoveryCategory::Write,
                    format!("state write failed: {}", e),
                    content,
                ),
            );
        }
        result
    }
}

/// In-memory store holding the serialized document. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with raw text, e.g. to exercise repair on load
    pub fn with_text(text: impl Into<String>) -> Self {
        MemoryStore {
            slot: Arc::new(Mutex::new(Some(text.into()))),
        }
    }

    /// The last saved document
    pub fn text(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|s| s.clone())
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<TrackerState>, StoreError> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(slot.as_deref().map(|text| parse_state(text).state))
    }

    fn save(&mut self, state: &TrackerState) -> Result<(), StoreError> {
        let text = serde_json::to_string(state)?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        *slot = Some(text);
        Ok(())
    }
}
