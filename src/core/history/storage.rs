//! The history slot: the whole session list as one JSON array in `history.json`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::paths;

use super::{HistoryStore, Session};

/// Blobs larger than this are treated as corrupt.
pub const MAX_SLOT_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("No data directory available")]
    NoDataDir,
    #[error("Failed to write history: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to serialize history: {0}")]
    Json(#[from] serde_json::Error),
}

/// Path of the history slot in the data directory.
pub fn slot_path() -> Option<PathBuf> {
    paths::data_dir().map(|d| d.join("history.json"))
}

/// Load the store from the default slot. Never fails: a missing, unreadable,
/// or corrupt slot gives an empty store.
pub fn load(capacity: usize) -> HistoryStore {
    match slot_path() {
        Some(path) => load_from(&path, capacity),
        None => {
            log::warn!("No data directory; history starts empty");
            HistoryStore::new(capacity)
        }
    }
}

pub fn load_from(path: &Path, capacity: usize) -> HistoryStore {
    match read_sessions(path) {
        Ok(sessions) => HistoryStore::from_sessions(sessions, capacity),
        Err(e) => {
            log::error!("Discarding history at {}: {}", path.display(), e);
            HistoryStore::new(capacity)
        }
    }
}

fn read_sessions(path: &Path) -> io::Result<Vec<Session>> {
    let len = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    if len > MAX_SLOT_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("slot is {} bytes (limit {})", len, MAX_SLOT_BYTES),
        ));
    }
    let data = fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Rewrite the default slot with the whole store.
pub fn save(store: &HistoryStore) -> Result<PathBuf, SlotError> {
    let path = slot_path().ok_or(SlotError::NoDataDir)?;
    save_to(&path, store)?;
    Ok(path)
}

/// Atomic write: serialize to a temp file next to `path`, then rename over it.
pub fn save_to(path: &Path, store: &HistoryStore) -> Result<(), SlotError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let sessions: Vec<&Session> = store.list().collect();
    let json = serde_json::to_string_pretty(&sessions)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(tmp, path)?;
    log::debug!("Saved {} sessions to {}", sessions.len(), path.display());
    Ok(())
}
