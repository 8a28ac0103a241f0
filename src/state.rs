// src/state.rs
//! Persistent sync state: the engine's memory between runs.
//!
//! The state is an explicit value: loaded once at run start, threaded
//! through the synchronizer, written back once at run end. There are no
//! incremental writes mid-run, so an aborted run leaves the previous
//! cutoff intact and the next invocation retries from it.

use crate::error::AppError;
use crate::types::{ArticleId, NotionId};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Inter-run sync state, persisted as JSON.
///
/// `last_sync_time` advances only after a run that created, updated or
/// deleted at least one article. `synced_pages` maps each remote page id
/// to its locally-assigned article id; an assignment is never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub last_sync_time: DateTime<Utc>,
    #[serde(default)]
    pub synced_pages: IndexMap<NotionId, ArticleId>,
}

impl Default for SyncState {
    /// First-run state: epoch-zero cutoff, nothing synced.
    fn default() -> Self {
        Self {
            last_sync_time: DateTime::UNIX_EPOCH,
            synced_pages: IndexMap::new(),
        }
    }
}

/// Loads and saves the state file.
pub struct SyncStateStore {
    path: PathBuf,
}

impl SyncStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads persisted state; a missing file is a first run.
    ///
    /// A present-but-corrupt file is a hard error: silently defaulting
    /// would regenerate every article id and churn every permalink.
    pub fn load(&self) -> Result<SyncState, AppError> {
        if !self.path.exists() {
            return Ok(SyncState::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|source| AppError::StateFileCorrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes the full state back, overwriting.
    pub fn save(&self, state: &SyncState) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
