//! Cross-session persistence of the last submitted task.
//!
//! A single process-wide slot holds the most recent task id and, for bench
//! runs, the selected bench id. It is written on every successful submission
//! and read back after a restart so the results viewer can resume without
//! re-submitting. Stale values are overwritten, never cleared; readers treat
//! an unknown id as "not found".

use chrono::{DateTime, Utc};
use ncbench_core::{BenchId, TaskId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::error::ClientError;

/// Narrow key-value interface over the last-task slot.
///
/// Injected into the submitter and the results viewer so neither depends on
/// where the state actually lives.
pub trait TaskStore: Send + Sync {
    /// Id of the most recently submitted task, if any.
    fn last_task_id(&self) -> Option<TaskId>;

    /// Record the most recently submitted task. Overwrite-only.
    fn set_last_task_id(&self, id: &TaskId) -> Result<(), ClientError>;

    /// Bench id of the most recent verified-bench submission, if any.
    fn last_bench_id(&self) -> Option<BenchId>;

    /// Record the most recent bench selection. Overwrite-only.
    fn set_last_bench_id(&self, id: &BenchId) -> Result<(), ClientError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    last_task_id: Option<String>,
    last_bench_id: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

/// File-backed store: one small JSON document in the user state directory.
pub struct FileTaskStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl FileTaskStore {
    /// Open a store at an explicit path. A missing or unreadable file is
    /// treated as an empty slot, not an error.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = Self::load(&path);
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    /// Open the store at its default location under the user's local data
    /// directory.
    pub fn open_default() -> Result<Self, ClientError> {
        let base = dirs::data_local_dir()
            .ok_or_else(|| ClientError::Store("no local data directory".to_owned()))?;
        let dir = base.join("ncbench");
        fs::create_dir_all(&dir)
            .map_err(|e| ClientError::Store(format!("create {}: {}", dir.display(), e)))?;
        Ok(Self::open(dir.join("state.json")))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> StoreState {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(state) => state,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt state file, starting empty");
                    StoreState::default()
                }
            },
            Err(_) => StoreState::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, state: &StoreState) -> Result<(), ClientError> {
        let contents = serde_json::to_string_pretty(state)
            .map_err(|e| ClientError::Store(e.to_string()))?;
        fs::write(&self.path, contents)
            .map_err(|e| ClientError::Store(format!("write {}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), "state file written");
        Ok(())
    }
}

impl TaskStore for FileTaskStore {
    fn last_task_id(&self) -> Option<TaskId> {
        self.lock().last_task_id.clone().map(TaskId::new)
    }

    fn set_last_task_id(&self, id: &TaskId) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.last_task_id = Some(id.as_str().to_owned());
        state.updated_at = Some(Utc::now());
        self.persist(&state)
    }

    fn last_bench_id(&self) -> Option<BenchId> {
        self.lock().last_bench_id.clone().map(BenchId::new)
    }

    fn set_last_bench_id(&self, id: &BenchId) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.last_bench_id = Some(id.as_str().to_owned());
        state.updated_at = Some(Utc::now());
        self.persist(&state)
    }
}

/// In-process store for tests and callers that do not want persistence.
#[derive(Default)]
pub struct MemoryTaskStore {
    state: Mutex<StoreState>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl TaskStore for MemoryTaskStore {
    fn last_task_id(&self) -> Option<TaskId> {
        self.lock().last_task_id.clone().map(TaskId::new)
    }

    fn set_last_task_id(&self, id: &TaskId) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.last_task_id = Some(id.as_str().to_owned());
        state.updated_at = Some(Utc::now());
        Ok(())
    }

    fn last_bench_id(&self) -> Option<BenchId> {
        self.lock().last_bench_id.clone().map(BenchId::new)
    }

    fn set_last_bench_id(&self, id: &BenchId) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.last_bench_id = Some(id.as_str().to_owned());
        state.updated_at = Some(Utc::now());
        Ok(())
    }
}
