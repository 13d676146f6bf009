//! Task collection persistence adapter.
//!
//! # Responsibility
//! - Serialize the whole collection to JSON under `TASKS_STORAGE_KEY`.
//! - Load it back once per session, recovering from bad stored data.
//!
//! # Invariants
//! - `load` never fails: unreadable or malformed data yields an empty
//!   collection and a logged warning.
//! - Only structure is checked on load (JSON shape, unique ids). Records
//!   whose text breaks the insertion rules are kept and logged.
//! - A blob that cannot be used is copied to `TASKS_BACKUP_KEY` before the
//!   session may overwrite it.
//! - `save` never fails: write errors are logged and the caller's in-memory
//!   state stays authoritative.
//! - Task text is never written to logs.

use super::{KeyValueStore, StorageResult};
use crate::model::task::Task;
use log::{debug, error, info, warn};
use std::collections::HashSet;

/// Fixed key holding the serialized task collection.
pub const TASKS_STORAGE_KEY: &str = "todoTasks";
/// Key receiving the last stored blob that failed to load.
pub const TASKS_BACKUP_KEY: &str = "todoTasks.recovered";

/// Result of the session-start load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored yet.
    Missing,
    Loaded(Vec<Task>),
    /// Stored data could not be used; the session starts empty.
    Recovered { reason: String },
}

impl LoadOutcome {
    pub fn into_tasks(self) -> Vec<Task> {
        match self {
            Self::Loaded(tasks) => tasks,
            Self::Missing | Self::Recovered { .. } => Vec::new(),
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }
}

/// Loads and saves the task collection through a key-value store.
pub struct TaskPersistence<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> TaskPersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the stored collection.
    pub fn load(&self) -> LoadOutcome {
        let raw = match self.store.get(TASKS_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=tasks_load module=storage status=ok source=missing count=0");
                return LoadOutcome::Missing;
            }
            Err(err) => {
                error!(
                    "event=tasks_load module=storage status=error error_code=store_read_failed error={}",
                    err
                );
                return LoadOutcome::Recovered {
                    reason: format!("store read failed: {err}"),
                };
            }
        };

        match decode_tasks(raw.as_str()) {
            Ok(tasks) => {
                info!(
                    "event=tasks_load module=storage status=ok source=store count={} bytes={}",
                    tasks.len(),
                    raw.len()
                );
                LoadOutcome::Loaded(tasks)
            }
            Err(reason) => {
                warn!(
                    "event=tasks_load module=storage status=recovered error_code=malformed_blob bytes={} reason={}",
                    raw.len(),
                    reason
                );
                self.back_up(raw.as_str());
                LoadOutcome::Recovered { reason }
            }
        }
    }

    /// Most recent blob set aside by a recovered load, if any.
    pub fn backup(&self) -> StorageResult<Option<String>> {
        self.store.get(TASKS_BACKUP_KEY)
    }

    fn back_up(&self, raw: &str) {
        match self.store.set(TASKS_BACKUP_KEY, raw) {
            Ok(()) => info!(
                "event=tasks_backup module=storage status=ok key={} bytes={}",
                TASKS_BACKUP_KEY,
                raw.len()
            ),
            Err(err) => error!(
                "event=tasks_backup module=storage status=error error_code=backup_write_failed bytes={} error={}",
                raw.len(),
                err
            ),
        }
    }

    /// Writes the full collection, replacing the stored value.
    ///
    /// Failures are logged and dropped.
    pub fn save(&self, tasks: &[Task]) {
        if let Err(err) = self.try_save(tasks) {
            error!(
                "event=tasks_save module=storage status=error error_code=store_write_failed count={} error={}",
                tasks.len(),
                err
            );
        }
    }

    /// Same as [`save`](Self::save) but reports the failure to the caller.
    pub fn try_save(&self, tasks: &[Task]) -> StorageResult<()> {
        let blob = serde_json::to_string(tasks)?;
        self.store.set(TASKS_STORAGE_KEY, blob.as_str())?;
        debug!(
            "event=tasks_save module=storage status=ok count={} bytes={}",
            tasks.len(),
            blob.len()
        );
        Ok(())
    }
}

fn decode_tasks(raw: &str) -> Result<Vec<Task>, String> {
    let tasks: Vec<Task> =
        serde_json::from_str(raw).map_err(|err| format!("invalid task blob: {err}"))?;

    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for (index, task) in tasks.iter().enumerate() {
        if !seen_ids.insert(task.id) {
            return Err(format!("duplicate task id {} at index {index}", task.id));
        }
        if let Err(err) = task.validate() {
            warn!(
                "event=tasks_load module=storage status=kept error_code={} id={} index={} chars={}",
                err.code(),
                task.id,
                index,
                task.text.chars().count()
            );
        }
    }

    Ok(tasks)
}
