//! Core engine for the Get It Done task list.
//! Owns the task collection, its validation rules, derived views and
//! persistence; presentation layers only call the entry points re-exported here.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    validate_candidate, Task, TaskId, TaskValidationError, MAX_TASK_TEXT_CHARS,
    MIN_TASK_TEXT_CHARS,
};
pub use model::view::{
    character_count_label, compute_stats, compute_view, FilterMode, ParseViewParamError, SortKey,
    SortOrder, TaskStats, ViewOptions, ViewSnapshot,
};
pub use service::task_store::TaskStore;
pub use storage::{
    KeyValueStore, LoadOutcome, MemoryKeyValueStore, SqliteKeyValueStore, StorageError,
    StorageResult, TaskPersistence, TASKS_BACKUP_KEY, TASKS_STORAGE_KEY,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
