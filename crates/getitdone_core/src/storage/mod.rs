//! Durable key-value storage and the task persistence adapter.
//!
//! # Responsibility
//! - Define the minimal key-value contract the core persists through.
//! - Provide SQLite and in-memory implementations.
//! - Load/save the task collection as one serialized blob under a fixed key.
//!
//! # Invariants
//! - Values are opaque text; the store never interprets them.
//! - `set` replaces any prior value for the key.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;
pub mod tasks;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;
pub use tasks::{LoadOutcome, TaskPersistence, TASKS_BACKUP_KEY, TASKS_STORAGE_KEY};

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure raised by a key-value backend or by blob (de)serialization.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    Serialization(serde_json::Error),
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "task blob serialization failed: {err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Opaque text storage addressed by string keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}
