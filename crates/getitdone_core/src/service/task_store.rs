//! Task Store: the single owner of the session's task collection.
//!
//! # Responsibility
//! - Hold the authoritative in-memory collection and current view options.
//! - Validate inserts and apply remove/toggle/clear mutations.
//! - Persist the full collection after every mutating call, even a no-op.
//! - Compute derived views and counts on demand.
//!
//! # Invariants
//! - The collection is loaded exactly once, in `open`, before any mutation.
//! - No two tasks share a case-insensitive trimmed text (checked on insert).
//! - Task ids are never reused during the store's lifetime.
//! - Callers only receive shared references or clones, never `&mut Task`.

use crate::model::task::{validate_candidate, Task, TaskId, TaskIdGenerator, TaskValidationError};
use crate::model::view::{
    compute_stats, compute_view, FilterMode, SortKey, SortOrder, TaskStats, ViewOptions,
    ViewSnapshot,
};
use crate::storage::{KeyValueStore, TaskPersistence};
use chrono::Utc;
use log::{debug, info};

/// Session-scoped task collection with persistence and derived views.
pub struct TaskStore<S: KeyValueStore> {
    tasks: Vec<Task>,
    options: ViewOptions,
    ids: TaskIdGenerator,
    persistence: TaskPersistence<S>,
    revision: u64,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Loads the stored collection and starts a session with default view options.
    ///
    /// Never fails: unusable stored data starts the session empty.
    pub fn open(persistence: TaskPersistence<S>) -> Self {
        let outcome = persistence.load();
        let recovered = outcome.is_recovered();
        let tasks = outcome.into_tasks();
        info!(
            "event=store_open module=store status=ok count={} recovered={}",
            tasks.len(),
            recovered
        );

        Self {
            ids: TaskIdGenerator::seeded_from(&tasks),
            tasks,
            options: ViewOptions::default(),
            persistence,
            revision: 0,
        }
    }

    /// Checks whether `raw_text` would be accepted by [`insert`](Self::insert).
    pub fn validate_candidate(&self, raw_text: &str) -> Result<(), TaskValidationError> {
        validate_candidate(raw_text, &self.tasks)
    }

    /// Validates and appends a new pending task.
    ///
    /// On error nothing is mutated or persisted.
    pub fn insert(&mut self, raw_text: &str) -> Result<Task, TaskValidationError> {
        if let Err(err) = self.validate_candidate(raw_text) {
            debug!(
                "event=task_insert module=store status=rejected error_code={} input_chars={}",
                err.code(),
                raw_text.chars().count()
            );
            return Err(err);
        }

        let task = Task::new(self.ids.next_id(), raw_text.trim(), Utc::now());
        self.tasks.push(task.clone());
        info!(
            "event=task_insert module=store status=ok id={} count={}",
            task.id,
            self.tasks.len()
        );
        self.commit(true);
        Ok(task)
    }

    /// Removes the task with `id`. Returns `false` when no such task exists.
    pub fn remove(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = self.tasks.len() != before;

        info!(
            "event=task_remove module=store status=ok id={} removed={}",
            id, removed
        );
        self.commit(removed);
        removed
    }

    /// Flips completion on the task with `id`. Returns the new state, or
    /// `None` when no such task exists.
    pub fn toggle(&mut self, id: TaskId) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|task| task.id == id);
        let completed = task.map(|task| {
            task.completed = !task.completed;
            task.completed
        });

        info!(
            "event=task_toggle module=store status=ok id={} found={}",
            id,
            completed.is_some()
        );
        self.commit(completed.is_some());
        completed
    }

    /// Removes every completed task and returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(Task::is_pending);
        let removed = before - self.tasks.len();

        info!(
            "event=tasks_clear_completed module=store status=ok removed={} remaining={}",
            removed,
            self.tasks.len()
        );
        self.commit(removed > 0);
        removed
    }

    /// Filtered and sorted view under the current options.
    pub fn compute_view(&self) -> Vec<&Task> {
        compute_view(&self.tasks, &self.options)
    }

    pub fn compute_stats(&self) -> TaskStats {
        compute_stats(&self.tasks)
    }

    /// Render-ready view, counts and labels for the current state.
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot::build(&self.tasks, self.options)
    }

    pub fn view_options(&self) -> ViewOptions {
        self.options
    }

    pub fn set_view_options(&mut self, options: ViewOptions) {
        self.options = options;
    }

    pub fn set_filter(&mut self, filter: FilterMode) {
        self.options.filter = filter;
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        self.options.sort_key = sort_key;
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.options.sort_order = sort_order;
    }

    /// Switches between ascending and descending, returning the new order.
    pub fn toggle_sort_order(&mut self) -> SortOrder {
        self.options.sort_order = self.options.sort_order.reversed();
        self.options.sort_order
    }

    /// Stored collection in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Counter bumped after every mutation that changed the collection.
    ///
    /// View option changes do not bump it; they never touch stored state.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn persistence(&self) -> &TaskPersistence<S> {
        &self.persistence
    }

    /// Saves the collection; `changed` decides whether observers see a new revision.
    fn commit(&mut self, changed: bool) {
        if changed {
            self.revision += 1;
        }
        self.persistence.save(&self.tasks);
    }
}

#[cfg(test)]
mod tests {
    use super::TaskStore;
    use crate::model::task::{TaskId, TaskValidationError};
    use crate::model::view::SortOrder;
    use crate::storage::{MemoryKeyValueStore, TaskPersistence, TASKS_STORAGE_KEY};

    fn empty_store() -> (TaskStore<MemoryKeyValueStore>, MemoryKeyValueStore) {
        let kv = MemoryKeyValueStore::new();
        let store = TaskStore::open(TaskPersistence::new(kv.clone()));
        (store, kv)
    }

    #[test]
    fn rejected_insert_leaves_state_and_storage_untouched() {
        let (mut store, kv) = empty_store();

        assert_eq!(store.insert(""), Err(TaskValidationError::EmptyTask));
        assert_eq!(store.insert("a"), Err(TaskValidationError::TooShort));

        assert!(store.is_empty());
        assert_eq!(store.revision(), 0);
        assert_eq!(kv.raw(TASKS_STORAGE_KEY), None);
    }

    #[test]
    fn every_effective_mutation_saves() {
        let (mut store, kv) = empty_store();

        let task = store.insert("Water plants").unwrap();
        assert!(kv.raw(TASKS_STORAGE_KEY).unwrap().contains("Water plants"));

        store.toggle(task.id);
        assert!(kv.raw(TASKS_STORAGE_KEY).unwrap().contains(r#""completed":true"#));

        assert_eq!(store.clear_completed(), 1);
        assert_eq!(kv.raw(TASKS_STORAGE_KEY).as_deref(), Some("[]"));
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let (mut store, _kv) = empty_store();
        store.insert("Existing").unwrap();
        let revision = store.revision();

        assert_eq!(store.toggle(TaskId(42)), None);
        assert!(!store.remove(TaskId(42)));
        assert_eq!(store.clear_completed(), 0);

        assert_eq!(store.len(), 1);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn noop_mutations_still_rewrite_storage() {
        let kv = MemoryKeyValueStore::with_entry(TASKS_STORAGE_KEY, "{garbage");
        let mut store = TaskStore::open(TaskPersistence::new(kv.clone()));

        assert!(!store.remove(TaskId(1)));
        assert_eq!(kv.raw(TASKS_STORAGE_KEY).as_deref(), Some("[]"));

        kv.set_fail_writes(true);
        store.insert("Unsaved").unwrap();
        kv.set_fail_writes(false);
        assert_eq!(store.toggle(TaskId(1)), None);
        assert!(kv.raw(TASKS_STORAGE_KEY).unwrap().contains("Unsaved"));
    }

    #[test]
    fn save_failure_keeps_memory_authoritative() {
        let (mut store, kv) = empty_store();
        kv.set_fail_writes(true);

        let task = store.insert("Still here").unwrap();
        assert_eq!(store.get(task.id).map(|t| t.text.as_str()), Some("Still here"));
        assert_eq!(kv.raw(TASKS_STORAGE_KEY), None);
    }

    #[test]
    fn toggle_sort_order_flips_from_descending_default() {
        let (mut store, _kv) = empty_store();
        assert_eq!(store.view_options().sort_order, SortOrder::Descending);
        assert_eq!(store.toggle_sort_order(), SortOrder::Ascending);
        assert_eq!(store.toggle_sort_order(), SortOrder::Descending);
    }
}
