use getitdone_core::{
    FilterMode, MemoryKeyValueStore, SortKey, SortOrder, TaskId, TaskPersistence, TaskStats,
    TaskStore, TaskValidationError, ViewOptions,
};
use std::collections::HashSet;

fn new_store() -> TaskStore<MemoryKeyValueStore> {
    TaskStore::open(TaskPersistence::new(MemoryKeyValueStore::new()))
}

#[test]
fn valid_insert_trims_and_starts_pending() {
    let mut store = new_store();

    let task = store.insert("   Walk the dog  ").unwrap();

    assert_eq!(task.text, "Walk the dog");
    assert!(!task.completed);
    let matching = store
        .tasks()
        .iter()
        .filter(|t| t.text == "Walk the dog")
        .count();
    assert_eq!(matching, 1);
}

#[test]
fn invalid_inserts_fail_with_matching_error_and_no_mutation() {
    let mut store = new_store();
    store.insert("Seed task").unwrap();

    let cases = [
        ("", TaskValidationError::EmptyTask),
        ("  ", TaskValidationError::EmptyTask),
        ("a", TaskValidationError::TooShort),
    ];
    for (input, expected) in cases {
        let before = store.len();
        assert_eq!(store.insert(input).unwrap_err(), expected, "input {input:?}");
        assert_eq!(store.len(), before);
    }

    assert_eq!(
        store.insert(&"x".repeat(101)).unwrap_err(),
        TaskValidationError::TooLong
    );
}

#[test]
fn duplicate_text_is_rejected_case_insensitively() {
    let mut store = new_store();

    store.insert("Buy milk").unwrap();
    assert_eq!(
        store.insert("buy milk").unwrap_err(),
        TaskValidationError::DuplicateTask
    );
    assert_eq!(store.len(), 1);
}

#[test]
fn validate_candidate_has_no_side_effects() {
    let mut store = new_store();
    store.insert("Existing").unwrap();
    let revision = store.revision();

    assert_eq!(store.validate_candidate("Brand new"), Ok(()));
    assert_eq!(
        store.validate_candidate("EXISTING"),
        Err(TaskValidationError::DuplicateTask)
    );

    assert_eq!(store.len(), 1);
    assert_eq!(store.revision(), revision);
}

#[test]
fn rapid_inserts_get_unique_increasing_ids() {
    let mut store = new_store();

    let ids = (0..50)
        .map(|n| store.insert(&format!("task number {n}")).unwrap().id)
        .collect::<Vec<_>>();

    let unique = ids.iter().collect::<HashSet<_>>();
    assert_eq!(unique.len(), ids.len());
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn toggle_unknown_id_leaves_collection_unchanged() {
    let mut store = new_store();
    store.insert("Only task").unwrap();
    let before = store.tasks().to_vec();

    assert_eq!(store.toggle(TaskId(1)), None);

    assert_eq!(store.tasks(), before.as_slice());
}

#[test]
fn toggle_flips_back_and_forth() {
    let mut store = new_store();
    let id = store.insert("Flip me").unwrap().id;

    assert_eq!(store.toggle(id), Some(true));
    assert!(store.get(id).unwrap().completed);
    assert_eq!(store.toggle(id), Some(false));
    assert!(!store.get(id).unwrap().completed);
}

#[test]
fn removing_twice_is_a_silent_noop() {
    let mut store = new_store();
    let id = store.insert("Remove me").unwrap().id;
    store.insert("Keep me").unwrap();

    assert!(store.remove(id));
    assert!(!store.remove(id));

    assert_eq!(store.len(), 1);
    assert_eq!(store.tasks()[0].text, "Keep me");
}

#[test]
fn removed_text_can_be_added_again() {
    let mut store = new_store();
    let id = store.insert("Recurring").unwrap().id;
    store.remove(id);

    let again = store.insert("recurring").unwrap();
    assert_ne!(again.id, id);
}

#[test]
fn clear_completed_removes_only_completed() {
    let mut store = new_store();
    let a = store.insert("First").unwrap().id;
    let b = store.insert("Second").unwrap().id;
    store.insert("Third").unwrap();
    store.toggle(a);
    store.toggle(b);

    assert_eq!(store.clear_completed(), 2);

    assert_eq!(store.len(), 1);
    assert_eq!(store.tasks()[0].text, "Third");
    assert!(!store.tasks()[0].completed);
    assert_eq!(store.clear_completed(), 0);
}

#[test]
fn insertion_order_is_kept_regardless_of_view() {
    let mut store = new_store();
    for text in ["Charlie", "alpha", "Bravo"] {
        store.insert(text).unwrap();
    }
    store.set_view_options(ViewOptions {
        filter: FilterMode::All,
        sort_key: SortKey::Name,
        sort_order: SortOrder::Ascending,
    });

    let view = store
        .compute_view()
        .into_iter()
        .map(|task| task.text.as_str())
        .collect::<Vec<_>>();
    assert_eq!(view, ["alpha", "Bravo", "Charlie"]);

    let stored = store
        .tasks()
        .iter()
        .map(|task| task.text.as_str())
        .collect::<Vec<_>>();
    assert_eq!(stored, ["Charlie", "alpha", "Bravo"]);
}

#[test]
fn default_view_lists_newest_first() {
    let mut store = new_store();
    store.insert("older").unwrap();
    store.insert("newer").unwrap();

    // Same-millisecond inserts tie on date; descending keeps insertion order
    // for ties, so only assert the contents and the strict case.
    let view = store.compute_view();
    assert_eq!(view.len(), 2);
    if view[0].created_at != view[1].created_at {
        assert_eq!(view[0].text, "newer");
    }
}

#[test]
fn stats_track_mutations() {
    let mut store = new_store();
    assert_eq!(
        store.compute_stats(),
        TaskStats {
            total: 0,
            completed: 0,
            pending: 0
        }
    );

    let id = store.insert("One").unwrap().id;
    store.insert("Two").unwrap();
    store.toggle(id);

    assert_eq!(
        store.compute_stats(),
        TaskStats {
            total: 2,
            completed: 1,
            pending: 1
        }
    );
}

#[test]
fn snapshot_reflects_filter_changes() {
    let mut store = new_store();
    assert_eq!(
        store.snapshot().empty_message,
        Some("No tasks yet. Add one above!")
    );

    store.insert("Pending one").unwrap();
    store.set_filter(FilterMode::Completed);

    let snapshot = store.snapshot();
    assert!(snapshot.tasks.is_empty());
    assert_eq!(
        snapshot.empty_message,
        Some("No tasks match the current filter.")
    );
    assert_eq!(snapshot.footer.as_deref(), Some("Showing 0 of 1 tasks"));
    assert_eq!(snapshot.clear_completed_label, None);
}
