//! Task domain model and insertion validation.
//!
//! # Responsibility
//! - Define the canonical to-do record persisted under the task storage key.
//! - Validate raw user input before a task may be created.
//!
//! # Invariants
//! - Tasks created here have trimmed `text` holding between
//!   `MIN_TASK_TEXT_CHARS` and `MAX_TASK_TEXT_CHARS` characters. Loaded
//!   tasks keep whatever text was stored.
//! - `created_at` never changes after construction.
//! - Only `completed` is mutable once a task exists.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Minimum task text length, in characters, after trimming.
pub const MIN_TASK_TEXT_CHARS: usize = 2;
/// Maximum task text length, in characters, after trimming.
pub const MAX_TASK_TEXT_CHARS: usize = 100;

/// Stable integer identifier for a task.
///
/// Serialized as a bare JSON integer to keep the stored layout flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reasons a candidate task text is rejected.
///
/// Checks run in declaration order and stop at the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTask,
    TooShort,
    TooLong,
    DuplicateTask,
}

impl TaskValidationError {
    /// Stable machine-readable code for logs and callers.
    pub fn code(self) -> &'static str {
        match self {
            Self::EmptyTask => "empty_task",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::DuplicateTask => "duplicate_task",
        }
    }
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTask => write!(f, "Task cannot be empty"),
            Self::TooShort => write!(
                f,
                "Task must be at least {MIN_TASK_TEXT_CHARS} characters long"
            ),
            Self::TooLong => write!(f, "Task cannot exceed {MAX_TASK_TEXT_CHARS} characters"),
            Self::DuplicateTask => write!(f, "Task already exists"),
        }
    }
}

impl Error for TaskValidationError {}

/// One to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    #[serde(
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Builds a pending task from already-validated text.
    ///
    /// `created_at` is truncated to milliseconds so the in-memory value
    /// matches what a save/load cycle reproduces.
    pub(crate) fn new(id: TaskId, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at: created_at.trunc_subsecs(3),
        }
    }

    /// Checks `text` against the insertion length rules.
    ///
    /// Duplicate detection is a collection-level concern and is not checked here.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        check_text_shape(self.text.trim())
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }
}

/// Validates raw input against the current collection.
///
/// Pure: never mutates `existing`, safe to call for live input previews.
pub fn validate_candidate(raw_text: &str, existing: &[Task]) -> Result<(), TaskValidationError> {
    let trimmed = raw_text.trim();
    check_text_shape(trimmed)?;

    let folded = fold_for_duplicate(trimmed);
    if existing
        .iter()
        .any(|task| fold_for_duplicate(task.text.as_str()) == folded)
    {
        return Err(TaskValidationError::DuplicateTask);
    }

    Ok(())
}

fn check_text_shape(trimmed: &str) -> Result<(), TaskValidationError> {
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyTask);
    }
    let chars = trimmed.chars().count();
    if chars < MIN_TASK_TEXT_CHARS {
        return Err(TaskValidationError::TooShort);
    }
    if chars > MAX_TASK_TEXT_CHARS {
        return Err(TaskValidationError::TooLong);
    }
    Ok(())
}

fn fold_for_duplicate(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Issues task ids that never repeat within a process.
///
/// Ids follow wall-clock milliseconds when the clock moves forward and fall
/// back to `last + 1` otherwise, so two inserts in the same millisecond still
/// get distinct ids. Once `u64::MAX` has been issued or loaded, ids come from
/// the lowest value not seen during this session.
#[derive(Debug, Clone, Default)]
pub struct TaskIdGenerator {
    last_issued: u64,
    seen: BTreeSet<u64>,
}

impl TaskIdGenerator {
    /// Creates a generator that will only issue ids above every id in `tasks`.
    pub fn seeded_from(tasks: &[Task]) -> Self {
        let seen = tasks.iter().map(|task| task.id.get()).collect::<BTreeSet<_>>();
        let last_issued = seen.last().copied().unwrap_or(0);
        Self { last_issued, seen }
    }

    pub fn next_id(&mut self) -> TaskId {
        self.next_id_at(now_epoch_ms())
    }

    fn next_id_at(&mut self, now_ms: u64) -> TaskId {
        let next = match self.last_issued.checked_add(1) {
            Some(after_last) => {
                let next = now_ms.max(after_last);
                self.last_issued = next;
                next
            }
            None => self.lowest_unseen(),
        };
        self.seen.insert(next);
        TaskId(next)
    }

    fn lowest_unseen(&self) -> u64 {
        let mut candidate = 1;
        for &id in self.seen.range(1..) {
            if id != candidate {
                break;
            }
            candidate += 1;
        }
        candidate
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

fn serialize_timestamp<S: Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(raw.as_str())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| serde::de::Error::custom(format!("invalid createdAt `{raw}`: {err}")))
}

#[cfg(test)]
mod tests {
    use super::{validate_candidate, Task, TaskId, TaskIdGenerator, TaskValidationError};
    use chrono::{TimeZone, Utc};

    fn task(id: u64, text: &str) -> Task {
        Task::new(TaskId(id), text, Utc.timestamp_millis_opt(1_000).unwrap())
    }

    #[test]
    fn checks_short_circuit_in_order() {
        assert_eq!(
            validate_candidate("   ", &[]),
            Err(TaskValidationError::EmptyTask)
        );
        assert_eq!(
            validate_candidate(" a ", &[]),
            Err(TaskValidationError::TooShort)
        );
        assert_eq!(
            validate_candidate(&"x".repeat(101), &[]),
            Err(TaskValidationError::TooLong)
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let accented = "é".repeat(100);
        assert!(accented.len() > 100);
        assert_eq!(validate_candidate(&accented, &[]), Ok(()));
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(validate_candidate("ab", &[]), Ok(()));
        assert_eq!(validate_candidate(&"y".repeat(100), &[]), Ok(()));
    }

    #[test]
    fn duplicate_check_ignores_case_and_padding() {
        let existing = vec![task(1, "Buy milk")];
        assert_eq!(
            validate_candidate("  bUY MILK ", &existing),
            Err(TaskValidationError::DuplicateTask)
        );
        assert_eq!(validate_candidate("Buy bread", &existing), Ok(()));
    }

    #[test]
    fn generator_never_repeats_within_same_millisecond() {
        let mut generator = TaskIdGenerator::default();
        let first = generator.next_id_at(5_000);
        let second = generator.next_id_at(5_000);
        let third = generator.next_id_at(4_000);
        assert_eq!(first, TaskId(5_000));
        assert_eq!(second, TaskId(5_001));
        assert_eq!(third, TaskId(5_002));
    }

    #[test]
    fn generator_exhausted_at_max_falls_back_to_unseen_ids() {
        let mut generator =
            TaskIdGenerator::seeded_from(&[task(u64::MAX, "aa"), task(1, "bb"), task(3, "cc")]);
        assert_eq!(generator.next_id_at(5_000), TaskId(2));
        assert_eq!(generator.next_id_at(5_000), TaskId(4));
        assert_eq!(generator.next_id_at(5_000), TaskId(5));
    }

    #[test]
    fn generator_seeds_above_loaded_ids() {
        let mut generator = TaskIdGenerator::seeded_from(&[task(9_000, "aa"), task(7, "bb")]);
        assert_eq!(generator.next_id_at(10), TaskId(9_001));
    }

    #[test]
    fn validation_messages_match_user_copy() {
        assert_eq!(
            TaskValidationError::TooShort.to_string(),
            "Task must be at least 2 characters long"
        );
        assert_eq!(
            TaskValidationError::TooLong.to_string(),
            "Task cannot exceed 100 characters"
        );
    }
}
