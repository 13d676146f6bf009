//! Derived views over the task collection.
//!
//! # Responsibility
//! - Define view parameters (filter mode, sort key, sort order).
//! - Compute filtered/sorted sequences and aggregate counts.
//! - Render the short presentation labels shown around the list.
//!
//! # Invariants
//! - Every function here is pure: same inputs, same output, no mutation.
//! - Sorting is stable; ties keep insertion order.

use crate::model::collate::compare_text;
use crate::model::task::{Task, MAX_TASK_TEXT_CHARS};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const EMPTY_COLLECTION_MESSAGE: &str = "No tasks yet. Add one above!";
pub const EMPTY_FILTER_MESSAGE: &str = "No tasks match the current filter.";

/// Which subset of tasks a view includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    #[default]
    All,
    Pending,
    Completed,
}

/// Attribute used to order a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Date,
    Name,
    Status,
}

/// Direction applied on top of the sort key comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    /// Default: newest first for date sorts.
    #[default]
    Descending,
}

impl FilterMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn includes(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Name => "name",
            Self::Status => "status",
        }
    }

    fn compare(self, left: &Task, right: &Task) -> Ordering {
        match self {
            Self::Name => compare_text(left.text.as_str(), right.text.as_str()),
            Self::Status => left.completed.cmp(&right.completed),
            Self::Date => left.created_at.cmp(&right.created_at),
        }
    }
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Error for unrecognized view parameter text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseViewParamError {
    pub param: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl Display for ParseViewParamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported {} `{}`; expected {}",
            self.param, self.value, self.expected
        )
    }
}

impl Error for ParseViewParamError {}

impl FromStr for FilterMode {
    type Err = ParseViewParamError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(ParseViewParamError {
                param: "filter",
                value: other.to_string(),
                expected: "all|pending|completed",
            }),
        }
    }
}

impl FromStr for SortKey {
    type Err = ParseViewParamError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "name" => Ok(Self::Name),
            "status" => Ok(Self::Status),
            other => Err(ParseViewParamError {
                param: "sort key",
                value: other.to_string(),
                expected: "date|name|status",
            }),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ParseViewParamError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(ParseViewParamError {
                param: "sort order",
                value: other.to_string(),
                expected: "asc|desc",
            }),
        }
    }
}

/// Full set of view parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewOptions {
    pub filter: FilterMode,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
}

/// Aggregate counts over the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// Filters then stable-sorts `tasks` according to `options`.
pub fn compute_view<'a>(tasks: &'a [Task], options: &ViewOptions) -> Vec<&'a Task> {
    let mut view = tasks
        .iter()
        .filter(|task| options.filter.includes(task))
        .collect::<Vec<_>>();
    // `sort_by` is stable, which the two-bucket status sort relies on.
    view.sort_by(|left, right| {
        options
            .sort_order
            .apply(options.sort_key.compare(left, right))
    });
    view
}

pub fn compute_stats(tasks: &[Task]) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    TaskStats {
        total,
        completed,
        pending: total - completed,
    }
}

/// One render-ready picture of the list: view, counts and labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub options: ViewOptions,
    pub tasks: Vec<Task>,
    pub stats: TaskStats,
    /// Set when the view is empty.
    pub empty_message: Option<&'static str>,
    /// `Showing N of M tasks`, set when the collection is non-empty.
    pub footer: Option<String>,
    /// `Clear Completed (N)`, set when at least one task is completed.
    pub clear_completed_label: Option<String>,
}

impl ViewSnapshot {
    pub fn build(tasks: &[Task], options: ViewOptions) -> Self {
        let view = compute_view(tasks, &options)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        let stats = compute_stats(tasks);

        let empty_message = match (view.is_empty(), stats.total) {
            (false, _) => None,
            (true, 0) => Some(EMPTY_COLLECTION_MESSAGE),
            (true, _) => Some(EMPTY_FILTER_MESSAGE),
        };
        let footer = (stats.total > 0)
            .then(|| format!("Showing {} of {} tasks", view.len(), stats.total));
        let clear_completed_label =
            (stats.completed > 0).then(|| format!("Clear Completed ({})", stats.completed));

        Self {
            options,
            tasks: view,
            stats,
            empty_message,
            footer,
            clear_completed_label,
        }
    }
}

/// Renders the live input counter, e.g. `12/100 characters`.
///
/// Counts the raw, untrimmed input the way the entry field shows it.
pub fn character_count_label(raw_text: &str) -> String {
    format!(
        "{}/{} characters",
        raw_text.chars().count(),
        MAX_TASK_TEXT_CHARS
    )
}
