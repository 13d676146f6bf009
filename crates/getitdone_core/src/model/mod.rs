//! Domain model for the task list.
//!
//! # Responsibility
//! - Define the canonical task record and its insertion rules.
//! - Define view parameters and the pure filter/sort/stats computation.
//!
//! # Invariants
//! - Stored collection order is insertion order.
//! - Views never reorder or mutate the stored collection.

pub mod collate;
pub mod task;
pub mod view;
