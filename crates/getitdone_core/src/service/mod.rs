//! Core use-case services.
//!
//! # Responsibility
//! - Expose the task operations presentation layers are allowed to call.
//! - Keep callers decoupled from storage details.

pub mod task_store;
