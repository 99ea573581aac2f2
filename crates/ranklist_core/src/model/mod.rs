//! Domain model for the ordered task list.
//!
//! # Responsibility
//! - Define the task record and its validation rules.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - List position is carried by the task's order key, never by a dense
//!   integer position.

pub mod task;
