//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contract the ordered list is driven through.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Task::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`,
//!   `DuplicateOrderKey`) in addition to transport errors.

pub mod task_repo;
