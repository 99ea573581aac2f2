//! Task domain model.
//!
//! # Responsibility
//! - Define the record stored for every entry of the ordered list.
//! - Validate task input before persistence.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another task.
//! - `order_key` places the task in the list and is rewritten only when
//!   this task itself is moved.

use crate::order::OrderKey;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Errors from task record validation.
#[derive(Debug)]
pub enum TaskValidationError {
    /// Title is blank after trimming.
    BlankTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// One entry of the ordered task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable global ID used for linking and updates.
    pub uuid: TaskId,
    /// User-visible task text.
    pub title: String,
    /// Completion flag toggled from the list surface.
    pub completed: bool,
    /// Sort key assigned at insert or move time.
    pub order_key: OrderKey,
}

impl Task {
    /// Creates a task with a generated stable ID.
    pub fn new(
        title: impl Into<String>,
        order_key: OrderKey,
    ) -> Result<Self, TaskValidationError> {
        Self::with_id(Uuid::new_v4(), title, order_key)
    }

    /// Creates a task with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        uuid: TaskId,
        title: impl Into<String>,
        order_key: OrderKey,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            uuid,
            title: title.into(),
            completed: false,
            order_key,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        Ok(())
    }
}
