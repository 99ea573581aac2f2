//! Task list use-case service.
//!
//! # Responsibility
//! - Provide append, insert, move, edit and delete entry points for the
//!   ordered task list.
//! - Feed the key generator exactly the two neighbor keys of the target
//!   gap.
//!
//! # Invariants
//! - A move rewrites exactly one row's order key; every other task keeps
//!   the key it was created with.
//! - Neighbor read, key generation and write run against one connection,
//!   which serializes per-gap updates; concurrent writers on other
//!   connections surface as `DuplicateOrderKey` instead of silent
//!   collisions.

use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::order::{key_between, n_keys_between, OrderKeyError};
use crate::repo::task_repo::{RepoError, TaskRepository};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from task list service operations.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Title is blank after trim.
    BlankTitle,
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Key generation rejected its inputs.
    OrderKey(OrderKeyError),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::OrderKey(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OrderKey(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            RepoError::Validation(TaskValidationError::BlankTitle) => Self::BlankTitle,
            other => Self::Repo(other),
        }
    }
}

impl From<OrderKeyError> for TaskServiceError {
    fn from(value: OrderKeyError) -> Self {
        Self::OrderKey(value)
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        match value {
            TaskValidationError::BlankTitle => Self::BlankTitle,
        }
    }
}

/// Use-case facade for the ordered task list.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends a task at the tail of the list.
    pub fn add_task(&self, title: impl Into<String>) -> Result<Task, TaskServiceError> {
        let title = normalize_title(title.into())?;
        let tail = self.repo.last_order_key()?;
        let key = key_between(tail.as_ref(), None, self.repo.alphabet())?;
        let task = Task::new(title, key)?;
        self.repo.create_task(&task)?;
        info!(
            "event=task_add module=service status=ok uuid={} key={}",
            task.uuid, task.order_key
        );
        Ok(task)
    }

    /// Inserts a task at list slot `position`; slots past the end append.
    pub fn insert_task_at(
        &self,
        title: impl Into<String>,
        position: usize,
    ) -> Result<Task, TaskServiceError> {
        let title = normalize_title(title.into())?;
        let (prev, next) = self.repo.gap_keys(position)?;
        let key = key_between(prev.as_ref(), next.as_ref(), self.repo.alphabet())?;
        let task = Task::new(title, key)?;
        self.repo.create_task(&task)?;
        info!(
            "event=task_insert module=service status=ok uuid={} position={position} key={}",
            task.uuid, task.order_key
        );
        Ok(task)
    }

    /// Moves a task so it lands at slot `position` of the resulting list.
    ///
    /// The new key is generated from the two tasks that will surround the
    /// landing slot once the moving task is taken out of the order; only
    /// the moved row is written.
    pub fn move_task(&self, id: TaskId, position: usize) -> Result<Task, TaskServiceError> {
        let mut ordered = self.repo.list_tasks()?;
        let current = ordered
            .iter()
            .position(|task| task.uuid == id)
            .ok_or(TaskServiceError::TaskNotFound(id))?;
        let mut task = ordered.remove(current);

        let slot = position.min(ordered.len());
        let prev = slot
            .checked_sub(1)
            .and_then(|index| ordered.get(index))
            .map(|neighbor| &neighbor.order_key);
        let next = ordered.get(slot).map(|neighbor| &neighbor.order_key);

        let key = key_between(prev, next, self.repo.alphabet())?;
        self.repo.set_order_key(id, &key)?;
        task.order_key = key;
        info!(
            "event=task_move module=service status=ok uuid={id} position={slot} key={}",
            task.order_key
        );
        Ok(task)
    }

    /// Appends many tasks, computing all their keys in one pass.
    pub fn import_tasks<I, S>(&self, titles: I) -> Result<Vec<Task>, TaskServiceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let titles: Vec<String> = titles
            .into_iter()
            .map(|title| normalize_title(title.into()))
            .collect::<Result<_, _>>()?;
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let tail = self.repo.last_order_key()?;
        let keys = n_keys_between(tail.as_ref(), None, titles.len(), self.repo.alphabet())?;

        let mut tasks = Vec::with_capacity(titles.len());
        for (title, key) in titles.into_iter().zip(keys) {
            let task = Task::new(title, key)?;
            self.repo.create_task(&task)?;
            tasks.push(task);
        }
        info!(
            "event=task_import module=service status=ok count={}",
            tasks.len()
        );
        Ok(tasks)
    }

    /// Replaces a task's title.
    pub fn rename_task(
        &self,
        id: TaskId,
        title: impl Into<String>,
    ) -> Result<Task, TaskServiceError> {
        let title = normalize_title(title.into())?;
        let mut task = self.require_task(id)?;
        task.title = title;
        self.repo.update_task(&task)?;
        Ok(task)
    }

    /// Sets a task's completion flag.
    pub fn set_completed(&self, id: TaskId, completed: bool) -> Result<Task, TaskServiceError> {
        let mut task = self.require_task(id)?;
        task.completed = completed;
        self.repo.update_task(&task)?;
        Ok(task)
    }

    /// Deletes a task by stable ID.
    pub fn delete_task(&self, id: TaskId) -> Result<(), TaskServiceError> {
        self.repo.delete_task(id)?;
        info!("event=task_delete module=service status=ok uuid={id}");
        Ok(())
    }

    /// Loads one task by stable ID.
    pub fn get_task(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        self.repo.get_task(id).map_err(Into::into)
    }

    /// Lists all tasks in list order.
    pub fn list_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        self.repo.list_tasks().map_err(Into::into)
    }

    fn require_task(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        self.repo
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }
}

fn normalize_title(value: String) -> Result<String, TaskServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaskServiceError::BlankTitle);
    }
    Ok(trimmed.to_string())
}
