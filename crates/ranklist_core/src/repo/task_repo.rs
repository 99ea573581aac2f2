//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable persistence APIs over the ordered `tasks` table.
//! - Keep SQL details and listing order inside the repository boundary.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing order is deterministic: `order_key ASC, uuid ASC`.
//! - Neighbor lookups see the same order listing does.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::order::{Alphabet, OrderKey};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    completed,
    order_key
FROM tasks";

const ORDERED_KEYS_SQL: &str = "SELECT order_key
FROM tasks
ORDER BY order_key ASC, uuid ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Task record failed validation before a write.
    Validation(TaskValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target task does not exist.
    NotFound(TaskId),
    /// Another row already holds this order key.
    DuplicateOrderKey(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::DuplicateOrderKey(key) => {
                write!(f, "order key `{key}` is already assigned to another task")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store contract for the ordered task list.
///
/// The key generator never touches this interface; callers read the two
/// neighbor keys of a gap here, generate a key, and write it back.
pub trait TaskRepository {
    /// Digit set every key in this store is encoded with.
    fn alphabet(&self) -> &Alphabet;
    /// Creates one task row.
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    /// Rewrites one task row by stable ID.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    /// Loads one task by stable ID.
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists all tasks in list order.
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    /// Returns the key of the last task in list order, if any.
    fn last_order_key(&self) -> RepoResult<Option<OrderKey>>;
    /// Returns the neighbor keys around insertion slot `position`.
    ///
    /// Slot `0` is before the first task; slots past the end clamp to the
    /// tail gap.
    fn gap_keys(&self, position: usize) -> RepoResult<(Option<OrderKey>, Option<OrderKey>)>;
    /// Rewrites one task's order key.
    fn set_order_key(&self, id: TaskId, order_key: &OrderKey) -> RepoResult<()>;
    /// Hard-deletes one task by stable ID.
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
    alphabet: Alphabet,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates a repository over a migrated connection using the default
    /// base-62 alphabet.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::try_new_with_alphabet(conn, Alphabet::base62().clone())
    }

    /// Creates a repository whose stored keys use `alphabet`.
    ///
    /// All keys in one store must share one alphabet; mixing encodings is
    /// undefined behavior at the ordering level and is not defended
    /// against here.
    pub fn try_new_with_alphabet(conn: &'conn Connection, alphabet: Alphabet) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn, alphabet })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn
            .execute(
                "INSERT INTO tasks (
                    uuid,
                    title,
                    completed,
                    order_key
                ) VALUES (?1, ?2, ?3, ?4);",
                params![
                    task.uuid.to_string(),
                    task.title.as_str(),
                    bool_to_int(task.completed),
                    task.order_key.as_str(),
                ],
            )
            .map_err(|err| map_order_key_conflict(err, &task.order_key))?;

        Ok(task.uuid)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE tasks
                 SET
                    title = ?1,
                    completed = ?2,
                    order_key = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?4;",
                params![
                    task.title.as_str(),
                    bool_to_int(task.completed),
                    task.order_key.as_str(),
                    task.uuid.to_string(),
                ],
            )
            .map_err(|err| map_order_key_conflict(err, &task.order_key))?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.uuid));
        }

        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row, &self.alphabet)?));
        }

        Ok(None)
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY order_key ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row, &self.alphabet)?);
        }

        Ok(tasks)
    }

    fn last_order_key(&self) -> RepoResult<Option<OrderKey>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT order_key
                 FROM tasks
                 ORDER BY order_key DESC, uuid DESC
                 LIMIT 1;",
                [],
                |row| row.get(0),
            )
            .optional()?;

        value
            .map(|value| parse_order_key(&value, &self.alphabet))
            .transpose()
    }

    fn gap_keys(&self, position: usize) -> RepoResult<(Option<OrderKey>, Option<OrderKey>)> {
        if position == 0 {
            let first: Option<String> = self
                .conn
                .query_row(&format!("{ORDERED_KEYS_SQL} LIMIT 1;"), [], |row| row.get(0))
                .optional()?;
            let next = first
                .map(|value| parse_order_key(&value, &self.alphabet))
                .transpose()?;
            return Ok((None, next));
        }

        let mut stmt = self
            .conn
            .prepare(&format!("{ORDERED_KEYS_SQL} LIMIT 2 OFFSET ?1;"))?;
        let mut rows = stmt.query(params![(position - 1) as i64])?;

        let prev = match rows.next()? {
            Some(row) => {
                let value: String = row.get(0)?;
                Some(parse_order_key(&value, &self.alphabet)?)
            }
            None => None,
        };

        if prev.is_none() {
            // past the end of the list: clamp to the tail gap
            return Ok((self.last_order_key()?, None));
        }

        let next = match rows.next()? {
            Some(row) => {
                let value: String = row.get(0)?;
                Some(parse_order_key(&value, &self.alphabet)?)
            }
            None => None,
        };

        Ok((prev, next))
    }

    fn set_order_key(&self, id: TaskId, order_key: &OrderKey) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE tasks
                 SET
                    order_key = ?1,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?2;",
                params![order_key.as_str(), id.to_string()],
            )
            .map_err(|err| map_order_key_conflict(err, order_key))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>, alphabet: &Alphabet) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in tasks.completed"
            )));
        }
    };

    let key_text: String = row.get("order_key")?;
    let order_key = parse_order_key(&key_text, alphabet)?;

    let task = Task {
        uuid,
        title: row.get("title")?,
        completed,
        order_key,
    };
    task.validate()?;
    Ok(task)
}

fn parse_order_key(value: &str, alphabet: &Alphabet) -> RepoResult<OrderKey> {
    OrderKey::parse(value, alphabet).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid order key `{value}` in tasks.order_key: {err}"
        ))
    })
}

fn map_order_key_conflict(err: rusqlite::Error, order_key: &OrderKey) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation
            && message.contains("tasks.order_key")
        {
            return RepoError::DuplicateOrderKey(order_key.as_str().to_string());
        }
    }
    err.into()
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "tasks")? {
        return Err(RepoError::MissingRequiredTable("tasks"));
    }

    for column in [
        "uuid",
        "title",
        "completed",
        "order_key",
        "created_at",
        "updated_at",
    ] {
        if !table_has_column(conn, "tasks", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
