use ranklist_core::db::open_db_in_memory;
use ranklist_core::{
    Alphabet, OrderKey, RepoError, SqliteTaskRepository, Task, TaskRepository, TaskService,
    TaskServiceError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn key(value: &str) -> OrderKey {
    OrderKey::parse(value, Alphabet::base62()).unwrap()
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("buy groceries", key("a0")).unwrap();
    let id = repo.create_task(&task).unwrap();

    let loaded = repo.get_task(id).unwrap().unwrap();
    assert_eq!(loaded.uuid, task.uuid);
    assert_eq!(loaded.title, "buy groceries");
    assert!(!loaded.completed);
    assert_eq!(loaded.order_key.as_str(), "a0");
}

#[test]
fn get_missing_task_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    assert!(repo.get_task(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn service_appends_assign_ascending_keys() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    service.add_task("first").unwrap();
    service.add_task("second").unwrap();
    service.add_task("third").unwrap();

    let tasks = service.list_tasks().unwrap();
    let titles: Vec<&str> = tasks.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second", "third"]);

    let keys: Vec<&str> = tasks.iter().map(|task| task.order_key.as_str()).collect();
    assert_eq!(keys, vec!["a0", "a1", "a2"]);
}

#[test]
fn blank_titles_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    assert!(matches!(
        service.add_task("   "),
        Err(TaskServiceError::BlankTitle)
    ));

    let task = service.add_task("keep me").unwrap();
    assert!(matches!(
        service.rename_task(task.uuid, "\t"),
        Err(TaskServiceError::BlankTitle)
    ));
}

#[test]
fn rename_and_complete_update_the_row() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let task = service.add_task("draft email").unwrap();
    service.rename_task(task.uuid, "send email").unwrap();
    service.set_completed(task.uuid, true).unwrap();

    let loaded = service.get_task(task.uuid).unwrap().unwrap();
    assert_eq!(loaded.title, "send email");
    assert!(loaded.completed);
    assert_eq!(loaded.order_key, task.order_key);
}

#[test]
fn delete_removes_the_row() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let task = service.add_task("temporary").unwrap();
    service.delete_task(task.uuid).unwrap();

    assert!(service.get_task(task.uuid).unwrap().is_none());
    assert!(matches!(
        service.delete_task(task.uuid),
        Err(TaskServiceError::TaskNotFound(id)) if id == task.uuid
    ));
}

#[test]
fn duplicate_order_keys_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let first = Task::new("holds the key", key("a0")).unwrap();
    let second = Task::new("wants the key", key("a0")).unwrap();
    repo.create_task(&first).unwrap();

    let err = repo.create_task(&second).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateOrderKey(value) if value == "a0"));
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("missing", key("a0")).unwrap();
    let err = repo.update_task(&task).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == task.uuid));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteTaskRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_tasks_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "PRAGMA user_version = {};",
        ranklist_core::db::migrations::latest_version()
    ))
    .unwrap();

    assert!(matches!(
        SqliteTaskRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("tasks"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE tasks (
            uuid TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!(
        "PRAGMA user_version = {};",
        ranklist_core::db::migrations::latest_version()
    ))
    .unwrap();

    assert!(matches!(
        SqliteTaskRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "tasks",
            column: "order_key"
        })
    ));
}

#[test]
fn invalid_persisted_rows_are_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("will be corrupted", key("a0")).unwrap();
    repo.create_task(&task).unwrap();

    conn.execute("UPDATE tasks SET order_key = '!!';", []).unwrap();
    let err = repo.list_tasks().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("order_key")));

    conn.execute("UPDATE tasks SET order_key = 'a0', completed = 7;", [])
        .unwrap();
    let err = repo.list_tasks().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("completed")));
}

#[test]
fn task_serializes_with_transparent_order_key() {
    let task = Task::with_id(
        Uuid::parse_str("00000000-0000-4000-8000-000000000001").unwrap(),
        "serialize me",
        key("a0V"),
    )
    .unwrap();

    let value = serde_json::to_value(&task).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "uuid": "00000000-0000-4000-8000-000000000001",
            "title": "serialize me",
            "completed": false,
            "order_key": "a0V"
        })
    );
}
